use crate::http::{ResponseBody, full_body, make_boxed_error_response, make_boxed_response};
use hyper::body::Incoming;
use hyper::service::Service;
use hyper::{Method, Request, Response, StatusCode};
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

type StatsFn = Arc<dyn Fn() -> serde_json::Value + Send + Sync>;

/// Health, readiness and stats endpoints served on the admin listener.
pub struct AdminService<F, E> {
    is_ready: F,
    stats: Option<StatsFn>,
    _error: PhantomData<fn() -> E>,
}

impl<F: Clone, E> Clone for AdminService<F, E> {
    fn clone(&self) -> Self {
        Self {
            is_ready: self.is_ready.clone(),
            stats: self.stats.clone(),
            _error: PhantomData,
        }
    }
}

impl<F, E> AdminService<F, E>
where
    F: Fn() -> bool,
{
    pub fn new(is_ready: F) -> Self {
        Self {
            is_ready,
            stats: None,
            _error: PhantomData,
        }
    }

    /// Serve the JSON returned by `stats` at `/stats`.
    pub fn with_stats<S>(mut self, stats: S) -> Self
    where
        S: Fn() -> serde_json::Value + Send + Sync + 'static,
    {
        self.stats = Some(Arc::new(stats));
        self
    }

    fn respond(&self, method: &Method, path: &str) -> Response<ResponseBody> {
        if method != Method::GET {
            return make_boxed_error_response(StatusCode::METHOD_NOT_ALLOWED);
        }
        match path {
            "/health" => Response::new(full_body("ok\n")),
            "/ready" => match (self.is_ready)() {
                true => Response::new(full_body("ok\n")),
                false => make_boxed_error_response(StatusCode::SERVICE_UNAVAILABLE),
            },
            "/stats" => match &self.stats {
                Some(stats) => {
                    make_boxed_response(StatusCode::OK, "application/json", stats().to_string())
                }
                None => make_boxed_error_response(StatusCode::NOT_FOUND),
            },
            _ => make_boxed_error_response(StatusCode::NOT_FOUND),
        }
    }
}

impl<F, E> Service<Request<Incoming>> for AdminService<F, E>
where
    F: Fn() -> bool + Send + 'static,
    E: Send + 'static,
{
    type Response = Response<ResponseBody>;
    type Error = E;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let res = self.respond(req.method(), req.uri().path());
        Box::pin(async move { Ok(res) })
    }
}
