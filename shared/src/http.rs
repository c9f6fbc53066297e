use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioExecutor;
use hyper_util::rt::TokioIo;
use hyper_util::server::conn::auto::Builder;
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub type ResponseBody = BoxBody<Bytes, Infallible>;

/// Binds `host:port` and serves every accepted connection with a service
/// made for that connection's peer.
pub async fn run_http_service<F, S, E>(host: &str, port: u16, make_service: F) -> Result<(), E>
where
    F: Fn(SocketAddr) -> S,
    S: Service<Request<Incoming>, Response = Response<ResponseBody>, Error = E> + Send + 'static,
    S::Future: Send + 'static,
    E: From<std::io::Error> + std::error::Error + Send + Sync + 'static,
{
    let listener = TcpListener::bind(format!("{host}:{port}")).await?;
    tracing::info!(host, port, "listening");
    serve(listener, make_service).await
}

/// Accept loop over an already bound listener.
pub async fn serve<F, S, E>(listener: TcpListener, make_service: F) -> Result<(), E>
where
    F: Fn(SocketAddr) -> S,
    S: Service<Request<Incoming>, Response = Response<ResponseBody>, Error = E> + Send + 'static,
    S::Future: Send + 'static,
    E: From<std::io::Error> + std::error::Error + Send + Sync + 'static,
{
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let _ = stream.set_nodelay(true);
        let io = TokioIo::new(stream);
        let svc = make_service(peer_addr);

        // Hand the connection to hyper; auto-detect h1/h2 on this socket
        tokio::spawn(async move {
            if let Err(e) = Builder::new(TokioExecutor::new())
                .serve_connection(io, svc)
                .await
            {
                tracing::debug!(%peer_addr, error = %e, "connection closed with error");
            }
        });
    }
}

pub fn full_body<B: Into<Bytes>>(body: B) -> ResponseBody {
    Full::new(body.into()).map_err(|e| match e {}).boxed()
}

pub fn make_boxed_response<B: Into<Bytes>>(
    status_code: StatusCode,
    content_type: &'static str,
    body: B,
) -> Response<ResponseBody> {
    let mut response = Response::new(full_body(body));
    *response.status_mut() = status_code;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// A plain text response carrying the status' canonical reason.
pub fn make_boxed_error_response(status_code: StatusCode) -> Response<ResponseBody> {
    let message = status_code
        .canonical_reason()
        .unwrap_or("an error occurred");
    make_boxed_response(status_code, "text/plain; charset=utf-8", format!("{message}\n"))
}
