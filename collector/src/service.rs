use crate::errors::CollectorError;
use crate::metrics_defs::{BATCH_SIZE, REQUESTS_REJECTED, SINK_PUBLISH_ERRORS};
use crate::sink::{InvalidEvent, Sink};
use crate::stats::ProtocolStats;
use chrono::Utc;
use http::header::{CACHE_CONTROL, CONTENT_TYPE, REFERER, USER_AGENT};
use http::{HeaderMap, HeaderValue};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared::http::{ResponseBody, make_boxed_error_response, make_boxed_response};
use shared::{counter, histogram};
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::pin::Pin;
use std::sync::Arc;
use tracker_protocol::protocol::{EVENT_TYPE, PROTOCOL};
use tracker_protocol::{EventBuilder, EventType, RawParams, RequestContext, anonymize_params};
use url::Url;

pub const PIXEL_PATH: &str = "/i";
pub const TRACKER_PIXEL_PATH: &str = "/com.snowplowanalytics.snowplow/i";
pub const TRACKER_POST_PATH: &str = "/com.snowplowanalytics.snowplow/tp2";

const ANONYMOUS_HEADER: &str = "sp-anonymous";
const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Transparent 1x1 GIF.
const PIXEL: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xff, 0xff, 0xff, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x01, 0x44, 0x00, 0x3b,
];

#[derive(Serialize)]
struct Message {
    message: &'static str,
}

const OK: Message = Message { message: "ok" };
const BAD_REQUEST: Message = Message {
    message: "bad request",
};
const PAYLOAD_TOO_LARGE: Message = Message {
    message: "payload too large",
};
const INVALID_CONTENT_TYPE: Message = Message {
    message: "invalid content type",
};

/// Body of a tracker POST: a self-describing wrapper around a batch of
/// parameter maps.
#[derive(Debug, Deserialize)]
struct PayloadData {
    #[allow(dead_code)]
    schema: String,
    data: Vec<Map<String, Value>>,
}

/// Everything a connection needs to turn requests into published events.
pub struct CollectorState {
    builder: EventBuilder,
    sink: Arc<dyn Sink>,
    stats: Arc<ProtocolStats>,
    max_body_bytes: usize,
}

impl CollectorState {
    pub fn new(
        builder: EventBuilder,
        sink: Arc<dyn Sink>,
        stats: Arc<ProtocolStats>,
        max_body_bytes: usize,
    ) -> Self {
        CollectorState {
            builder,
            sink,
            stats,
            max_body_bytes,
        }
    }

    pub async fn handle(&self, request: Request<Bytes>, peer: SocketAddr) -> Response<ResponseBody> {
        let path = request.uri().path();
        let response = match (request.method(), path) {
            (&Method::GET, PIXEL_PATH | TRACKER_PIXEL_PATH) => {
                let params = RawParams::from_query(request.uri().query().unwrap_or_default());
                let ctx = request_context(request.headers(), peer);
                self.collect(vec![params], &ctx).await;
                pixel_response()
            }
            (&Method::POST, TRACKER_POST_PATH) if !is_json(request.headers()) => {
                json_response(StatusCode::UNSUPPORTED_MEDIA_TYPE, &INVALID_CONTENT_TYPE)
            }
            (&Method::POST, TRACKER_POST_PATH) => {
                match serde_json::from_slice::<PayloadData>(request.body()) {
                    Ok(payload) => {
                        let ctx = request_context(request.headers(), peer);
                        let batch = payload
                            .data
                            .into_iter()
                            .map(RawParams::from_json_object)
                            .collect();
                        self.collect(batch, &ctx).await;
                        json_response(StatusCode::OK, &OK)
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "malformed payload_data body");
                        json_response(StatusCode::BAD_REQUEST, &BAD_REQUEST)
                    }
                }
            }
            (_, PIXEL_PATH | TRACKER_PIXEL_PATH | TRACKER_POST_PATH) => {
                make_boxed_error_response(StatusCode::METHOD_NOT_ALLOWED)
            }
            _ => make_boxed_error_response(StatusCode::NOT_FOUND),
        };

        if response.status().is_client_error() {
            counter!(REQUESTS_REJECTED, "status" => response.status().as_str().to_string())
                .increment(1);
        }
        response
    }

    /// Builds every event in the batch and hands valid and invalid events to
    /// the sink. Rejected parameters are redacted with the same anonymization
    /// as envelopes. Sink failures are logged; the tracker is still answered.
    async fn collect(&self, batch: Vec<RawParams>, ctx: &RequestContext) {
        histogram!(BATCH_SIZE).record(batch.len() as f64);

        let now = Utc::now();
        let mut valid = Vec::with_capacity(batch.len());
        let mut invalid = Vec::new();
        for mut params in batch {
            match self.builder.build_at(&params, ctx, now) {
                Ok(envelope) => {
                    self.stats.increment_valid(PROTOCOL, envelope.event.name(), 1);
                    valid.push(envelope);
                }
                Err(e) => {
                    tracing::debug!(error = %e, kind = e.kind(), "rejected event");
                    self.stats
                        .increment_invalid(PROTOCOL, invalid_event_name(&params), 1);
                    anonymize_params(&mut params, self.builder.anonymization(), ctx.anonymous);
                    invalid.push(InvalidEvent::new(&e, params, now));
                }
            }
        }

        if !valid.is_empty()
            && let Err(e) = self.sink.batch_publish_valid(&valid).await
        {
            counter!(SINK_PUBLISH_ERRORS, "sink" => self.sink.name().to_string()).increment(1);
            tracing::error!(sink = self.sink.name(), error = %e, "could not publish valid events");
        }
        if !invalid.is_empty()
            && let Err(e) = self.sink.batch_publish_invalid(&invalid).await
        {
            counter!(SINK_PUBLISH_ERRORS, "sink" => self.sink.name().to_string()).increment(1);
            tracing::error!(sink = self.sink.name(), error = %e, "could not publish invalid events");
        }
    }
}

/// Per-connection service; the peer address stands in for the client IP
/// when no proxy header is present.
pub struct CollectorService {
    state: Arc<CollectorState>,
    peer: SocketAddr,
}

impl CollectorService {
    pub fn new(state: Arc<CollectorState>, peer: SocketAddr) -> Self {
        CollectorService { state, peer }
    }
}

impl Service<Request<Incoming>> for CollectorService {
    type Response = Response<ResponseBody>;
    type Error = CollectorError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let state = self.state.clone();
        let peer = self.peer;

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = match Limited::new(body, state.max_body_bytes).collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                    counter!(REQUESTS_REJECTED, "status" => "413").increment(1);
                    return Ok(json_response(
                        StatusCode::PAYLOAD_TOO_LARGE,
                        &PAYLOAD_TOO_LARGE,
                    ));
                }
                Err(e) => {
                    tracing::debug!(%peer, error = %e, "could not read request body");
                    counter!(REQUESTS_REJECTED, "status" => "400").increment(1);
                    return Ok(json_response(StatusCode::BAD_REQUEST, &BAD_REQUEST));
                }
            };
            Ok(state.handle(Request::from_parts(parts, body), peer).await)
        })
    }
}

fn request_context(headers: &HeaderMap, peer: SocketAddr) -> RequestContext {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let forwarded_ip = header(FORWARDED_FOR_HEADER)
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse::<IpAddr>().ok());

    RequestContext {
        url: header(REFERER.as_str()).and_then(|r| Url::parse(r).ok()),
        ip: Some(forwarded_ip.unwrap_or_else(|| peer.ip())),
        user_agent: header(USER_AGENT.as_str()).map(str::to_string),
        anonymous: headers.contains_key(ANONYMOUS_HEADER),
    }
}

/// Tracker POSTs must declare a JSON body; parameters such as `charset` are
/// ignored.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case("application/json"))
}

// Rejected events are counted under their type only when it is a known one,
// so arbitrary client input cannot grow the stats.
fn invalid_event_name(params: &RawParams) -> &'static str {
    params
        .get_str(EVENT_TYPE)
        .and_then(|code| EventType::from_code(&code).ok())
        .map_or("unknown", |t| t.name())
}

fn pixel_response() -> Response<ResponseBody> {
    let mut response = make_boxed_response(StatusCode::OK, "image/gif", PIXEL);
    response.headers_mut().insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    response
}

fn json_response(status: StatusCode, message: &Message) -> Response<ResponseBody> {
    let body = serde_json::to_vec(message).unwrap_or_default();
    make_boxed_response(status, "application/json", body)
}
