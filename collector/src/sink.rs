//! Destinations for built envelopes and rejected events.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use envelope::Envelope;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracker_protocol::{BuildError, RawParams};

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A beacon the builder rejected, kept with the parameters it arrived with.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InvalidEvent {
    pub reason: String,
    pub kind: &'static str,
    pub params: RawParams,
    pub tstamp: DateTime<Utc>,
}

impl InvalidEvent {
    pub fn new(error: &BuildError, params: RawParams, tstamp: DateTime<Utc>) -> Self {
        InvalidEvent {
            reason: error.to_string(),
            kind: error.kind(),
            params,
            tstamp,
        }
    }
}

#[async_trait]
pub trait Sink: Send + Sync {
    fn name(&self) -> &str;

    async fn batch_publish_valid(&self, envelopes: &[Envelope]) -> Result<(), SinkError>;

    async fn batch_publish_invalid(&self, events: &[InvalidEvent]) -> Result<(), SinkError>;
}

/// Writes one JSON document per line. A batch is written and flushed as a
/// unit, so lines from concurrent requests never interleave.
pub struct LineSink<W> {
    name: String,
    writer: Mutex<W>,
}

pub type StdoutSink = LineSink<tokio::io::Stdout>;

impl StdoutSink {
    pub fn stdout() -> Self {
        LineSink::new("stdout", tokio::io::stdout())
    }
}

impl<W> LineSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new<N: Into<String>>(name: N, writer: W) -> Self {
        LineSink {
            name: name.into(),
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    async fn write_lines(&self, lines: Vec<u8>) -> Result<(), SinkError> {
        if lines.is_empty() {
            return Ok(());
        }
        let mut writer = self.writer.lock().await;
        writer.write_all(&lines).await?;
        writer.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<W> Sink for LineSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn batch_publish_valid(&self, envelopes: &[Envelope]) -> Result<(), SinkError> {
        let mut lines = Vec::new();
        for envelope in envelopes {
            lines.extend(envelope.to_json_line()?);
        }
        self.write_lines(lines).await
    }

    async fn batch_publish_invalid(&self, events: &[InvalidEvent]) -> Result<(), SinkError> {
        let mut lines = Vec::new();
        for event in events {
            serde_json::to_writer(&mut lines, event)?;
            lines.push(b'\n');
        }
        self.write_lines(lines).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tracker_protocol::{RequestContext, build_event_from_mapped_params};

    #[tokio::test]
    async fn test_line_sink_valid() {
        let sink = LineSink::new("memory", Vec::new());
        let params = RawParams::from_iter([("e", "pv"), ("aid", "shop")]);
        let envelope = build_event_from_mapped_params(&params, &RequestContext::default()).unwrap();

        sink.batch_publish_valid(&[envelope.clone(), envelope])
            .await
            .unwrap();
        sink.batch_publish_valid(&[]).await.unwrap();
        assert_eq!(sink.name(), "memory");

        let written = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let decoded: Envelope = serde_json::from_str(line).unwrap();
            assert_eq!(decoded.event_meta.app_id.as_deref(), Some("shop"));
        }
    }

    #[tokio::test]
    async fn test_line_sink_invalid() {
        let sink = LineSink::new("memory", Vec::new());
        let params = RawParams::from_iter([("e", "zz")]);
        let error = build_event_from_mapped_params(&params, &RequestContext::default()).unwrap_err();
        let tstamp = Utc.with_ymd_and_hms(2022, 9, 21, 16, 38, 52).unwrap();

        sink.batch_publish_invalid(&[InvalidEvent::new(&error, params, tstamp)])
            .await
            .unwrap();

        let written = String::from_utf8(sink.into_inner()).unwrap();
        let record: serde_json::Value = serde_json::from_str(written.trim_end()).unwrap();
        assert_eq!(record["kind"], "unknown_event_type");
        assert_eq!(record["reason"], "unknown event type: zz");
        assert_eq!(record["params"]["e"], "zz");
        assert_eq!(record["tstamp"], "2022-09-21T16:38:52Z");
    }
}
