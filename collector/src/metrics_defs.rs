//! Metrics definitions for the collector.

use shared::metrics_defs::{MetricDef, MetricType};

pub const EVENTS_VALID: MetricDef = MetricDef {
    name: "collector.events.valid",
    metric_type: MetricType::Counter,
    description: "Number of events built into envelopes, tagged by protocol and event type",
};

pub const EVENTS_INVALID: MetricDef = MetricDef {
    name: "collector.events.invalid",
    metric_type: MetricType::Counter,
    description: "Number of events rejected by the builder, tagged by protocol and event type",
};

pub const REQUESTS_REJECTED: MetricDef = MetricDef {
    name: "collector.requests.rejected",
    metric_type: MetricType::Counter,
    description: "Number of requests answered with a 4xx status, tagged by status code",
};

pub const SINK_PUBLISH_ERRORS: MetricDef = MetricDef {
    name: "collector.sink.publish_errors",
    metric_type: MetricType::Counter,
    description: "Number of batches a sink failed to publish",
};

pub const BATCH_SIZE: MetricDef = MetricDef {
    name: "collector.batch.size",
    metric_type: MetricType::Histogram,
    description: "Number of events carried by one request",
};

pub const ALL_METRICS: &[MetricDef] = &[
    EVENTS_VALID,
    EVENTS_INVALID,
    REQUESTS_REJECTED,
    SINK_PUBLISH_ERRORS,
    BATCH_SIZE,
];
