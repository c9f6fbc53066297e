//! Metrics definitions for the schema registry.

use shared::metrics_defs::{MetricDef, MetricType};

pub const SCHEMA_CACHE_HIT: MetricDef = MetricDef {
    name: "registry.cache.hit",
    metric_type: MetricType::Counter,
    description: "Number of schema lookups served from the cache",
};

pub const SCHEMA_CACHE_MISS: MetricDef = MetricDef {
    name: "registry.cache.miss",
    metric_type: MetricType::Counter,
    description: "Number of schema lookups that went to the backend",
};

pub const SCHEMA_FETCH_ERROR: MetricDef = MetricDef {
    name: "registry.fetch.error",
    metric_type: MetricType::Counter,
    description: "Number of schemas the backend could not provide or parse",
};

pub const ALL_METRICS: &[MetricDef] = &[SCHEMA_CACHE_HIT, SCHEMA_CACHE_MISS, SCHEMA_FETCH_ERROR];
