use crate::anonymize::{AnonymizationPolicy, anonymize_fields};
use crate::errors::{BuildError, Result};
use crate::fields::*;
use crate::params::RawParams;
use crate::protocol::{EVENT_TYPE, EventType, PROTOCOL};
use crate::validation::SchemaValidator;
use chrono::{DateTime, Utc};
use envelope::{Contexts, Envelope, Event, EventMeta, Pipeline, SelfDescribingEvent};
use std::net::IpAddr;
use std::sync::Arc;
use url::Url;

/// What the collector knows about the request that carried the beacon.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    /// The page the request came from, used when the beacon has no `url`.
    pub url: Option<Url>,
    pub ip: Option<IpAddr>,
    pub user_agent: Option<String>,
    /// The client opted out of identification for this request.
    pub anonymous: bool,
}

/// Turns decoded tracker parameters into envelopes.
///
/// A builder holds no per-request state and can be shared across connections.
#[derive(Clone, Default)]
pub struct EventBuilder {
    identity: CollectorIdentity,
    anonymization: AnonymizationPolicy,
    validator: Option<Arc<dyn SchemaValidator>>,
}

impl EventBuilder {
    pub fn new(identity: CollectorIdentity) -> Self {
        EventBuilder {
            identity,
            ..Default::default()
        }
    }

    pub fn with_anonymization(mut self, policy: AnonymizationPolicy) -> Self {
        self.anonymization = policy;
        self
    }

    pub fn anonymization(&self) -> &AnonymizationPolicy {
        &self.anonymization
    }

    /// Reject events whose payload or contexts fail schema validation.
    pub fn with_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn build(&self, params: &RawParams, ctx: &RequestContext) -> Result<Envelope> {
        self.build_at(params, ctx, Utc::now())
    }

    /// Builds an envelope with `now` as the collector timestamp.
    pub fn build_at(
        &self,
        params: &RawParams,
        ctx: &RequestContext,
        now: DateTime<Utc>,
    ) -> Result<Envelope> {
        let metadata = metadata_fields(params);
        let event_metadata = event_metadata_fields(params, &metadata, &self.identity, now);

        let user = user_fields(params, ctx);
        let mut browser = browser_fields(params);
        let dimensions = dimension_fields(params)?;
        browser.screen = dimensions.screen;
        browser.viewport = dimensions.viewport;
        browser.document = dimensions.document;
        let page = page_fields(params, ctx);
        let referrer = referrer_fields(params, page.as_ref());

        let event = event_fields(params)?;
        let contexts = contexts_fields(params)?;
        self.validate(&event, contexts.as_ref())?;

        let mut envelope = Envelope {
            pipeline: Pipeline {
                source: metadata.source,
                collector: event_metadata.collector,
            },
            event_meta: EventMeta {
                uuid: event_metadata.uuid,
                protocol: PROTOCOL.to_string(),
                namespace: event.namespace(),
                app_id: metadata.app_id,
                platform: metadata.platform,
                true_tstamp: event_metadata.true_tstamp,
                derived_tstamp: event_metadata.derived_tstamp,
            },
            user,
            browser,
            page,
            referrer,
            contexts,
            event,
        };

        anonymize_fields(&mut envelope, &self.anonymization, ctx.anonymous);
        Ok(envelope)
    }

    fn validate(&self, event: &Event, contexts: Option<&Contexts>) -> Result<()> {
        let Some(validator) = &self.validator else {
            return Ok(());
        };

        let failed = |schema: &str, reason: String| BuildError::SchemaValidationFailed {
            schema: schema.to_string(),
            reason,
        };

        if let Event::SelfDescribing(SelfDescribingEvent {
            payload: Some(payload),
        }) = event
        {
            validator
                .validate(&payload.schema, &payload.data)
                .map_err(|e| failed(&payload.schema, e.to_string()))?;
        }
        for (schema, data) in contexts.into_iter().flatten() {
            validator
                .validate(schema, data)
                .map_err(|e| failed(schema, e.to_string()))?;
        }
        Ok(())
    }
}

/// Builds with default collector settings: no identity, no anonymization
/// beyond what the client asks for, and no schema validation.
pub fn build_event_from_mapped_params(
    params: &RawParams,
    ctx: &RequestContext,
) -> Result<Envelope> {
    EventBuilder::default().build(params, ctx)
}

fn event_fields(params: &RawParams) -> Result<Event> {
    let code = params
        .get_str(EVENT_TYPE)
        .ok_or(BuildError::MissingEventType)?;

    let event = match EventType::from_code(&code)? {
        EventType::PageView => Event::PageView,
        EventType::PagePing => Event::PagePing(page_ping_fields(params)),
        EventType::Struct => Event::Struct(struct_fields(params)),
        EventType::Transaction => Event::Transaction(transaction_fields(params)),
        EventType::TransactionItem => Event::TransactionItem(transaction_item_fields(params)),
        EventType::SelfDescribing => {
            let event = self_describing_fields(params)?;
            if event.payload.is_none() {
                tracing::debug!("self-describing event without a payload");
            }
            Event::SelfDescribing(event)
        }
    };
    Ok(event)
}
