//! Field setters. Each one reads the raw parameters (and where relevant the
//! ambient request) and produces one section of the envelope.

use crate::errors::{BuildError, Result};
use crate::geometry::{get_dimensions, get_query_param};
use crate::params::RawParams;
use crate::payload::{PayloadEncoding, try_contexts, try_sd_payload};
use crate::protocol::*;
use crate::referer;
use crate::RequestContext;
use chrono::{DateTime, Utc};
use envelope::{
    Browser, BrowserFeatures, Campaign, Collector, Contexts, Dimension, Page, PagePing, Platform,
    Referrer, SelfDescribingEvent, Source, StructEvent, Transaction, TransactionItem, UrlParts,
    User,
};
use url::Url;
use uuid::Uuid;

const CLICK_ID_PARAMS: &[&str] = &["gclid", "msclkid", "fbclid", "dclid"];

/// Name and version the collector stamps on every envelope.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollectorIdentity {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// Client-supplied identity of the event and its tracker.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    pub event_id: Option<Uuid>,
    pub app_id: Option<String>,
    pub platform: Option<Platform>,
    pub source: Source,
}

/// Ids and timestamps assigned at build time.
#[derive(Clone, Debug, PartialEq)]
pub struct EventMetadata {
    pub uuid: Uuid,
    pub collector: Collector,
    pub true_tstamp: Option<DateTime<Utc>>,
    pub derived_tstamp: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Dimensions {
    pub screen: Option<Dimension>,
    pub viewport: Option<Dimension>,
    pub document: Option<Dimension>,
}

pub fn metadata_fields(params: &RawParams) -> Metadata {
    Metadata {
        event_id: params
            .get_str(EVENT_ID)
            .and_then(|id| Uuid::parse_str(&id).ok()),
        app_id: params.get_string(APP_ID),
        platform: params.get_str(PLATFORM).and_then(|p| p.parse().ok()),
        source: Source {
            generated_tstamp: params.get_time(DEVICE_CREATED_TSTAMP),
            sent_tstamp: params.get_time(DEVICE_SENT_TSTAMP),
            name: params.get_string(TRACKER_NAMESPACE),
            version: params.get_string(TRACKER_VERSION),
        },
    }
}

/// Fills what the client did not: a generated id when `eid` is absent or
/// malformed, the collector section, and the derived timestamp.
pub fn event_metadata_fields(
    params: &RawParams,
    metadata: &Metadata,
    identity: &CollectorIdentity,
    now: DateTime<Utc>,
) -> EventMetadata {
    let true_tstamp = params.get_time(TRUE_TSTAMP);

    // Shift the collector time by how long the event sat on the device.
    let derived_tstamp = match (metadata.source.generated_tstamp, metadata.source.sent_tstamp) {
        _ if true_tstamp.is_some() => true_tstamp,
        (Some(generated), Some(sent)) => now.checked_sub_signed(sent - generated),
        _ => Some(now),
    };

    EventMetadata {
        uuid: metadata.event_id.unwrap_or_else(Uuid::new_v4),
        collector: Collector {
            tstamp: now,
            name: identity.name.clone(),
            version: identity.version.clone(),
        },
        true_tstamp,
        derived_tstamp,
    }
}

pub fn user_fields(params: &RawParams, ctx: &RequestContext) -> User {
    User {
        id: params.get_string(USER_ID),
        fingerprint: params.get_string(FINGERPRINT),
        domain_user_id: params.get_string(DOMAIN_USER_ID),
        network_user_id: params
            .get_string(NETWORK_USER_ID)
            .or_else(|| params.get_string(LEGACY_NETWORK_USER_ID)),
        session_id: params.get_string(SESSION_ID),
        session_index: params.get_i64(SESSION_INDEX),
        ip_address: params
            .get_string(IP_ADDRESS)
            .or_else(|| ctx.ip.map(|ip| ip.to_string())),
        useragent: params
            .get_string(USERAGENT)
            .or_else(|| ctx.user_agent.clone().filter(|ua| !ua.is_empty())),
    }
}

/// Browser capabilities. Dimensions are filled separately by
/// [`dimension_fields`] since they can fail the build.
pub fn browser_fields(params: &RawParams) -> Browser {
    Browser {
        language: params.get_string(LANGUAGE),
        charset: params.get_string(CHARSET),
        color_depth: params.get_i64(COLOR_DEPTH),
        timezone: params.get_string(TIMEZONE),
        cookies: params.get_bool(COOKIES),
        features: BrowserFeatures {
            pdf: params.get_bool(F_PDF),
            quicktime: params.get_bool(F_QUICKTIME),
            realplayer: params.get_bool(F_REALPLAYER),
            windowsmedia: params.get_bool(F_WINDOWSMEDIA),
            director: params.get_bool(F_DIRECTOR),
            flash: params.get_bool(F_FLASH),
            java: params.get_bool(F_JAVA),
            gears: params.get_bool(F_GEARS),
            silverlight: params.get_bool(F_SILVERLIGHT),
        },
        ..Default::default()
    }
}

pub fn dimension_fields(params: &RawParams) -> Result<Dimensions> {
    let dimension = |key: &'static str| -> Result<Option<Dimension>> {
        params
            .get_str(key)
            .map(|raw| get_dimensions(&raw).map_err(BuildError::decode(key)))
            .transpose()
    };

    Ok(Dimensions {
        screen: dimension(SCREEN_RESOLUTION)?,
        viewport: dimension(VIEWPORT)?,
        document: dimension(DOCUMENT_SIZE)?,
    })
}

/// Page fields from the `url` parameter, falling back to the ambient request
/// URL when the client left it out.
///
/// A page is identified by its URL: with neither source present there is no
/// page section, and a `page` title sent on its own is dropped.
pub fn page_fields(params: &RawParams, ctx: &RequestContext) -> Option<Page> {
    let raw = params
        .get_string(PAGE_URL)
        .or_else(|| ctx.url.as_ref().map(Url::to_string))?;
    let (url, parsed) = url_parts(raw);

    Some(Page {
        url,
        title: params.get_string(PAGE_TITLE),
        campaign: parsed
            .as_ref()
            .map(campaign_fields)
            .filter(|campaign| !campaign.is_empty()),
    })
}

pub fn referrer_fields(params: &RawParams, page: Option<&Page>) -> Option<Referrer> {
    let (url, _) = url_parts(params.get_string(REFERRER_URL)?);
    let page_host = page.and_then(|p| p.url.host.as_deref());
    let medium = referer::classify(url.host.as_deref(), page_host);
    Some(Referrer { url, medium })
}

pub fn page_ping_fields(params: &RawParams) -> PagePing {
    PagePing {
        min_x_offset: params.get_i64(PP_MIN_X),
        max_x_offset: params.get_i64(PP_MAX_X),
        min_y_offset: params.get_i64(PP_MIN_Y),
        max_y_offset: params.get_i64(PP_MAX_Y),
    }
}

pub fn struct_fields(params: &RawParams) -> StructEvent {
    StructEvent {
        category: params.get_string(SE_CATEGORY),
        action: params.get_string(SE_ACTION),
        label: params.get_string(SE_LABEL),
        property: params.get_string(SE_PROPERTY),
        value: params.get_f64(SE_VALUE),
    }
}

pub fn transaction_fields(params: &RawParams) -> Transaction {
    Transaction {
        order_id: params.get_string(TR_ORDER_ID),
        affiliation: params.get_string(TR_AFFILIATION),
        total: params.get_f64(TR_TOTAL),
        tax: params.get_f64(TR_TAX),
        shipping: params.get_f64(TR_SHIPPING),
        city: params.get_string(TR_CITY),
        state: params.get_string(TR_STATE),
        country: params.get_string(TR_COUNTRY),
        currency: params.get_string(TR_CURRENCY),
    }
}

pub fn transaction_item_fields(params: &RawParams) -> TransactionItem {
    TransactionItem {
        order_id: params.get_string(TI_ORDER_ID),
        sku: params.get_string(TI_SKU),
        name: params.get_string(TI_NAME),
        category: params.get_string(TI_CATEGORY),
        price: params.get_f64(TI_PRICE),
        quantity: params.get_i64(TI_QUANTITY),
        currency: params.get_string(TI_CURRENCY),
    }
}

/// The custom event from `ue_px`, else `ue_pr`. A payload that is present but
/// malformed fails the build.
pub fn self_describing_fields(params: &RawParams) -> Result<SelfDescribingEvent> {
    let payload = match params.get_str(SD_EVENT_B64) {
        Some(raw) => try_sd_payload(&raw, PayloadEncoding::Base64)
            .map_err(BuildError::decode(SD_EVENT_B64))?,
        None => match params.get_str(SD_EVENT_JSON) {
            Some(raw) => try_sd_payload(&raw, PayloadEncoding::Json)
                .map_err(BuildError::decode(SD_EVENT_JSON))?,
            None => None,
        },
    };
    Ok(SelfDescribingEvent { payload })
}

/// Contexts from `cx`, else `co`.
pub fn contexts_fields(params: &RawParams) -> Result<Option<Contexts>> {
    if let Some(raw) = params.get_str(CONTEXTS_B64) {
        return try_contexts(&raw, PayloadEncoding::Base64).map_err(BuildError::decode(CONTEXTS_B64));
    }
    match params.get_str(CONTEXTS_JSON) {
        Some(raw) => {
            try_contexts(&raw, PayloadEncoding::Json).map_err(BuildError::decode(CONTEXTS_JSON))
        }
        None => Ok(None),
    }
}

fn url_parts(raw: String) -> (UrlParts, Option<Url>) {
    let Ok(parsed) = Url::parse(&raw) else {
        return (
            UrlParts {
                url: raw,
                ..Default::default()
            },
            None,
        );
    };
    let parts = UrlParts {
        url: raw,
        scheme: Some(parsed.scheme().to_string()),
        host: parsed.host_str().map(str::to_string),
        port: parsed.port_or_known_default(),
        path: Some(parsed.path().to_string()),
        query: parsed.query().map(str::to_string),
        fragment: parsed.fragment().map(str::to_string),
    };
    (parts, Some(parsed))
}

fn campaign_fields(url: &Url) -> Campaign {
    let param = |key: &str| get_query_param(url, key).filter(|v| !v.is_empty());
    Campaign {
        medium: param("utm_medium"),
        source: param("utm_source"),
        term: param("utm_term"),
        content: param("utm_content"),
        campaign: param("utm_campaign"),
        click_id: CLICK_ID_PARAMS.iter().find_map(|key| param(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use envelope::ReferrerMedium;
    use std::net::{IpAddr, Ipv4Addr};

    fn ctx() -> RequestContext {
        RequestContext {
            url: Some(Url::parse("https://fallback.example.com/landing?utm_source=ambient").unwrap()),
            ip: Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7))),
            user_agent: Some("curl/8.0".to_string()),
            anonymous: false,
        }
    }

    #[test]
    fn test_set_metadata_fields() {
        let params = RawParams::from_iter([
            ("eid", "6f9619ff-8b86-d011-b42d-00cf4fc964ff"),
            ("aid", "shop"),
            ("p", "web"),
            ("tna", "sp"),
            ("tv", "js-3.1.0"),
            ("dtm", "1648667060951"),
            ("stm", "garbage"),
        ]);
        let metadata = metadata_fields(&params);

        assert_eq!(
            metadata.event_id,
            Some(Uuid::parse_str("6f9619ff-8b86-d011-b42d-00cf4fc964ff").unwrap())
        );
        assert_eq!(metadata.app_id.as_deref(), Some("shop"));
        assert_eq!(metadata.platform, Some(Platform::Web));
        assert_eq!(metadata.source.name.as_deref(), Some("sp"));
        assert_eq!(metadata.source.version.as_deref(), Some("js-3.1.0"));
        assert_eq!(
            metadata.source.generated_tstamp,
            Utc.timestamp_millis_opt(1648667060951).single()
        );
        assert_eq!(metadata.source.sent_tstamp, None);

        let metadata = metadata_fields(&RawParams::from_iter([("eid", "nope"), ("p", "toaster")]));
        assert_eq!(metadata.event_id, None);
        assert_eq!(metadata.platform, None);
    }

    #[test]
    fn test_set_event_metadata_fields() {
        let now = Utc.timestamp_millis_opt(1_000_000).unwrap();
        let identity = CollectorIdentity {
            name: Some("beacon".to_string()),
            version: Some("0.1.0".to_string()),
        };

        let params = RawParams::from_iter([("dtm", "1000"), ("stm", "4000")]);
        let metadata = metadata_fields(&params);
        let event_metadata = event_metadata_fields(&params, &metadata, &identity, now);
        assert_eq!(event_metadata.collector.tstamp, now);
        assert_eq!(event_metadata.collector.name.as_deref(), Some("beacon"));
        assert_eq!(
            event_metadata.derived_tstamp,
            Utc.timestamp_millis_opt(997_000).single()
        );
        assert_eq!(event_metadata.true_tstamp, None);

        // The true timestamp wins when the client knows it
        let params = RawParams::from_iter([("dtm", "1000"), ("stm", "4000"), ("ttm", "5")]);
        let metadata = metadata_fields(&params);
        let event_metadata = event_metadata_fields(&params, &metadata, &identity, now);
        assert_eq!(event_metadata.true_tstamp, Utc.timestamp_millis_opt(5).single());
        assert_eq!(event_metadata.derived_tstamp, event_metadata.true_tstamp);

        // Without device timestamps there is nothing to correct for
        let params = RawParams::new();
        let event_metadata =
            event_metadata_fields(&params, &metadata_fields(&params), &identity, now);
        assert_eq!(event_metadata.derived_tstamp, Some(now));
    }

    #[test]
    fn test_event_id_generated_when_missing() {
        let params = RawParams::new();
        let metadata = metadata_fields(&params);
        let a = event_metadata_fields(&params, &metadata, &CollectorIdentity::default(), Utc::now());
        let b = event_metadata_fields(&params, &metadata, &CollectorIdentity::default(), Utc::now());
        assert_ne!(a.uuid, b.uuid);
        assert_eq!(a.uuid.get_version_num(), 4);
    }

    #[test]
    fn test_set_user_fields() {
        let params = RawParams::from_iter([
            ("uid", "alice"),
            ("duid", "d-1"),
            ("tnuid", "n-legacy"),
            ("sid", "s-1"),
            ("vid", "3"),
            ("fp", "12345"),
        ]);
        let user = user_fields(&params, &ctx());
        assert_eq!(user.id.as_deref(), Some("alice"));
        assert_eq!(user.domain_user_id.as_deref(), Some("d-1"));
        assert_eq!(user.network_user_id.as_deref(), Some("n-legacy"));
        assert_eq!(user.session_id.as_deref(), Some("s-1"));
        assert_eq!(user.session_index, Some(3));
        assert_eq!(user.ip_address.as_deref(), Some("10.0.0.7"));
        assert_eq!(user.useragent.as_deref(), Some("curl/8.0"));

        // Explicit parameters take precedence over the request
        let params = RawParams::from_iter([
            ("nuid", "n-1"),
            ("tnuid", "n-legacy"),
            ("ip", "1.2.3.4"),
            ("ua", "Mozilla/5.0"),
            ("vid", "three"),
        ]);
        let user = user_fields(&params, &ctx());
        assert_eq!(user.network_user_id.as_deref(), Some("n-1"));
        assert_eq!(user.ip_address.as_deref(), Some("1.2.3.4"));
        assert_eq!(user.useragent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(user.session_index, None);
    }

    #[test]
    fn test_set_browser_features() {
        let params = RawParams::from_iter([
            ("cookie", "1"),
            ("f_pdf", "1"),
            ("f_fla", "0"),
            ("f_java", "maybe"),
            ("lang", "en-GB"),
            ("cd", "24"),
            ("cs", "UTF-8"),
            ("tz", "Europe/London"),
        ]);
        let browser = browser_fields(&params);
        assert_eq!(browser.cookies, Some(true));
        assert_eq!(browser.features.pdf, Some(true));
        assert_eq!(browser.features.flash, Some(false));
        assert_eq!(browser.features.java, None);
        assert_eq!(browser.features.quicktime, None);
        assert_eq!(browser.language.as_deref(), Some("en-GB"));
        assert_eq!(browser.color_depth, Some(24));
        assert_eq!(browser.charset.as_deref(), Some("UTF-8"));
        assert_eq!(browser.timezone.as_deref(), Some("Europe/London"));
    }

    #[test]
    fn test_set_dimension_fields() {
        let params = RawParams::from_iter([("res", "1920x1080"), ("vp", "1200x800")]);
        let dims = dimension_fields(&params).unwrap();
        assert_eq!(
            dims.screen,
            Some(Dimension {
                width: 1920,
                height: 1080
            })
        );
        assert_eq!(
            dims.viewport,
            Some(Dimension {
                width: 1200,
                height: 800
            })
        );
        assert_eq!(dims.document, None);

        let params = RawParams::from_iter([("ds", "wide")]);
        assert!(matches!(
            dimension_fields(&params),
            Err(BuildError::Decode { param: "ds", .. })
        ));
    }

    #[test]
    fn test_set_page_fields() {
        let params = RawParams::from_iter([
            (
                "url",
                "https://shop.example.com:8443/cart?utm_source=news&utm_medium=email&gclid=abc#top",
            ),
            ("page", "Cart"),
        ]);
        let page = page_fields(&params, &ctx()).unwrap();
        assert_eq!(page.url.scheme.as_deref(), Some("https"));
        assert_eq!(page.url.host.as_deref(), Some("shop.example.com"));
        assert_eq!(page.url.port, Some(8443));
        assert_eq!(page.url.path.as_deref(), Some("/cart"));
        assert_eq!(
            page.url.query.as_deref(),
            Some("utm_source=news&utm_medium=email&gclid=abc")
        );
        assert_eq!(page.url.fragment.as_deref(), Some("top"));
        assert_eq!(page.title.as_deref(), Some("Cart"));

        let campaign = page.campaign.unwrap();
        assert_eq!(campaign.source.as_deref(), Some("news"));
        assert_eq!(campaign.medium.as_deref(), Some("email"));
        assert_eq!(campaign.click_id.as_deref(), Some("abc"));
        assert_eq!(campaign.term, None);
    }

    #[test]
    fn test_get_page_fields_from_url() {
        // No `url` parameter: fall back to the ambient request URL
        let page = page_fields(&RawParams::new(), &ctx()).unwrap();
        assert_eq!(page.url.host.as_deref(), Some("fallback.example.com"));
        assert_eq!(page.url.port, Some(443));
        assert_eq!(
            page.campaign.and_then(|c| c.source).as_deref(),
            Some("ambient")
        );

        assert_eq!(page_fields(&RawParams::new(), &RequestContext::default()), None);
        let title_only = RawParams::from_iter([("page", "Home")]);
        assert_eq!(page_fields(&title_only, &RequestContext::default()), None);

        // Unparsable URLs are kept verbatim without components
        let params = RawParams::from_iter([("url", "not a url")]);
        let page = page_fields(&params, &ctx()).unwrap();
        assert_eq!(page.url.url, "not a url");
        assert_eq!(page.url.host, None);
        assert_eq!(page.campaign, None);
    }

    #[test]
    fn test_set_referrer_fields() {
        let params = RawParams::from_iter([
            ("url", "https://shop.example.com/"),
            ("refr", "https://www.google.com/search?q=shoes"),
        ]);
        let page = page_fields(&params, &ctx());
        let referrer = referrer_fields(&params, page.as_ref()).unwrap();
        assert_eq!(referrer.url.host.as_deref(), Some("www.google.com"));
        assert_eq!(referrer.url.query.as_deref(), Some("q=shoes"));
        assert_eq!(referrer.medium, ReferrerMedium::Search);

        let params = RawParams::from_iter([
            ("url", "https://shop.example.com/a"),
            ("refr", "https://shop.example.com/b"),
        ]);
        let page = page_fields(&params, &ctx());
        let referrer = referrer_fields(&params, page.as_ref()).unwrap();
        assert_eq!(referrer.medium, ReferrerMedium::Internal);

        assert_eq!(referrer_fields(&RawParams::new(), page.as_ref()), None);
    }

    #[test]
    fn test_set_page_ping_fields() {
        let params = RawParams::from_iter([
            ("pp_mix", "0"),
            ("pp_max", "10"),
            ("pp_miy", "-5"),
            ("pp_may", "1.5"),
        ]);
        let ping = page_ping_fields(&params);
        assert_eq!(ping.min_x_offset, Some(0));
        assert_eq!(ping.max_x_offset, Some(10));
        assert_eq!(ping.min_y_offset, Some(-5));
        assert_eq!(ping.max_y_offset, None);
    }

    #[test]
    fn test_set_struct_fields() {
        let params = RawParams::from_iter([
            ("se_ca", "video"),
            ("se_ac", "play"),
            ("se_la", "intro"),
            ("se_va", "12.5"),
        ]);
        let event = struct_fields(&params);
        assert_eq!(event.category.as_deref(), Some("video"));
        assert_eq!(event.action.as_deref(), Some("play"));
        assert_eq!(event.label.as_deref(), Some("intro"));
        assert_eq!(event.property, None);
        assert_eq!(event.value, Some(12.5));
    }

    #[test]
    fn test_set_transaction_fields() {
        let params = RawParams::from_iter([
            ("tr_id", "order-1"),
            ("tr_af", "web"),
            ("tr_tt", "23.99"),
            ("tr_tx", "2.00"),
            ("tr_sh", "free"),
            ("tr_ci", "Leeds"),
            ("tr_st", "West Yorkshire"),
            ("tr_co", "UK"),
            ("tr_cu", "GBP"),
        ]);
        let tr = transaction_fields(&params);
        assert_eq!(tr.order_id.as_deref(), Some("order-1"));
        assert_eq!(tr.total, Some(23.99));
        assert_eq!(tr.tax, Some(2.0));
        assert_eq!(tr.shipping, None);
        assert_eq!(tr.country.as_deref(), Some("UK"));
        assert_eq!(tr.currency.as_deref(), Some("GBP"));
    }

    #[test]
    fn test_set_transaction_item_fields() {
        let params = RawParams::from_iter([
            ("ti_id", "order-1"),
            ("ti_sk", "SKU-9"),
            ("ti_nm", "Boots"),
            ("ti_ca", "Shoes"),
            ("ti_pr", "49.95"),
            ("ti_qu", "2"),
            ("ti_cu", "GBP"),
        ]);
        let item = transaction_item_fields(&params);
        assert_eq!(item.sku.as_deref(), Some("SKU-9"));
        assert_eq!(item.price, Some(49.95));
        assert_eq!(item.quantity, Some(2));
    }

    #[test]
    fn test_set_self_describing_fields() {
        let params = RawParams::from_iter([("ue_px", crate::testutils::B64_SD_EVENT)]);
        let event = self_describing_fields(&params).unwrap();
        assert_eq!(
            event.payload.unwrap().data["productId"],
            serde_json::json!("ASO01043")
        );

        let event = self_describing_fields(&RawParams::new()).unwrap();
        assert_eq!(event.payload, None);

        let params = RawParams::from_iter([("ue_pr", "{oops")]);
        assert!(matches!(
            self_describing_fields(&params),
            Err(BuildError::Decode { param: "ue_pr", .. })
        ));
    }

    #[test]
    fn test_set_contexts() {
        let params = RawParams::from_iter([("cx", crate::testutils::B64_CONTEXTS)]);
        assert_eq!(contexts_fields(&params).unwrap().unwrap().len(), 2);

        assert_eq!(contexts_fields(&RawParams::new()).unwrap(), None);

        let params = RawParams::from_iter([("cx", "!!!")]);
        assert!(matches!(
            contexts_fields(&params),
            Err(BuildError::Decode { param: "cx", .. })
        ));
    }
}
