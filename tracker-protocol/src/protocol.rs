//! Parameter keys of the tracker protocol. These are a compatibility contract
//! with deployed trackers and must not change.

use crate::errors::BuildError;

pub const PROTOCOL: &str = "snowplow";

pub const EVENT_TYPE: &str = "e";

// Metadata
pub const EVENT_ID: &str = "eid";
pub const APP_ID: &str = "aid";
pub const PLATFORM: &str = "p";
pub const TRACKER_NAMESPACE: &str = "tna";
pub const TRACKER_VERSION: &str = "tv";
pub const DEVICE_CREATED_TSTAMP: &str = "dtm";
pub const DEVICE_SENT_TSTAMP: &str = "stm";
pub const TRUE_TSTAMP: &str = "ttm";

// User
pub const USER_ID: &str = "uid";
pub const DOMAIN_USER_ID: &str = "duid";
pub const NETWORK_USER_ID: &str = "nuid";
pub const LEGACY_NETWORK_USER_ID: &str = "tnuid";
pub const SESSION_ID: &str = "sid";
pub const SESSION_INDEX: &str = "vid";
pub const FINGERPRINT: &str = "fp";
pub const IP_ADDRESS: &str = "ip";
pub const USERAGENT: &str = "ua";

// Browser
pub const LANGUAGE: &str = "lang";
pub const CHARSET: &str = "cs";
pub const COLOR_DEPTH: &str = "cd";
pub const TIMEZONE: &str = "tz";
pub const COOKIES: &str = "cookie";
pub const F_PDF: &str = "f_pdf";
pub const F_QUICKTIME: &str = "f_qt";
pub const F_REALPLAYER: &str = "f_realp";
pub const F_WINDOWSMEDIA: &str = "f_wma";
pub const F_DIRECTOR: &str = "f_dir";
pub const F_FLASH: &str = "f_fla";
pub const F_JAVA: &str = "f_java";
pub const F_GEARS: &str = "f_gears";
pub const F_SILVERLIGHT: &str = "f_ag";

// Dimensions
pub const SCREEN_RESOLUTION: &str = "res";
pub const VIEWPORT: &str = "vp";
pub const DOCUMENT_SIZE: &str = "ds";

// Page and referrer
pub const PAGE_URL: &str = "url";
pub const PAGE_TITLE: &str = "page";
pub const REFERRER_URL: &str = "refr";

// Page ping
pub const PP_MIN_X: &str = "pp_mix";
pub const PP_MAX_X: &str = "pp_max";
pub const PP_MIN_Y: &str = "pp_miy";
pub const PP_MAX_Y: &str = "pp_may";

// Structured event
pub const SE_CATEGORY: &str = "se_ca";
pub const SE_ACTION: &str = "se_ac";
pub const SE_LABEL: &str = "se_la";
pub const SE_PROPERTY: &str = "se_pr";
pub const SE_VALUE: &str = "se_va";

// Transaction
pub const TR_ORDER_ID: &str = "tr_id";
pub const TR_AFFILIATION: &str = "tr_af";
pub const TR_TOTAL: &str = "tr_tt";
pub const TR_TAX: &str = "tr_tx";
pub const TR_SHIPPING: &str = "tr_sh";
pub const TR_CITY: &str = "tr_ci";
pub const TR_STATE: &str = "tr_st";
pub const TR_COUNTRY: &str = "tr_co";
pub const TR_CURRENCY: &str = "tr_cu";

// Transaction item
pub const TI_ORDER_ID: &str = "ti_id";
pub const TI_SKU: &str = "ti_sk";
pub const TI_NAME: &str = "ti_nm";
pub const TI_CATEGORY: &str = "ti_ca";
pub const TI_PRICE: &str = "ti_pr";
pub const TI_QUANTITY: &str = "ti_qu";
pub const TI_CURRENCY: &str = "ti_cu";

// Self-describing payloads
pub const SD_EVENT_B64: &str = "ue_px";
pub const SD_EVENT_JSON: &str = "ue_pr";
pub const CONTEXTS_B64: &str = "cx";
pub const CONTEXTS_JSON: &str = "co";

/// Value of the `e` discriminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventType {
    PageView,
    PagePing,
    Struct,
    Transaction,
    TransactionItem,
    SelfDescribing,
}

impl EventType {
    pub fn from_code(code: &str) -> Result<Self, BuildError> {
        match code {
            "pv" => Ok(EventType::PageView),
            "pp" => Ok(EventType::PagePing),
            "se" => Ok(EventType::Struct),
            "tr" => Ok(EventType::Transaction),
            "ti" => Ok(EventType::TransactionItem),
            "ue" => Ok(EventType::SelfDescribing),
            other => Err(BuildError::UnknownEventType(other.to_string())),
        }
    }

    /// Same names as [`envelope::Event::name`].
    pub const fn name(&self) -> &'static str {
        match self {
            EventType::PageView => "page_view",
            EventType::PagePing => "page_ping",
            EventType::Struct => "struct",
            EventType::Transaction => "transaction",
            EventType::TransactionItem => "transaction_item",
            EventType::SelfDescribing => "self_describing",
        }
    }
}
