use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Tracker platform code (`p`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Web,
    Mob,
    Pc,
    Srv,
    App,
    Tv,
    Cnsl,
    Iot,
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("unknown platform code: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web" => Ok(Platform::Web),
            "mob" => Ok(Platform::Mob),
            "pc" => Ok(Platform::Pc),
            "srv" => Ok(Platform::Srv),
            "app" => Ok(Platform::App),
            "tv" => Ok(Platform::Tv),
            "cnsl" => Ok(Platform::Cnsl),
            "iot" => Ok(Platform::Iot),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    pub uuid: Uuid,
    pub protocol: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_tstamp: Option<DateTime<Utc>>,
    /// Collector time corrected for the device clock skew
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_tstamp: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub useragent: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub width: u64,
    pub height: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Browser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_depth: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<bool>,
    #[serde(default)]
    pub features: BrowserFeatures,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Dimension>,
}

/// Plugin capability flags (`f_*`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserFeatures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quicktime: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realplayer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windowsmedia: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub java: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gears: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silverlight: Option<bool>,
}

/// A URL split into its parts. `url` keeps the client's raw text even when it
/// does not parse, in which case the parts are absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlParts {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(flatten)]
    pub url: UrlParts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<Campaign>,
}

/// Marketing attribution read from the page URL.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_id: Option<String>,
}

impl Campaign {
    pub fn is_empty(&self) -> bool {
        *self == Campaign::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferrerMedium {
    Internal,
    Search,
    Social,
    Email,
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Referrer {
    #[serde(flatten)]
    pub url: UrlParts,
    pub medium: ReferrerMedium,
}
