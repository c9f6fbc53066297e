//! In-place redaction of identifying fields. Runs as the last build step so
//! no unredacted envelope leaves the builder, and over the raw parameters of
//! beacons that failed to build.

use crate::params::RawParams;
use crate::protocol::{
    DOMAIN_USER_ID, FINGERPRINT, IP_ADDRESS, LEGACY_NETWORK_USER_ID, NETWORK_USER_ID, USER_ID,
    USERAGENT,
};
use envelope::Envelope;
use serde::Deserialize;
use std::net::IpAddr;

/// Server-side anonymization settings.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct AnonymizationPolicy {
    /// Number of trailing IPv4 octets to mask, 0 to 4.
    #[serde(default)]
    pub ip_octets: u8,
    /// Number of trailing IPv6 segments to mask, 0 to 8.
    #[serde(default)]
    pub ipv6_segments: u8,
    /// Drop user, domain user, and network user ids along with the fingerprint.
    #[serde(default)]
    pub identifiers: bool,
    #[serde(default)]
    pub useragent: bool,
}

impl AnonymizationPolicy {
    /// The policy for a client that asked to be tracked anonymously. Server
    /// settings that redact more are kept.
    pub fn for_anonymous_client(&self) -> Self {
        AnonymizationPolicy {
            ip_octets: 4,
            ipv6_segments: 8,
            ..self.clone()
        }
    }

    fn effective(&self, anonymous: bool) -> Self {
        if anonymous {
            self.for_anonymous_client()
        } else {
            self.clone()
        }
    }

    fn masks_ip(&self) -> bool {
        self.ip_octets > 0 || self.ipv6_segments > 0
    }
}

pub fn anonymize_fields(envelope: &mut Envelope, policy: &AnonymizationPolicy, anonymous: bool) {
    let user = &mut envelope.user;

    if anonymous {
        user.network_user_id = None;
    }
    let policy = policy.effective(anonymous);

    if policy.identifiers {
        user.id = None;
        user.domain_user_id = None;
        user.network_user_id = None;
        user.fingerprint = None;
    }
    if policy.useragent {
        user.useragent = None;
    }
    if policy.masks_ip() {
        user.ip_address = user
            .ip_address
            .take()
            .and_then(|ip| mask_ip(&ip, policy.ip_octets, policy.ipv6_segments));
    }
}

/// Applies the same redaction as [`anonymize_fields`] to raw wire
/// parameters, for beacons that are forwarded without an envelope.
pub fn anonymize_params(params: &mut RawParams, policy: &AnonymizationPolicy, anonymous: bool) {
    if anonymous {
        params.remove(NETWORK_USER_ID);
        params.remove(LEGACY_NETWORK_USER_ID);
    }
    let policy = policy.effective(anonymous);

    if policy.identifiers {
        for key in [
            USER_ID,
            DOMAIN_USER_ID,
            NETWORK_USER_ID,
            LEGACY_NETWORK_USER_ID,
            FINGERPRINT,
        ] {
            params.remove(key);
        }
    }
    if policy.useragent {
        params.remove(USERAGENT);
    }
    if policy.masks_ip()
        && let Some(ip) = params.remove(IP_ADDRESS)
    {
        let masked = ip
            .as_str()
            .and_then(|ip| mask_ip(ip, policy.ip_octets, policy.ipv6_segments));
        if let Some(masked) = masked {
            params.insert(IP_ADDRESS, masked);
        }
    }
}

/// Replaces trailing parts of an address with `x`. Text that is not an IP
/// address cannot be masked reliably and is dropped.
pub fn mask_ip(ip: &str, octets: u8, segments: u8) -> Option<String> {
    match ip.trim().parse::<IpAddr>().ok()? {
        IpAddr::V4(v4) => {
            let keep = 4 - usize::from(octets.min(4));
            let parts: Vec<String> = v4
                .octets()
                .iter()
                .enumerate()
                .map(|(i, o)| if i < keep { o.to_string() } else { "x".into() })
                .collect();
            Some(parts.join("."))
        }
        IpAddr::V6(v6) => {
            let keep = 8 - usize::from(segments.min(8));
            let parts: Vec<String> = v6
                .segments()
                .iter()
                .enumerate()
                .map(|(i, s)| if i < keep { format!("{s:x}") } else { "x".into() })
                .collect();
            Some(parts.join(":"))
        }
    }
}
