//! Coarse referrer medium classification by host.

use envelope::ReferrerMedium;

const SEARCH: &[&str] = &[
    "google.",
    "bing.com",
    "duckduckgo.com",
    "search.yahoo.",
    "baidu.com",
    "yandex.",
    "ecosia.org",
    "search.brave.com",
];

const SOCIAL: &[&str] = &[
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "t.co",
    "x.com",
    "linkedin.com",
    "lnkd.in",
    "reddit.com",
    "pinterest.",
    "youtube.com",
    "tiktok.com",
];

const EMAIL: &[&str] = &[
    "mail.google.com",
    "outlook.live.com",
    "outlook.office.com",
    "mail.yahoo.",
    "mail.proton.me",
];

/// Classifies a referrer host relative to the host of the page it led to.
pub fn classify(referrer_host: Option<&str>, page_host: Option<&str>) -> ReferrerMedium {
    let Some(host) = referrer_host.map(|h| h.trim_start_matches("www.").to_ascii_lowercase())
    else {
        return ReferrerMedium::Unknown;
    };

    if let Some(page) = page_host
        && page.trim_start_matches("www.").eq_ignore_ascii_case(&host)
    {
        return ReferrerMedium::Internal;
    }

    // Email hosts are checked first since webmail lives under search domains.
    if matches_any(&host, EMAIL) {
        ReferrerMedium::Email
    } else if matches_any(&host, SEARCH) {
        ReferrerMedium::Search
    } else if matches_any(&host, SOCIAL) {
        ReferrerMedium::Social
    } else {
        ReferrerMedium::Unknown
    }
}

// A pattern ending in `.` matches any TLD; other patterns match the host or
// one of its subdomains.
fn matches_any(host: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|pattern| {
        if pattern.ends_with('.') {
            host.starts_with(pattern) || host.contains(&format!(".{pattern}"))
        } else {
            host == *pattern || host.ends_with(&format!(".{pattern}"))
        }
    })
}
