use crate::errors::DecodeError;
use envelope::Dimension;
use url::Url;

/// Parses a `WxH` dimension string such as `1920x1080`. Each half must fit
/// in a `u64`.
pub fn get_dimensions(s: &str) -> Result<Dimension, DecodeError> {
    let invalid = || DecodeError::Dimension(s.to_string());

    let (width, height) = s.split_once('x').ok_or_else(invalid)?;
    // `u64::from_str` accepts a leading `+`, the wire format does not.
    let parse = |half: &str| {
        if half.is_empty() || !half.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        half.parse::<u64>().map_err(|_| invalid())
    };

    Ok(Dimension {
        width: parse(width)?,
        height: parse(height)?,
    })
}

/// The first value of `key` in the query string of `url`.
pub fn get_query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
