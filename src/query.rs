//! Build and parse `application/x-www-form-urlencoded` bodies and query
//! strings.
//!
//! Used both for the token endpoint request body and for parsing the query
//! string of the redirect callback. Entries are kept in a `Vec<(String,
//! String)>` rather than a `HashMap` so that [`build`] preserves the order
//! the caller inserted them in — the wire format of an authorization URL is
//! order-sensitive in the eyes of some authorization servers' logs, even
//! though RFC 6749 does not require it.

use url::form_urlencoded;

/// An ordered multimap of form-urlencoded key/value pairs.
pub type Params = Vec<(String, String)>;

/// Builds an `application/x-www-form-urlencoded` string from `params`,
/// preserving insertion order.
///
/// A pair whose value is empty is emitted as a bare key, with no trailing
/// `=`, e.g. `build(&[("scope".into(), "".into())]) == "scope"`.
pub fn build(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| {
            let key = form_urlencoded::byte_serialize(key.as_bytes()).collect::<String>();
            if value.is_empty() {
                key
            } else {
                let value = form_urlencoded::byte_serialize(value.as_bytes()).collect::<String>();
                format!("{key}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Parses an `application/x-www-form-urlencoded` string into an ordered
/// list of key/value pairs.
///
/// Absent input parses to an empty list. Empty segments (`&&`, leading or
/// trailing `&`) are dropped. A segment with no `=` parses to a key with an
/// empty value.
pub fn parse(raw: Option<&str>) -> Params {
    let Some(raw) = raw else {
        return Vec::new();
    };

    raw.split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((key, value)) => (decode(key), decode(value)),
            None => (decode(segment), String::new()),
        })
        .collect()
}

/// Looks up the first value for `key`, mirroring the last-wins-unspecified
/// duplicate-key behavior callers may rely on by always taking the last
/// match.
pub fn get<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn decode(segment: &str) -> String {
    let wrapped = format!("k={segment}");
    form_urlencoded::parse(wrapped.as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_joins_with_ampersand() {
        let params = vec![
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("code".to_string(), "AUTH".to_string()),
        ];
        assert_eq!(build(&params), "grant_type=authorization_code&code=AUTH");
    }

    #[test]
    fn build_omits_equals_for_empty_value() {
        let params = vec![("scope".to_string(), "".to_string())];
        assert_eq!(build(&params), "scope");
    }

    #[test]
    fn build_percent_encodes_reserved_characters() {
        let params = vec![("redirect_uri".to_string(), "http://127.0.0.1:9999/cb".to_string())];
        let built = build(&params);
        assert!(built.starts_with("redirect_uri="));
        assert!(!built.contains("://"));
    }

    #[test]
    fn parse_none_is_empty() {
        assert!(parse(None).is_empty());
    }

    #[test]
    fn parse_drops_empty_segments() {
        let parsed = parse(Some("a=1&&b=2&"));
        assert_eq!(
            parsed,
            vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn parse_segment_without_equals_has_empty_value() {
        let parsed = parse(Some("scope"));
        assert_eq!(parsed, vec![("scope".to_string(), String::new())]);
    }

    #[test]
    fn round_trips_through_build_and_parse() {
        let params = vec![
            ("state".to_string(), "abc123".to_string()),
            ("scope".to_string(), "offline_access read".to_string()),
        ];
        let built = build(&params);
        assert_eq!(parse(Some(&built)), params);
    }

    #[test]
    fn get_returns_last_match() {
        let params = vec![
            ("code".to_string(), "first".to_string()),
            ("code".to_string(), "second".to_string()),
        ];
        assert_eq!(get(&params, "code"), Some("second"));
        assert_eq!(get(&params, "missing"), None);
    }
}
