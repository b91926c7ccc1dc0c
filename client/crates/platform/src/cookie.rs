//! Cookie Inspection
//!
//! The server session lives in a cookie the client never reads directly
//! (it is `HttpOnly`). The bridge only needs to know whether a session
//! response actually set one, so this module parses `Set-Cookie` headers
//! into their attributes.

use chrono::{DateTime, Utc};
use http::{HeaderMap, header};

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "strict" => Some(SameSite::Strict),
            "lax" => Some(SameSite::Lax),
            "none" => Some(SameSite::None),
            _ => None,
        }
    }
}

/// Attributes of one `Set-Cookie` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub has_value: bool,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
    pub path: Option<String>,
    pub max_age_secs: Option<i64>,
    pub expires: Option<DateTime<Utc>>,
}

impl SetCookie {
    /// Parse a `Set-Cookie` header value
    ///
    /// Returns `None` when there is no `name=value` pair.
    pub fn parse(header_value: &str) -> Option<Self> {
        let mut parts = header_value.split(';');
        let (name, value) = parts.next()?.trim().split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = SetCookie {
            name: name.to_string(),
            has_value: !value.trim().trim_matches('"').is_empty(),
            secure: false,
            http_only: false,
            same_site: None,
            path: None,
            max_age_secs: None,
            expires: None,
        };

        for attr in parts {
            let (key, val) = match attr.trim().split_once('=') {
                Some((k, v)) => (k.trim(), Some(v.trim())),
                None => (attr.trim(), None),
            };
            match (key.to_ascii_lowercase().as_str(), val) {
                ("secure", _) => cookie.secure = true,
                ("httponly", _) => cookie.http_only = true,
                ("samesite", Some(v)) => cookie.same_site = SameSite::parse(v),
                ("path", Some(v)) => cookie.path = Some(v.to_string()),
                ("max-age", Some(v)) => cookie.max_age_secs = v.parse().ok(),
                ("expires", Some(v)) => cookie.expires = parse_expires(v),
                _ => {}
            }
        }

        Some(cookie)
    }

    /// Whether this header removes the cookie instead of setting it
    pub fn is_deletion(&self) -> bool {
        self.is_deletion_at(Utc::now())
    }

    /// Same as [`is_deletion`](Self::is_deletion), evaluated at `now`
    ///
    /// `Max-Age` wins over `Expires` when both are present.
    pub fn is_deletion_at(&self, now: DateTime<Utc>) -> bool {
        if !self.has_value {
            return true;
        }
        match (self.max_age_secs, self.expires) {
            (Some(age), _) => age <= 0,
            (None, Some(expires)) => expires <= now,
            (None, None) => false,
        }
    }
}

/// Parse an `Expires` date (`Thu, 01 Jan 1970 00:00:00 GMT`, or the
/// older dashed `01-Jan-1970` form)
fn parse_expires(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc2822(&value.replace('-', " ")))
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Parse every `Set-Cookie` header in a response
pub fn set_cookies(headers: &HeaderMap) -> Vec<SetCookie> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(SetCookie::parse)
        .collect()
}

/// Whether the response establishes at least one cookie
pub fn sets_any_cookie(headers: &HeaderMap) -> bool {
    set_cookies(headers).iter().any(|c| !c.is_deletion())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_parse_attributes() {
        let cookie = SetCookie::parse(
            "__session=abc123; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age=1209600",
        )
        .unwrap();

        assert_eq!(cookie.name, "__session");
        assert!(cookie.has_value);
        assert!(cookie.http_only);
        assert!(cookie.secure);
        assert_eq!(cookie.same_site, Some(SameSite::Strict));
        assert_eq!(cookie.path.as_deref(), Some("/"));
        assert_eq!(cookie.max_age_secs, Some(1_209_600));
        assert!(!cookie.is_deletion());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(SetCookie::parse("").is_none());
        assert!(SetCookie::parse("novalue").is_none());
        assert!(SetCookie::parse("=abc").is_none());
    }

    #[test]
    fn test_deletion() {
        assert!(SetCookie::parse("session=; Max-Age=0").unwrap().is_deletion());
        assert!(SetCookie::parse("session=x; Max-Age=0").unwrap().is_deletion());
        assert!(!SetCookie::parse("session=x").unwrap().is_deletion());
    }

    #[test]
    fn test_expires_in_the_past_is_deletion() {
        let past = SetCookie::parse("session=x; Expires=Thu, 01 Jan 1970 00:00:00 GMT").unwrap();
        assert_eq!(past.expires, DateTime::from_timestamp(0, 0));
        assert!(past.is_deletion());

        let dashed = SetCookie::parse("session=x; expires=Thu, 01-Jan-1970 00:00:00 GMT").unwrap();
        assert!(dashed.is_deletion());

        let future = SetCookie::parse("session=x; Expires=Fri, 01 Jan 2100 00:00:00 GMT").unwrap();
        assert!(!future.is_deletion());

        // Max-Age takes precedence
        let both =
            SetCookie::parse("session=x; Max-Age=3600; Expires=Thu, 01 Jan 1970 00:00:00 GMT")
                .unwrap();
        assert!(!both.is_deletion());

        let garbage = SetCookie::parse("session=x; Expires=someday").unwrap();
        assert_eq!(garbage.expires, None);
        assert!(!garbage.is_deletion());
    }

    #[test]
    fn test_sets_any_cookie() {
        let mut headers = HeaderMap::new();
        assert!(!sets_any_cookie(&headers));

        headers.append(header::SET_COOKIE, HeaderValue::from_static("old=; Max-Age=0"));
        headers.append(
            header::SET_COOKIE,
            HeaderValue::from_static("stale=x; Expires=Thu, 01 Jan 1970 00:00:00 GMT"),
        );
        assert!(!sets_any_cookie(&headers));

        headers.append(
            header::SET_COOKIE,
            HeaderValue::from_static("session=abc; HttpOnly; SameSite=Lax"),
        );
        assert!(sets_any_cookie(&headers));
        assert_eq!(set_cookies(&headers).len(), 3);
    }
}
