use crate::domain_model::TokenPair;
use std::fmt::Write;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Pick the presented access token: the `Authorization: Bearer` header when
/// present, else the `access_token` cookie. A malformed header does not fall
/// back to the cookie.
pub fn extract_token(authorization: Option<&str>, cookie: Option<&str>) -> Option<String> {
    match authorization.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => {
            let (scheme, token) = value.split_once(' ')?;
            if !scheme.eq_ignore_ascii_case("bearer") {
                return None;
            }
            let token = token.trim();
            (!token.is_empty()).then(|| token.to_owned())
        }
        None => cookie
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned),
    }
}

fn cookie(name: &str, value: &str, clear: bool) -> String {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax");
    if clear {
        let _ = write!(cookie, "; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT");
    }
    cookie
}

pub fn session_cookies(pair: &TokenPair) -> [String; 2] {
    [
        cookie(ACCESS_COOKIE, &pair.access_token.0, false),
        cookie(REFRESH_COOKIE, &pair.refresh_token.0, false),
    ]
}

pub fn cleared_cookies() -> [String; 2] {
    [
        cookie(ACCESS_COOKIE, "", true),
        cookie(REFRESH_COOKIE, "", true),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_wins_over_cookie() {
        assert_eq!(
            extract_token(Some("Bearer abc"), Some("cookie")),
            Some("abc".to_string())
        );
        assert_eq!(
            extract_token(Some("bearer  abc "), None),
            Some("abc".to_string())
        );
    }

    #[test]
    fn cookie_is_used_without_header() {
        assert_eq!(extract_token(None, Some("xyz")), Some("xyz".to_string()));
        assert_eq!(extract_token(Some("  "), Some("xyz")), Some("xyz".to_string()));
        assert_eq!(extract_token(None, Some("")), None);
        assert_eq!(extract_token(None, None), None);
    }

    #[test]
    fn malformed_header_is_rejected() {
        assert_eq!(extract_token(Some("Basic abc"), Some("xyz")), None);
        assert_eq!(extract_token(Some("Bearer"), Some("xyz")), None);
        assert_eq!(extract_token(Some("Bearer   "), None), None);
    }

    #[test]
    fn cleared_cookies_expire_immediately() {
        for c in cleared_cookies() {
            assert!(c.contains("Max-Age=0"));
            assert!(c.contains("HttpOnly"));
        }
    }
}
