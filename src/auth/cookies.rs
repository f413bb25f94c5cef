use axum::http::HeaderMap;

use crate::config;

pub const AUTH_COOKIE: &str = "auth_token";
pub const ADMIN_COOKIE: &str = "admin_token";
pub const DEMO_COOKIE: &str = "demo_token";

/// Pull a named cookie value out of the Cookie header, if present.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get("cookie")?.to_str().ok()?;
    for pair in header.split(';') {
        let Some((key, value)) = pair.trim().split_once('=') else {
            continue;
        };
        if key == name {
            return Some(value.to_string());
        }
    }
    None
}

/// Build a Set-Cookie value. All auth cookies are HttpOnly, SameSite=Strict,
/// Path=/; the Secure attribute is gated on the environment.
pub fn build_cookie(name: &str, value: &str, max_age_secs: i64) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        name, value, max_age_secs
    );
    if config::config().security.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build a Set-Cookie value that expires the named cookie immediately.
pub fn clear_cookie(name: &str) -> String {
    build_cookie(name, "", 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_str(value).expect("header"));
        headers
    }

    #[test]
    fn finds_cookie_among_many() {
        let headers = headers_with_cookie("a=1; auth_token=abc.def.ghi; b=2");
        assert_eq!(
            get_cookie(&headers, AUTH_COOKIE),
            Some("abc.def.ghi".to_string())
        );
        assert_eq!(get_cookie(&headers, "b"), Some("2".to_string()));
    }

    #[test]
    fn missing_cookie_is_none() {
        let headers = headers_with_cookie("a=1");
        assert_eq!(get_cookie(&headers, AUTH_COOKIE), None);
        assert_eq!(get_cookie(&HeaderMap::new(), AUTH_COOKIE), None);
    }

    #[test]
    fn built_cookie_carries_attributes() {
        let cookie = build_cookie(DEMO_COOKIE, "tok", 86400);
        assert!(cookie.starts_with("demo_token=tok; Path=/"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=86400"));
    }

    #[test]
    fn cleared_cookie_has_zero_max_age() {
        let cookie = clear_cookie(AUTH_COOKIE);
        assert!(cookie.starts_with("auth_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
