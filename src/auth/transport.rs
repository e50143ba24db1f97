//! Session transport: carries the token in a cookie, or in a bearer header.

use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::AuthConfig;

/// Cookie attributes for the session token.
#[derive(Debug, Clone)]
pub struct SessionTransport {
    cookie_name: String,
    secure: bool,
    same_site: SameSite,
    max_age: time::Duration,
}

impl SessionTransport {
    pub fn new(cookie_name: impl Into<String>, secure: bool, same_site: SameSite, ttl_hours: i64) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            secure,
            same_site,
            max_age: time::Duration::hours(ttl_hours),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.cookie_name.clone(),
            config.cookie_secure,
            config.cookie_same_site,
            config.token_ttl_hours,
        )
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(self.max_age)
            .build()
    }

    /// Set the session cookie for `token`
    pub fn attach(&self, jar: CookieJar, token: String) -> CookieJar {
        jar.add(self.cookie(token))
    }

    /// Expire the session cookie.
    ///
    /// Always emits a Set-Cookie, whether or not the request carried the cookie.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        let mut cookie = self.cookie(String::new());
        cookie.make_removal();
        jar.add(cookie)
    }

    /// Token from the session cookie, falling back to `Authorization: Bearer`.
    pub fn extract(&self, jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
        if let Some(cookie) = jar.get(&self.cookie_name) {
            let value = cookie.value().trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }

        headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn transport() -> SessionTransport {
        SessionTransport::new("token", true, SameSite::Strict, 24)
    }

    #[test]
    fn test_attach_sets_security_attributes() {
        let jar = transport().attach(CookieJar::new(), "abc".to_string());
        let cookie = jar.get("token").unwrap();

        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(24)));
    }

    #[test]
    fn test_clear_expires_cookie() {
        let transport = transport();
        let jar = transport.attach(CookieJar::new(), "abc".to_string());
        let jar = transport.clear(jar);
        let cookie = jar.get("token").unwrap();

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }

    #[test]
    fn test_extract_prefers_cookie() {
        let transport = transport();
        let jar = CookieJar::new().add(Cookie::new("token", "from-cookie"));
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));

        assert_eq!(transport.extract(&jar, &headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_extract_falls_back_to_bearer() {
        let transport = transport();
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));

        assert_eq!(
            transport.extract(&CookieJar::new(), &headers).as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn test_extract_nothing() {
        let transport = transport();
        let mut headers = HeaderMap::new();
        assert_eq!(transport.extract(&CookieJar::new(), &headers), None);

        // Other schemes and empty values are not tokens
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(transport.extract(&CookieJar::new(), &headers), None);
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(transport.extract(&CookieJar::new(), &headers), None);

        let jar = CookieJar::new().add(Cookie::new("token", ""));
        assert_eq!(transport.extract(&jar, &HeaderMap::new()), None);
    }
}
