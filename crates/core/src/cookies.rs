//! Read-only access to cookie values.
//!
//! The progress pipeline looks tokens up through [`CookieStore`] instead of
//! touching a global cookie jar, so a raw `document.cookie` string, a request
//! `Cookie:` header, or a fixed in-memory map can all back it.

use std::collections::HashMap;
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use tracing::debug;

/// A source of named cookie values.
pub trait CookieStore: Send + Sync {
    /// Return the decoded value of the first cookie named `name`, if any.
    fn get_token(&self, name: &str) -> Option<String>;

    /// The full `Cookie` header value to forward with outbound requests.
    ///
    /// Browsers attach cookies to same-origin requests on their own; other
    /// clients need the raw header to carry the session along with the token.
    fn header_value(&self) -> Option<String> {
        None
    }
}

/// Iterate `(key, raw_value)` pairs of a `;`-separated cookie string in
/// storage order. Entries without `=` are skipped and values are not decoded.
pub fn cookie_pairs(raw: &str) -> impl Iterator<Item = (&str, &str)> {
    raw.split(';')
        .map(str::trim)
        .filter_map(|entry| entry.split_once('='))
}

/// Find `name` in a raw cookie string and percent-decode its value.
///
/// The first matching entry wins. Returns `None` for an empty string, an empty
/// name, no match, or a value that does not decode to UTF-8.
#[must_use]
pub fn find_cookie(raw: &str, name: &str) -> Option<String> {
    if name.is_empty() || raw.trim().is_empty() {
        return None;
    }

    let (_, value) = cookie_pairs(raw).find(|(key, _)| *key == name)?;
    if !has_valid_escapes(value) {
        debug!(cookie = name, "cookie value has a malformed percent escape");
        return None;
    }
    match percent_decode_str(value).decode_utf8() {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(err) => {
            debug!(cookie = name, error = %err, "cookie value is not valid percent-encoded UTF-8");
            None
        }
    }
}

/// Every `%` must start a `%XX` hex escape.
fn has_valid_escapes(value: &str) -> bool {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3);
            if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

/// Cookies backed by a raw cookie string such as `document.cookie` or a
/// `Cookie:` request header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentCookies {
    raw: String,
}

impl DocumentCookies {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }
}

impl CookieStore for DocumentCookies {
    fn get_token(&self, name: &str) -> Option<String> {
        find_cookie(&self.raw, name)
    }

    fn header_value(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.raw.trim().to_string())
        }
    }
}

/// Fixed, already-decoded cookie values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticCookies {
    values: HashMap<String, String>,
}

impl StaticCookies {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }
}

impl CookieStore for StaticCookies {
    fn get_token(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

impl<S: CookieStore + ?Sized> CookieStore for &S {
    fn get_token(&self, name: &str) -> Option<String> {
        (**self).get_token(name)
    }

    fn header_value(&self) -> Option<String> {
        (**self).header_value()
    }
}

impl<S: CookieStore + ?Sized> CookieStore for Arc<S> {
    fn get_token(&self, name: &str) -> Option<String> {
        (**self).get_token(name)
    }

    fn header_value(&self) -> Option<String> {
        (**self).header_value()
    }
}

impl<S: CookieStore + ?Sized> CookieStore for Box<S> {
    fn get_token(&self, name: &str) -> Option<String> {
        (**self).get_token(name)
    }

    fn header_value(&self) -> Option<String> {
        (**self).header_value()
    }
}

impl<S: CookieStore> CookieStore for Option<S> {
    fn get_token(&self, name: &str) -> Option<String> {
        self.as_ref().and_then(|store| store.get_token(name))
    }

    fn header_value(&self) -> Option<String> {
        self.as_ref().and_then(|store| store.header_value())
    }
}
