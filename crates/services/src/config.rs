use std::env;
use std::time::Duration;

use reqwest::header::HeaderName;
use url::Url;
use wim_core::ValidationPolicy;

use crate::error::ReporterConfigError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CSRF_COOKIE: &str = "csrftoken";
pub const DEFAULT_CSRF_HEADER: &str = "x-csrftoken";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct ReporterConfig {
    pub base_url: Url,
    /// Cookie holding the anti-forgery token.
    pub csrf_cookie: String,
    /// Header the token is echoed back in.
    pub csrf_header: HeaderName,
    pub timeout: Duration,
    pub validation: ValidationPolicy,
    /// Attach the cookie store's raw header as `Cookie:`.
    pub forward_cookies: bool,
}

impl ReporterConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            csrf_cookie: DEFAULT_CSRF_COOKIE.to_string(),
            csrf_header: HeaderName::from_static(DEFAULT_CSRF_HEADER),
            timeout: DEFAULT_TIMEOUT,
            validation: ValidationPolicy::default(),
            forward_cookies: true,
        }
    }

    /// Parse `raw` as the base URL and fill the rest with defaults.
    ///
    /// # Errors
    ///
    /// Returns `ReporterConfigError::InvalidBaseUrl` if `raw` is not an absolute URL.
    pub fn parse(raw: &str) -> Result<Self, ReporterConfigError> {
        Ok(Self::new(parse_base_url(raw)?))
    }

    /// Read the configuration from `WIM_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ReporterConfigError` when a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ReporterConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ReporterConfig::from_env`] with a custom variable source.
    ///
    /// # Errors
    ///
    /// Returns `ReporterConfigError` when a variable is set to an unusable value.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ReporterConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let base_url = get("WIM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let mut config = Self::parse(&base_url)?;

        if let Some(cookie) = get("WIM_CSRF_COOKIE") {
            config = config.with_csrf_cookie(cookie)?;
        }
        if let Some(header) = get("WIM_CSRF_HEADER") {
            config = config.with_csrf_header(&header)?;
        }
        if let Some(raw) = get("WIM_REPORT_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ReporterConfigError::InvalidTimeout { raw: raw.clone() })?;
            if secs == 0 {
                return Err(ReporterConfigError::InvalidTimeout { raw });
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = get("WIM_VALIDATION") {
            config.validation = ValidationPolicy::from_name(&raw)
                .ok_or(ReporterConfigError::InvalidPolicy { raw })?;
        }
        if let Some(raw) = get("WIM_FORWARD_COOKIES") {
            config.forward_cookies = parse_flag("WIM_FORWARD_COOKIES", raw)?;
        }

        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ReporterConfigError::InvalidBaseUrl` if `raw` is not an absolute URL.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ReporterConfigError> {
        self.base_url = parse_base_url(raw)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `ReporterConfigError::EmptyCookieName` for a blank name.
    pub fn with_csrf_cookie(
        mut self,
        name: impl Into<String>,
    ) -> Result<Self, ReporterConfigError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ReporterConfigError::EmptyCookieName);
        }
        self.csrf_cookie = trimmed.to_string();
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `ReporterConfigError::InvalidHeaderName` if `name` is not a valid
    /// HTTP header name.
    pub fn with_csrf_header(mut self, name: &str) -> Result<Self, ReporterConfigError> {
        self.csrf_header = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|_| {
            ReporterConfigError::InvalidHeaderName {
                raw: name.to_string(),
            }
        })?;
        Ok(self)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_validation(mut self, validation: ValidationPolicy) -> Self {
        self.validation = validation;
        self
    }

    #[must_use]
    pub fn with_forward_cookies(mut self, forward_cookies: bool) -> Self {
        self.forward_cookies = forward_cookies;
        self
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ReporterConfigError> {
    Url::parse(raw.trim()).map_err(|source| ReporterConfigError::InvalidBaseUrl {
        raw: raw.to_string(),
        source,
    })
}

fn parse_flag(var: &'static str, raw: String) -> Result<bool, ReporterConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ReporterConfigError::InvalidFlag { var, raw }),
    }
}
