/// Config schema for the WAHA gateway connection.
use {secrecy::Secret, serde::Deserialize};

/// Default gateway base URL (WAHA listens on port 3000 out of the box).
pub const DEFAULT_URL: &str = "http://localhost:3000";

/// Default gateway session name.
pub const DEFAULT_SESSION: &str = "default";

/// Default dialing code used when normalizing local phone numbers.
pub const DEFAULT_COUNTRY_CODE: &str = "233";

/// Root configuration.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WahaConfig {
    /// Sent as the `X-Api-Key` header on every gateway call.
    pub api_key: Option<Secret<String>>,

    /// Gateway base URL, without the `/api` suffix.
    pub url: String,

    /// Session used when a message does not name one.
    pub session: String,

    /// Dialing code prepended to local numbers.
    pub country_code: String,
}

impl Default for WahaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            url: DEFAULT_URL.into(),
            session: DEFAULT_SESSION.into(),
            country_code: DEFAULT_COUNTRY_CODE.into(),
        }
    }
}

impl WahaConfig {
    /// Let `WAHA_*` environment variables take precedence over file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides resolved through `lookup`. Empty values are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("WAHA_API_KEY") {
            self.api_key = Some(Secret::new(key));
        }
        if let Some(url) = get("WAHA_URL") {
            self.url = url;
        }
        if let Some(session) = get("WAHA_SESSION") {
            self.session = session;
        }
        if let Some(code) = get("WAHA_COUNTRY_CODE") {
            self.country_code = code;
        }
    }
}
