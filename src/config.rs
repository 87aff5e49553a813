// src/config.rs
use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use url::Url;

#[derive(Debug)]
pub enum ConfigError {
    Invalid { var: &'static str, value: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { var, value, reason } => {
                write!(f, "{var}={value:?} is invalid: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareMode {
    /// Hand the PDF back as the HTTP response.
    Download,
    /// No share mechanism; exports end with an informational page.
    None,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Realtime database base URL. `None` runs against the in-memory feed.
    pub database_url: Option<Url>,
    pub collection_path: String,
    /// Server-side ordering hint; the history is re-sorted locally regardless.
    pub order_by: Option<String>,
    pub seed_file: Option<PathBuf>,
    pub export_dir: PathBuf,
    pub album: String,
    pub media_library: bool,
    pub share: ShareMode,
    pub sqlite_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_url: None,
            collection_path: "RecycleWasteCollection".to_string(),
            order_by: Some("dateAndTime".to_string()),
            seed_file: None,
            export_dir: PathBuf::from("exports"),
            album: "Download".to_string(),
            media_library: true,
            share: ShareMode::Download,
            sqlite_path: PathBuf::from("recycle_history.sqlite3"),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

        if let Some(v) = get("RECYCLE_BIND_ADDR") {
            cfg.bind_addr = v.parse().map_err(|e: std::net::AddrParseError| invalid("RECYCLE_BIND_ADDR", &v, e))?;
        }
        if let Some(v) = get("RECYCLE_DATABASE_URL").filter(|v| !v.is_empty()) {
            let url = Url::parse(&v).map_err(|e| invalid("RECYCLE_DATABASE_URL", &v, e))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(invalid("RECYCLE_DATABASE_URL", &v, "expected http or https"));
            }
            cfg.database_url = Some(url);
        }
        if let Some(v) = get("RECYCLE_COLLECTION_PATH") {
            if v.trim_matches('/').is_empty() {
                return Err(invalid("RECYCLE_COLLECTION_PATH", &v, "must not be empty"));
            }
            cfg.collection_path = v;
        }
        if let Some(v) = get("RECYCLE_ORDER_BY") {
            cfg.order_by = Some(v).filter(|v| !v.is_empty());
        }
        if let Some(v) = get("RECYCLE_SEED_FILE").filter(|v| !v.is_empty()) {
            cfg.seed_file = Some(PathBuf::from(v));
        }
        if let Some(v) = get("RECYCLE_EXPORT_DIR").filter(|v| !v.is_empty()) {
            cfg.export_dir = PathBuf::from(v);
        }
        if let Some(v) = get("RECYCLE_ALBUM").filter(|v| !v.is_empty()) {
            cfg.album = v;
        }
        if let Some(v) = get("RECYCLE_MEDIA_LIBRARY") {
            cfg.media_library = match v.to_ascii_lowercase().as_str() {
                "on" | "true" | "1" => true,
                "off" | "false" | "0" => false,
                _ => return Err(invalid("RECYCLE_MEDIA_LIBRARY", &v, "expected on or off")),
            };
        }
        if let Some(v) = get("RECYCLE_SHARE") {
            cfg.share = match v.to_ascii_lowercase().as_str() {
                "download" => ShareMode::Download,
                "none" | "off" => ShareMode::None,
                _ => return Err(invalid("RECYCLE_SHARE", &v, "expected download or none")),
            };
        }
        if let Some(v) = get("RECYCLE_SQLITE").filter(|v| !v.is_empty()) {
            cfg.sqlite_path = PathBuf::from(v);
        }

        Ok(cfg)
    }
}

fn invalid(var: &'static str, value: &str, reason: impl fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_match_the_mobile_app() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.collection_path, "RecycleWasteCollection");
        assert_eq!(cfg.order_by.as_deref(), Some("dateAndTime"));
        assert_eq!(cfg.album, "Download");
        assert!(cfg.database_url.is_none());
        assert!(cfg.media_library);
        assert_eq!(cfg.share, ShareMode::Download);
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = load(&[
            ("RECYCLE_BIND_ADDR", "0.0.0.0:8080"),
            ("RECYCLE_DATABASE_URL", "https://example-rtdb.firebaseio.com"),
            ("RECYCLE_ORDER_BY", ""),
            ("RECYCLE_MEDIA_LIBRARY", "off"),
            ("RECYCLE_SHARE", "none"),
        ])
        .unwrap();

        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(
            cfg.database_url.unwrap().host_str(),
            Some("example-rtdb.firebaseio.com")
        );
        assert_eq!(cfg.order_by, None);
        assert!(!cfg.media_library);
        assert_eq!(cfg.share, ShareMode::None);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(load(&[("RECYCLE_BIND_ADDR", "localhost")]).is_err());
        assert!(load(&[("RECYCLE_DATABASE_URL", "not a url")]).is_err());
        assert!(load(&[("RECYCLE_DATABASE_URL", "ftp://x.example")]).is_err());
        assert!(load(&[("RECYCLE_SHARE", "airdrop")]).is_err());
        assert!(load(&[("RECYCLE_COLLECTION_PATH", "/")]).is_err());
    }
}
