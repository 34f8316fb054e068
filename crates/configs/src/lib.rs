use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthPolicyConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Portal API base, e.g. `http://localhost:8080/api/v1`.
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: String::new(), timeout_secs: default_timeout() }
    }
}

/// Client-side login policy. An empty domain list disables the check.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthPolicyConfig {
    #[serde(default)]
    pub allowed_email_domains: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_path")]
    pub path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { path: default_session_path() }
    }
}

fn default_timeout() -> u64 { 30 }
fn default_session_path() -> String { ".portal/session.json".to_string() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("PORTAL_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    // A missing config file is fine; env vars can supply everything.
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return Ok(AppConfig::default()),
    };
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.api.normalize_from_env();
        self.api.validate()?;
        self.session.normalize_from_env();
        Ok(())
    }
}

impl ApiConfig {
    pub fn normalize_from_env(&mut self) {
        if self.base_url.trim().is_empty() {
            if let Ok(url) = std::env::var("PORTAL_BASE_URL") {
                self.base_url = url;
            }
        }
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(anyhow!(
                "api.base_url is empty; set it in config.toml or via PORTAL_BASE_URL"
            ));
        }
        let lower = self.base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("api.base_url must start with http:// or https://"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("api.timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }
}

impl SessionConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(path) = std::env::var("PORTAL_SESSION_PATH") {
            if !path.trim().is_empty() {
                self.path = path;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://portal.example.edu/api/v1/"
            timeout_secs = 10

            [auth]
            allowed_email_domains = ["@banasthali.in", "@gmail.com"]

            [session]
            path = "/tmp/session.json"
            "#,
        )
        .unwrap();
        let mut cfg = cfg;
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.api.base_url, "https://portal.example.edu/api/v1");
        assert_eq!(cfg.auth.allowed_email_domains.len(), 2);
    }

    #[test]
    fn rejects_non_http_base_url() {
        let cfg = ApiConfig { base_url: "ftp://x".into(), timeout_secs: 5 };
        assert!(cfg.validate().is_err());
    }
}
