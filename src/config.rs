use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use url::Url;

/// Bearer token of the public web client.
pub const WEB_BEARER_TOKEN: &str = "AAAAAAAAAAAAAAAAAAAAAPYXBAAAAAAACLXUNDekMxqa8h%2F40K4moUkGsoc%3DTYfbDKbT3jJPCEVnMYqilB28NHfOPqkca3qaAxGfsyKCs0wRbw";

const TIMEOUT_SEC: u64 = 60;
const GUEST_TOKEN_TTL_SEC: u64 = 2 * 60 * 60;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ScraperConfig {
    /// Sent as `Authorization: Bearer ...` on every request
    pub bearer_token: String,
    /// Host serving `/1.1/guest/activate.json`
    pub api_base: Url,
    /// Host serving `/i/api/2/timeline/conversation/{id}.json`
    pub web_base: Url,
    pub timeout_secs: u64,
    pub token_ttl_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            bearer_token: WEB_BEARER_TOKEN.to_string(),
            api_base: Url::parse("https://api.twitter.com").expect("valid url"),
            web_base: Url::parse("https://twitter.com").expect("valid url"),
            timeout_secs: TIMEOUT_SEC,
            token_ttl_secs: GUEST_TOKEN_TTL_SEC,
        }
    }
}

impl ScraperConfig {
    /// Config with both hosts pointed at `base`, used to aim the scraper at a
    /// mock upstream.
    pub fn with_base(base: &str) -> Result<Self, url::ParseError> {
        let base = Url::parse(base)?;
        Ok(Self {
            api_base: base.clone(),
            web_base: base,
            ..Default::default()
        })
    }

    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .await
            .context("Unable to read config file")?;
        serde_json::from_str(&raw).context("Unable to deserialize config file")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn token_ttl(&self) -> Result<chrono::Duration, chrono::OutOfRangeError> {
        chrono::Duration::from_std(Duration::from_secs(self.token_ttl_secs))
    }

    pub(crate) fn activate_url(&self) -> Result<Url, url::ParseError> {
        self.api_base.join("/1.1/guest/activate.json")
    }

    pub(crate) fn conversation_url(&self, id: u64) -> Url {
        let mut url = self.web_base.clone();
        url.set_path(&format!("/i/api/2/timeline/conversation/{id}.json"));
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: ScraperConfig = serde_json::from_str(r#"{"timeout_secs": 5}"#).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.token_ttl().unwrap(), chrono::Duration::hours(2));
        assert_eq!(config.bearer_token, WEB_BEARER_TOKEN);
    }

    #[test]
    fn out_of_range_ttl_is_rejected() {
        let config: ScraperConfig =
            serde_json::from_str(r#"{"token_ttl_secs": 9223372036854775807}"#).unwrap();
        assert!(config.token_ttl().is_err());
        let config: ScraperConfig =
            serde_json::from_str(r#"{"token_ttl_secs": 18446744073709551615}"#).unwrap();
        assert!(config.token_ttl().is_err());
    }

    #[test]
    fn builds_endpoint_urls() {
        let config = ScraperConfig::default();
        assert_eq!(
            config.activate_url().unwrap().as_str(),
            "https://api.twitter.com/1.1/guest/activate.json"
        );
        assert_eq!(
            config.conversation_url(1234567890123456789).as_str(),
            "https://twitter.com/i/api/2/timeline/conversation/1234567890123456789.json"
        );
    }

    #[test]
    fn mock_base_replaces_both_hosts() {
        let config = ScraperConfig::with_base("http://127.0.0.1:4000").unwrap();
        assert_eq!(
            config.activate_url().unwrap().as_str(),
            "http://127.0.0.1:4000/1.1/guest/activate.json"
        );
        assert_eq!(
            config.conversation_url(9).as_str(),
            "http://127.0.0.1:4000/i/api/2/timeline/conversation/9.json"
        );
    }
}
