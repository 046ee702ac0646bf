use crate::config::ScraperConfig;
use crate::error::{ScrapeError, ScrapeResult};
use crate::model::{decode_conversation, Conversation};
use crate::twitter::params::CONVERSATION_QUERY;
use crate::twitter::session::{Clock, CredentialManager, SystemClock};
use crate::twitter::ConversationSource;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::sync::Arc;

const GUEST_TOKEN_HEADER: &str = "x-guest-token";
const RATE_LIMIT_REMAINING_HEADER: &str = "x-rate-limit-remaining";

/// Fetches conversation timelines using a guest token.
pub struct Scraper {
    client: Client,
    config: ScraperConfig,
    credentials: CredentialManager,
}

impl Scraper {
    pub fn new(config: ScraperConfig) -> anyhow::Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ScraperConfig, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let value = format!("Bearer {}", config.bearer_token);
        let value = HeaderValue::from_str(&value).context("Invalid bearer token")?;
        headers.insert(AUTHORIZATION, value);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;
        let activate_url = config.activate_url().context("Invalid api base url")?;
        let ttl = config.token_ttl().context("Invalid token ttl")?;
        let credentials = CredentialManager::new(client.clone(), activate_url, ttl, clock);
        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    /// Fetch every tweet and user in the conversation rooted at `id`.
    pub async fn get_conversation(&self, id: u64) -> ScrapeResult<Conversation> {
        let body = self.fetch_timeline(id).await?;
        let conversation = decode_conversation(&body)?;
        log::debug!(
            "Conversation {id}: {} tweets, {} users",
            conversation.tweets.len(),
            conversation.users.len()
        );
        Ok(conversation)
    }

    /// Like [`Scraper::get_conversation`], but gives up as soon as `cancel`
    /// completes. The in-flight request is dropped.
    pub async fn get_conversation_until<F>(
        &self,
        id: u64,
        cancel: F,
    ) -> ScrapeResult<Conversation>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.get_conversation(id) => result,
            () = cancel => {
                log::warn!("Fetch of conversation {id} canceled");
                Err(ScrapeError::Canceled("canceled by caller".to_string()))
            }
        }
    }

    /// Runs with the session locked from token check until the body is read.
    async fn fetch_timeline(&self, id: u64) -> ScrapeResult<Vec<u8>> {
        let url = self.config.conversation_url(id);

        let mut session = self.credentials.lock().await;
        let token = session.ensure_token().await?;
        let token = HeaderValue::from_str(&token)
            .map_err(|e| ScrapeError::Credential(format!("unusable guest token: {e}")))?;

        log::debug!("Requesting conversation {id}");
        let response = self
            .client
            .get(url)
            .query(CONVERSATION_QUERY)
            .header(GUEST_TOKEN_HEADER, token)
            .send()
            .await
            .map_err(ScrapeError::from_transport)?;

        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => return Err(ScrapeError::NotFound(id)),
            StatusCode::TOO_MANY_REQUESTS => {
                log::warn!("Rate limited fetching conversation {id}");
                session.invalidate();
                return Err(ScrapeError::RateLimited);
            }
            // 403 still carries whatever the API was willing to return
            StatusCode::OK | StatusCode::FORBIDDEN => {}
            _ => {
                return Err(ScrapeError::Upstream {
                    status: status.as_u16(),
                    body: body_or_cause(response.text().await),
                });
            }
        }

        if quota_exhausted(response.headers()) {
            log::debug!("Rate limit quota used up, next request gets a new token");
            session.invalidate();
        }

        let body = response
            .bytes()
            .await
            .map_err(ScrapeError::from_transport)?;
        Ok(body.to_vec())
    }
}

fn quota_exhausted(headers: &HeaderMap) -> bool {
    headers
        .get(RATE_LIMIT_REMAINING_HEADER)
        .map_or(false, |v| v.as_bytes() == b"0")
}

fn body_or_cause(text: reqwest::Result<String>) -> String {
    text.unwrap_or_else(|e| format!("<unreadable body: {e}>"))
}

#[async_trait]
impl ConversationSource for Scraper {
    async fn get_conversation(&self, id: u64) -> ScrapeResult<Conversation> {
        Scraper::get_conversation(self, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_exhausted_quota() {
        let mut headers = HeaderMap::new();
        assert!(!quota_exhausted(&headers));
        headers.insert(RATE_LIMIT_REMAINING_HEADER, HeaderValue::from_static("12"));
        assert!(!quota_exhausted(&headers));
        headers.insert(RATE_LIMIT_REMAINING_HEADER, HeaderValue::from_static("0"));
        assert!(quota_exhausted(&headers));
    }

    #[test]
    fn rejects_unusable_bearer_token() {
        let config = ScraperConfig {
            bearer_token: "bad\ntoken".to_string(),
            ..Default::default()
        };
        assert!(Scraper::new(config).is_err());
    }

    #[test]
    fn rejects_out_of_range_ttl() {
        let config = ScraperConfig {
            token_ttl_secs: u64::MAX,
            ..Default::default()
        };
        let err = Scraper::new(config).err().unwrap();
        assert!(format!("{:#}", err).starts_with("Invalid token ttl"));
    }

    #[test]
    fn keeps_cause_of_unreadable_body() {
        assert_eq!(body_or_cause(Ok("over capacity".to_string())), "over capacity");
        let err = Client::new().get("not a url").build().unwrap_err();
        let body = body_or_cause(Err(err));
        assert!(body.starts_with("<unreadable body: "));
    }
}
