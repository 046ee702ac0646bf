//! Guest token bookkeeping.

use crate::error::{ScrapeError, ScrapeResult};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use url::Url;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct GuestSession {
    token: String,
    issued_at: DateTime<Utc>,
}

impl GuestSession {
    fn is_valid(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        !self.token.is_empty() && now - self.issued_at < ttl
    }
}

#[derive(Deserialize)]
struct ActivateResponse {
    guest_token: String,
}

/// Owns the current guest token. All access goes through [`CredentialManager::lock`],
/// so at most one refresh is ever in flight.
pub struct CredentialManager {
    client: Client,
    activate_url: Url,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
    session: Mutex<Option<GuestSession>>,
}

/// Exclusive access to the session, held for the whole of a request.
pub struct SessionGuard<'a> {
    manager: &'a CredentialManager,
    session: MutexGuard<'a, Option<GuestSession>>,
}

impl CredentialManager {
    pub fn new(
        client: Client,
        activate_url: Url,
        ttl: chrono::Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            activate_url,
            ttl,
            clock,
            session: Mutex::new(None),
        }
    }

    pub async fn lock(&self) -> SessionGuard<'_> {
        SessionGuard {
            manager: self,
            session: self.session.lock().await,
        }
    }

    pub async fn ensure_token(&self) -> ScrapeResult<String> {
        self.lock().await.ensure_token().await
    }

    pub async fn invalidate(&self) {
        self.lock().await.invalidate();
    }

    pub async fn has_valid_token(&self) -> bool {
        let now = self.clock.now();
        self.session
            .lock()
            .await
            .as_ref()
            .map_or(false, |s| s.is_valid(now, self.ttl))
    }

    async fn issue(&self) -> ScrapeResult<String> {
        let response = self
            .client
            .post(self.activate_url.clone())
            .send()
            .await
            .map_err(|e| ScrapeError::Credential(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ScrapeError::Credential(e.to_string()))?;
        if status != StatusCode::OK {
            return Err(ScrapeError::Credential(format!(
                "response status {status}: {text}"
            )));
        }
        let activated = serde_json::from_str::<ActivateResponse>(&text)
            .map_err(|e| ScrapeError::Credential(format!("guest_token not found: {e}")))?;
        Ok(activated.guest_token)
    }
}

impl SessionGuard<'_> {
    /// Return the current token, fetching a new one if there is none or it
    /// has outlived its TTL.
    pub async fn ensure_token(&mut self) -> ScrapeResult<String> {
        let now = self.manager.clock.now();
        match self.session.as_ref() {
            Some(session) if session.is_valid(now, self.manager.ttl) => {
                return Ok(session.token.clone())
            }
            Some(_) => log::debug!("Guest token expired, requesting a new one"),
            None => log::debug!("No guest token, requesting one"),
        }
        let token = self.manager.issue().await?;
        log::info!("Acquired new guest token");
        *self.session = Some(GuestSession {
            token: token.clone(),
            issued_at: self.manager.clock.now(),
        });
        Ok(token)
    }

    pub fn invalidate(&mut self) {
        if self.session.take().is_some() {
            log::debug!("Guest token invalidated");
        }
    }
}
