//! Scrapes conversations from Twitter's web timeline API using guest tokens.

pub mod batch;
pub mod config;
pub mod error;
pub mod model;
#[cfg(feature = "serve")]
pub mod serve;
pub mod twitter;

pub use config::ScraperConfig;
pub use error::{ScrapeError, ScrapeResult};
pub use model::{Conversation, Tweet, User};
pub use twitter::timeline::Scraper;
pub use twitter::ConversationSource;
