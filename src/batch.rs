use crate::error::ScrapeError;
use crate::model::Conversation;
use crate::twitter::ConversationSource;
use futures::future::try_join_all;
use std::num::ParseIntError;
use thiserror::Error;

pub const MAX_BATCH_SIZE: usize = 50;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("you must provide tweet_ids param")]
    MissingIds,
    #[error("invalid tweet id {value:?}: {source}")]
    InvalidId {
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("no more than 50 tweets can be processed at a time (got {0})")]
    TooMany(usize),
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
}

impl BatchError {
    pub fn is_client_error(&self) -> bool {
        match self {
            BatchError::Scrape(e) => e.is_client_error(),
            _ => true,
        }
    }
}

/// Parse a comma separated list of tweet ids.
pub fn parse_tweet_ids(raw: &str) -> Result<Vec<u64>, BatchError> {
    if raw.is_empty() {
        return Err(BatchError::MissingIds);
    }
    let ids = raw
        .split(',')
        .map(|s| {
            s.parse().map_err(|source| BatchError::InvalidId {
                value: s.to_string(),
                source,
            })
        })
        .collect::<Result<Vec<u64>, _>>()?;
    if ids.len() > MAX_BATCH_SIZE {
        return Err(BatchError::TooMany(ids.len()));
    }
    Ok(ids)
}

/// Fetch the conversation for every id and merge them. Any failure fails the
/// whole batch.
pub async fn fetch_conversations(
    source: &dyn ConversationSource,
    ids: &[u64],
) -> Result<Conversation, BatchError> {
    if ids.is_empty() {
        return Err(BatchError::MissingIds);
    }
    if ids.len() > MAX_BATCH_SIZE {
        return Err(BatchError::TooMany(ids.len()));
    }
    let results = try_join_all(ids.iter().map(|&id| source.get_conversation(id))).await?;
    let mut merged = Conversation::default();
    for conversation in results {
        merged.merge(conversation);
    }
    log::info!(
        "Fetched {} conversations: {} tweets, {} users",
        ids.len(),
        merged.tweets.len(),
        merged.users.len()
    );
    Ok(merged)
}
