pub mod params;
pub mod session;
pub mod timeline;

use crate::error::ScrapeResult;
use crate::model::Conversation;
use async_trait::async_trait;

#[async_trait]
pub trait ConversationSource: Send + Sync {
    async fn get_conversation(&self, id: u64) -> ScrapeResult<Conversation>;
}
