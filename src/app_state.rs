use std::sync::Arc;

use crate::{
    config::ServerConfig,
    db::GiftCardStore,
    documents::DocumentProvider,
    lightning::NodeRpc,
    protocol::{ChallengeStore, Metadata},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub node: Arc<dyn NodeRpc>,
    pub challenges: Arc<ChallengeStore>,
    pub documents: Arc<dyn DocumentProvider>,
    pub gift_cards: Arc<dyn GiftCardStore>,
    /// Fixed at startup so every invoice commits to the same bytes.
    pub metadata: Arc<Metadata>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        node: Arc<dyn NodeRpc>,
        documents: Arc<dyn DocumentProvider>,
        gift_cards: Arc<dyn GiftCardStore>,
    ) -> Self {
        let metadata = Arc::new(config.metadata());
        let challenges = Arc::new(ChallengeStore::new(config.k1_ttl()));
        Self {
            config: Arc::new(config),
            node,
            challenges,
            documents,
            gift_cards,
            metadata,
        }
    }
}
