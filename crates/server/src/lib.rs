pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod store;

use config::Config;
use store::{CommentStore, ConversationRegistry, MembershipManager, MessageStore, UserDirectory};

pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub config: Config,
    pub users: UserDirectory,
    pub conversations: ConversationRegistry,
    pub members: MembershipManager,
    pub messages: MessageStore,
    pub comments: CommentStore,
}

impl AppState {
    pub fn new(db: sqlx::SqlitePool, config: Config) -> Self {
        Self {
            users: UserDirectory::new(db.clone(), config.default_photo.clone()),
            conversations: ConversationRegistry::new(db.clone()),
            members: MembershipManager::new(db.clone()),
            messages: MessageStore::new(db.clone()),
            comments: CommentStore::new(db.clone()),
            db,
            config,
        }
    }
}
