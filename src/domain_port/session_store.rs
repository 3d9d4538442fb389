use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session store encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Replace the entry for `subject`. `None` stores the empty entry.
    /// The mutation is durable once this returns.
    async fn set(&self, subject: &SubjectId, entry: Option<SessionEntry>)
    -> Result<(), StoreError>;
    async fn get(&self, subject: &SubjectId) -> Result<Option<SessionEntry>, StoreError>;
    /// Deleting an absent subject is a no-op.
    async fn delete(&self, subject: &SubjectId) -> Result<(), StoreError>;
}
