use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;

/// Process-local store. Entries are lost on restart, so this is meant for
/// tests and local development only.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<SubjectId, SessionEntry>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn set(
        &self,
        subject: &SubjectId,
        entry: Option<SessionEntry>,
    ) -> Result<(), StoreError> {
        let entry = entry.unwrap_or_else(SessionEntry::empty);
        self.sessions.insert(subject.clone(), entry);
        Ok(())
    }

    async fn get(&self, subject: &SubjectId) -> Result<Option<SessionEntry>, StoreError> {
        Ok(self.sessions.get(subject).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, subject: &SubjectId) -> Result<(), StoreError> {
        self.sessions.remove(subject);
        Ok(())
    }
}
