use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

type Sessions = BTreeMap<SubjectId, SessionEntry>;

/// Session store persisted as one JSON object (`subject -> entry`).
///
/// Every mutation rewrites the whole file through a temp file and a rename,
/// while holding the lock, so readers of the file never see a partial map
/// and same-subject writers are serialized. The in-memory map only changes
/// after the rename succeeded.
pub struct FileSessionStore {
    path: PathBuf,
    sessions: Mutex<Sessions>,
}

impl FileSessionStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let sessions = Self::load(&path).await;
        info!(path = %path.display(), sessions = sessions.len(), "session store opened");
        Ok(Self {
            path,
            sessions: Mutex::new(sessions),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(path: &Path) -> Sessions {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Sessions::new(),
            Err(e) => {
                warn!(path = %path.display(), "unreadable session store, starting empty: {}", e);
                return Sessions::new();
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Sessions::new();
        }
        match serde_json::from_slice(&bytes) {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(path = %path.display(), "corrupt session store, starting empty: {}", e);
                Sessions::new()
            }
        }
    }

    /// Makes the rename itself durable.
    #[cfg(unix)]
    async fn sync_parent(path: &Path) -> std::io::Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        tokio::fs::File::open(parent).await?.sync_all().await
    }

    #[cfg(not(unix))]
    async fn sync_parent(_path: &Path) -> std::io::Result<()> {
        Ok(())
    }

    async fn persist(&self, sessions: &Sessions) -> Result<(), StoreError> {
        let payload = serde_json::to_vec(sessions)?;
        let temp_path = self
            .path
            .with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));

        let written = async {
            let mut file = tokio::fs::File::create(&temp_path).await?;
            file.write_all(&payload).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&temp_path, &self.path).await
        }
        .await;

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        // the new file is already in place, so this only costs durability
        if let Err(e) = Self::sync_parent(&self.path).await {
            warn!(path = %self.path.display(), "could not sync session store directory: {}", e);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SessionStore for FileSessionStore {
    async fn set(
        &self,
        subject: &SubjectId,
        entry: Option<SessionEntry>,
    ) -> Result<(), StoreError> {
        let entry = entry.unwrap_or_else(SessionEntry::empty);
        let mut sessions = self.sessions.lock().await;

        let previous = sessions.insert(subject.clone(), entry);
        if let Err(e) = self.persist(&sessions).await {
            match previous {
                Some(previous) => sessions.insert(subject.clone(), previous),
                None => sessions.remove(subject),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn get(&self, subject: &SubjectId) -> Result<Option<SessionEntry>, StoreError> {
        Ok(self.sessions.lock().await.get(subject).cloned())
    }

    async fn delete(&self, subject: &SubjectId) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().await;

        let Some(previous) = sessions.remove(subject) else {
            return Ok(());
        };
        if let Err(e) = self.persist(&sessions).await {
            sessions.insert(subject.clone(), previous);
            return Err(e);
        }
        Ok(())
    }
}
