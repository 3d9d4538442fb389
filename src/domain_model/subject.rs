use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider-issued identifier of an authenticated principal (the `sub` claim).
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub String);

impl SubjectId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("subject id must not be empty")]
pub struct EmptySubjectId;

impl std::str::FromStr for SubjectId {
    type Err = EmptySubjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            Err(EmptySubjectId)
        } else {
            Ok(SubjectId(s.to_owned()))
        }
    }
}
