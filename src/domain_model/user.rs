use super::SubjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: SubjectId,
    pub name: String,
    pub email: String,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        format!("{}({})", self.name, self.email)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub login: String,
    pub password: String,
}
