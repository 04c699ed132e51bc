use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    domain::errors::CloudResult,
    ports::identity::{Identity, IdentityDirectory},
};

/// In-memory identity directory for tests and offline use
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityDirectory {
    users: Arc<RwLock<Vec<Identity>>>,
}

impl StaticIdentityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_users(users: impl IntoIterator<Item = Identity>) -> Self {
        Self {
            users: Arc::new(RwLock::new(users.into_iter().collect())),
        }
    }

    /// Add a user, or rename it if the uin is already known
    pub async fn upsert(&self, uin: impl Into<String>, name: impl Into<String>) {
        let uin = uin.into();
        let name = name.into();
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.uin == uin) {
            Some(existing) => existing.name = name,
            None => users.push(Identity { uin, name }),
        }
    }
}

#[async_trait]
impl IdentityDirectory for StaticIdentityDirectory {
    async fn list_users(&self) -> CloudResult<Vec<Identity>> {
        Ok(self.users.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_and_list() {
        let directory = StaticIdentityDirectory::new();
        directory.upsert("100003", "alice").await;
        directory.upsert("100004", "bob").await;
        directory.upsert("100003", "alice.w").await;

        let users = directory.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "alice.w");
    }
}
