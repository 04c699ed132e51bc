use async_trait::async_trait;

use crate::domain::errors::CloudResult;

/// A sub-account known to the identity service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Account uin, the id used in policy principals
    pub uin: String,
    pub name: String,
}

/// Port for resolving policy principals to display names
#[async_trait]
pub trait IdentityDirectory: Send + Sync + 'static {
    /// List every user of the account
    async fn list_users(&self) -> CloudResult<Vec<Identity>>;
}
