use async_trait::async_trait;

use crate::credentials::ProfileCredentials;

pub mod credentials_file;

/// Final destination of issued credentials. Takes ownership so nothing lingers after the write.
#[async_trait]
pub trait HandleCredentials {
    async fn handle_credentials(self, credentials: ProfileCredentials) -> anyhow::Result<()>;
}
