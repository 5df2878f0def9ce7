pub mod app;
pub mod aws;
pub mod credentials;
pub mod environment;
pub mod error;
pub mod handler;
pub mod identity;
pub mod issue;
pub mod mfa;
pub mod profile;
pub mod run;

pub mod defaults {
    /// Section of the credentials file that receives the temporary credentials.
    pub const CREDENTIAL_SLOT: &str = "default";
    pub const REGION: &str = "us-east-1";
    pub const ROLE_DURATION_SECONDS: i32 = 3600;
}
