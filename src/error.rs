use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("expected exactly one MFA device assigned to {caller_arn}, found {matches}")]
    UnresolvedDevice { caller_arn: String, matches: usize },

    #[error("MFA token must be exactly 6 digits")]
    MalformedToken,

    #[error("profile \"{0}\" has no long-term credentials")]
    MissingCredentials(String),

    #[error("{0} didn't return a credential")]
    NoCredentialsReturned(&'static str),

    #[error("profile \"{0}\" is reserved for temporary credentials")]
    ReservedProfile(String),

    #[error("No profile found. profile_name:{0}")]
    ProfileNotFound(String),
}
