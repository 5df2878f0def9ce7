use std::env;

use tracing::debug;

/// Variables that would override the shared credentials file for the SDK clients.
pub const CREDENTIAL_VARIABLES: [&str; 3] = [
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
];

/// Clears stale credential overrides. Safe to call more than once.
pub fn reset_credential_variables() {
    for name in CREDENTIAL_VARIABLES {
        if env::var_os(name).is_some() {
            debug!("unset {}", name);
            env::remove_var(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_removes_every_credential_variable() {
        for name in CREDENTIAL_VARIABLES {
            env::set_var(name, "stale");
        }

        reset_credential_variables();
        reset_credential_variables();

        for name in CREDENTIAL_VARIABLES {
            assert!(env::var_os(name).is_none(), "{} is still set", name);
        }
    }
}
