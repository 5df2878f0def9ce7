use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use ini::{EscapePolicy, Ini, ParseOption, WriteOption};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::credentials::{Credentials, ProfileCredentials};
use crate::handler::HandleCredentials;

mod keys {
    pub const ACCESS_KEY_ID: &str = "aws_access_key_id";
    pub const SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
    pub const SESSION_TOKEN: &str = "aws_session_token";
}

/// Values are taken verbatim, the same way the AWS CLI reads them.
fn parse_option() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    }
}

/// Expands a leading `~` the way the SDK profile loader does.
pub fn expand_home(path: PathBuf) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path,
    }
}

/// `AWS_SHARED_CREDENTIALS_FILE` when set, otherwise `~/.aws/credentials`.
pub fn default_credentials_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os("AWS_SHARED_CREDENTIALS_FILE") {
        return Some(expand_home(PathBuf::from(path)));
    }
    dirs::home_dir().map(|home| home.join(".aws").join("credentials"))
}

fn section_name(line: &str) -> Option<&str> {
    line.trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .map(str::trim)
}

/// Replaces every `[slot]` block of `raw` with `rendered`, leaving all other lines as they were.
fn splice_slot(raw: &str, slot: &str, rendered: &str) -> String {
    let mut before = String::new();
    let mut after = String::new();
    let mut seen_slot = false;
    let mut in_slot = false;

    for line in raw.split_inclusive('\n') {
        if let Some(name) = section_name(line) {
            in_slot = name == slot;
            seen_slot |= in_slot;
        }
        if in_slot {
            continue;
        }
        if seen_slot {
            after.push_str(line);
        } else {
            before.push_str(line);
        }
    }

    let mut spliced = before;
    if !spliced.is_empty() && !spliced.ends_with('\n') {
        spliced.push('\n');
    }
    if !seen_slot && !spliced.is_empty() && !spliced.ends_with("\n\n") {
        spliced.push('\n');
    }
    spliced.push_str(rendered);
    if !after.is_empty() {
        spliced.push('\n');
        spliced.push_str(&after);
    }
    spliced
}

/// Writes temporary credentials into one reserved section of the shared credentials file.
///
/// The file is read once by [`CredentialsFileHandler::open`] and written once by
/// [`HandleCredentials::handle_credentials`]. Lines outside the reserved section,
/// comments included, are written back untouched. There is no lock: a single process
/// is expected to own the file for the duration of a run.
pub struct CredentialsFileHandler {
    path: PathBuf,
    slot: String,
    raw: String,
}

impl CredentialsFileHandler {
    pub fn open<P: AsRef<Path>, S: Into<String>>(path: P, slot: S) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let raw = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read credentials file: {}", path.display()))?;
            Ini::load_from_str_opt(&raw, parse_option())
                .with_context(|| format!("malformed credentials file: {}", path.display()))?;
            raw
        } else {
            warn!("{} does not exist yet, it will be created", path.display());
            String::new()
        };

        Ok(CredentialsFileHandler {
            path,
            slot: slot.into(),
            raw,
        })
    }

    fn render_slot(&self, credentials: &Credentials) -> anyhow::Result<String> {
        let mut section = Ini::new();
        section
            .with_section(Some(self.slot.as_str()))
            .set(keys::ACCESS_KEY_ID, credentials.key())
            .set(keys::SECRET_ACCESS_KEY, credentials.secret())
            .set(keys::SESSION_TOKEN, credentials.token());

        let mut rendered = Vec::new();
        section.write_to_opt(
            &mut rendered,
            WriteOption {
                escape_policy: EscapePolicy::Nothing,
                ..WriteOption::default()
            },
        )?;
        Ok(String::from_utf8(rendered)?)
    }

    fn persist(&self, contents: &str) -> anyhow::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create directory: {}", dir.display()))?;

        let mut file = NamedTempFile::new_in(&dir)
            .with_context(|| format!("failed to create a temporary file in {}", dir.display()))?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o600))?;
        }

        file.persist(&self.path)
            .with_context(|| format!("failed to write credentials file: {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl HandleCredentials for CredentialsFileHandler {
    async fn handle_credentials(self, credentials: ProfileCredentials) -> anyhow::Result<()> {
        let ProfileCredentials {
            profile_name,
            credentials,
        } = credentials;

        println!("Setting temporary credentials in your file");
        let rendered = self.render_slot(&credentials)?;
        self.persist(&splice_slot(&self.raw, &self.slot, &rendered))?;

        match credentials.expires_at() {
            Some(expires_at) => info!(
                "credentials for {} saved to [{}], expires at {}",
                profile_name,
                self.slot,
                expires_at.to_rfc3339()
            ),
            None => info!("credentials for {} saved to [{}]", profile_name, self.slot),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BEFORE: &str = "\
[default]
aws_access_key_id = ASIAOLD
aws_secret_access_key = old-secret
aws_session_token = old-token
region = us-west-2
aws_session_expiration = 2020-01-01T00:00:00Z

[work]
aws_access_key_id = AKIAWORK
aws_secret_access_key = work-secret
";

    fn issued(token: &str) -> ProfileCredentials {
        ProfileCredentials {
            profile_name: "work".to_string(),
            credentials: Credentials {
                key: "ASIANEW".to_string(),
                secret: "new-secret".to_string(),
                token: token.to_string(),
                expires_at: None,
            },
        }
    }

    fn slot_keys(path: &Path, slot: &str) -> Vec<(String, String)> {
        let ini = Ini::load_from_file_opt(path, parse_option()).unwrap();
        ini.section(Some(slot))
            .unwrap()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn slot_is_replaced_with_exactly_three_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials");
        std::fs::write(&path, BEFORE).unwrap();

        let handler = CredentialsFileHandler::open(&path, "default").unwrap();
        handler.handle_credentials(issued("new-token")).await.unwrap();

        assert_eq!(
            slot_keys(&path, "default"),
            vec![
                ("aws_access_key_id".to_string(), "ASIANEW".to_string()),
                ("aws_secret_access_key".to_string(), "new-secret".to_string()),
                ("aws_session_token".to_string(), "new-token".to_string()),
            ]
        );

        let ini = Ini::load_from_file_opt(&path, parse_option()).unwrap();
        let work = ini.section(Some("work")).unwrap();
        assert_eq!(work.get("aws_access_key_id"), Some("AKIAWORK"));
        assert_eq!(work.get("aws_secret_access_key"), Some("work-secret"));
    }

    #[tokio::test]
    async fn missing_file_is_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".aws").join("credentials");

        let handler = CredentialsFileHandler::open(&path, "default").unwrap();
        handler.handle_credentials(issued("new-token")).await.unwrap();

        assert_eq!(slot_keys(&path, "default").len(), 3);
    }

    #[tokio::test]
    async fn each_run_overwrites_the_previous_token() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials");
        std::fs::write(&path, BEFORE).unwrap();

        for token in ["first-token", "second-token"] {
            let handler = CredentialsFileHandler::open(&path, "default").unwrap();
            handler.handle_credentials(issued(token)).await.unwrap();
        }

        let ini = Ini::load_from_file_opt(&path, parse_option()).unwrap();
        let slot = ini.section(Some("default")).unwrap();
        assert_eq!(slot.get("aws_session_token"), Some("second-token"));
        assert_eq!(slot.len(), 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn written_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials");

        let handler = CredentialsFileHandler::open(&path, "default").unwrap();
        handler.handle_credentials(issued("new-token")).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn unwritable_destination_is_an_error() {
        let dir = TempDir::new().unwrap();
        // A directory where the credentials file should be.
        let path = dir.path().join("credentials");
        std::fs::create_dir(&path).unwrap();

        let handler = CredentialsFileHandler {
            path: path.clone(),
            slot: "default".to_string(),
            raw: String::new(),
        };
        assert!(handler.handle_credentials(issued("new-token")).await.is_err());
    }

    #[test]
    fn malformed_file_fails_to_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials");
        std::fs::write(&path, "[default\naws_access_key_id = x\n").unwrap();

        assert!(CredentialsFileHandler::open(&path, "default").is_err());
    }

    #[tokio::test]
    async fn other_sections_and_comments_survive_verbatim() {
        let untouched = "\
# managed by hand
[work]
aws_access_key_id = AKIAWORK
aws_secret_access_key = abc#def;ghi

[quoted]
aws_access_key_id = \"AKIAQ\"
aws_secret_access_key = back\\slash
";
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials");
        std::fs::write(&path, format!("{}\n[default]\naws_access_key_id = ASIAOLD\n", untouched)).unwrap();

        let handler = CredentialsFileHandler::open(&path, "default").unwrap();
        handler.handle_credentials(issued("new-token")).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with(untouched), "{}", written);
        assert!(!written.contains("ASIAOLD"));
        assert_eq!(slot_keys(&path, "default").len(), 3);
    }

    #[test]
    fn splice_keeps_surrounding_sections_in_place() {
        let raw = "[a]\nk = 1\n\n[default]\nold = x\n; note\n\n[b]\nk = 2\n";
        let spliced = splice_slot(raw, "default", "[default]\nnew=y\n");
        assert_eq!(spliced, "[a]\nk = 1\n\n[default]\nnew=y\n\n[b]\nk = 2\n");
    }

    #[test]
    fn splice_appends_a_missing_slot() {
        let spliced = splice_slot("[work]\nk = 1", "default", "[default]\nnew=y\n");
        assert_eq!(spliced, "[work]\nk = 1\n\n[default]\nnew=y\n");

        assert_eq!(splice_slot("", "default", "[default]\n"), "[default]\n");
    }

    #[test]
    fn splice_collapses_duplicate_slots() {
        let raw = "[default]\nold = 1\n[work]\nk = 1\n[default]\nold = 2\n";
        let spliced = splice_slot(raw, "default", "[default]\nnew=y\n");
        assert_eq!(spliced, "[default]\nnew=y\n\n[work]\nk = 1\n");
    }

    #[test]
    fn leading_tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_home(PathBuf::from("~/.aws/alt")), home.join(".aws/alt"));
        assert_eq!(expand_home(PathBuf::from("/etc/aws")), PathBuf::from("/etc/aws"));
        assert_eq!(expand_home(PathBuf::from("~other/x")), PathBuf::from("~other/x"));
    }
}
