//! Login session
//!
//! Phone-number login against a mock verifier: any 11-digit phone is
//! accepted together with the fixed code `123456`. The signed-in user is
//! kept in `session.json` under the data directory so later runs stay
//! logged in.
//!
//! The session decides who authors new submissions.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::models::Author;

/// The only verification code the mock verifier accepts
pub const MOCK_VERIFY_CODE: &str = "123456";

/// Author phone recorded for submissions made while logged out
pub const ANONYMOUS_PHONE: &str = "anonymous";

const PHONE_DIGITS: usize = 11;
const CODE_DIGITS: usize = 6;

/// A signed-in user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub phone: String,
    pub nickname: String,
    #[serde(default)]
    pub avatar: String,
    pub token: String,
}

impl User {
    fn for_phone(phone: &str) -> Self {
        let last_four = &phone[phone.len().saturating_sub(4)..];
        Self {
            phone: phone.to_string(),
            nickname: format!("User_{}", last_four),
            avatar: String::new(),
            token: format!("token_{}", phone),
        }
    }
}

/// Persisted login state
#[derive(Debug, Clone, Default)]
pub struct Session {
    path: PathBuf,
    user: Option<User>,
}

impl Session {
    /// Load the session stored for `config`, logged out if none exists
    pub fn load(config: &Config) -> Result<Self> {
        Self::load_from_path(config.session_path())
    }

    /// Load a session from a specific file
    pub fn load_from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let user = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read session file: {:?}", path))?;
            Some(
                serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse session file: {:?}", path))?,
            )
        } else {
            None
        };

        Ok(Self { path, user })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Verify `code` for `phone` and persist the signed-in user
    pub fn login(&mut self, phone: &str, code: &str) -> Result<&User> {
        let phone = phone.trim();
        if phone.len() != PHONE_DIGITS || !phone.chars().all(|c| c.is_ascii_digit()) {
            anyhow::bail!("Phone number must be {} digits", PHONE_DIGITS);
        }
        let code = code.trim();
        if code.len() != CODE_DIGITS || !code.chars().all(|c| c.is_ascii_digit()) {
            anyhow::bail!("Verification code must be {} digits", CODE_DIGITS);
        }
        if code != MOCK_VERIFY_CODE {
            anyhow::bail!("Invalid verification code");
        }

        let user = User::for_phone(phone);
        self.save_user(&user)?;
        debug!(phone, "Logged in");
        Ok(self.user.insert(user))
    }

    /// Forget the signed-in user; no-op when logged out
    pub fn logout(&mut self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove session file: {:?}", self.path))?;
        }
        self.user = None;
        Ok(())
    }

    /// Author stamped on new submissions
    pub fn author(&self) -> Author {
        match &self.user {
            Some(user) => Author::with_nickname(&user.phone, &user.nickname),
            None => Author::new(ANONYMOUS_PHONE),
        }
    }

    fn save_user(&self, user: &User) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {:?}", parent))?;
        }
        let content = serde_json::to_string_pretty(user).context("Failed to serialize session")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write session file: {:?}", self.path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn load_session(temp_dir: &TempDir) -> Session {
        Session::load(&Config::with_data_dir(temp_dir.path())).unwrap()
    }

    #[test]
    fn test_logged_out_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let session = load_session(&temp_dir);

        assert!(!session.is_logged_in());
        assert_eq!(session.author(), Author::new(ANONYMOUS_PHONE));
    }

    #[test]
    fn test_login_with_mock_code() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = load_session(&temp_dir);

        let user = session.login("13812345678", MOCK_VERIFY_CODE).unwrap();

        assert_eq!(user.nickname, "User_5678");
        assert_eq!(user.token, "token_13812345678");
        assert_eq!(
            session.author(),
            Author::with_nickname("13812345678", "User_5678")
        );
    }

    #[test]
    fn test_login_rejects_bad_input() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = load_session(&temp_dir);

        assert!(session.login("1381234", MOCK_VERIFY_CODE).is_err());
        assert!(session.login("1381234567x", MOCK_VERIFY_CODE).is_err());
        assert!(session.login("13812345678", "12345").is_err());
        assert!(session.login("13812345678", "654321").is_err());
        assert!(!session.is_logged_in());
        assert!(!session.path().exists());
    }

    #[test]
    fn test_session_persists() {
        let temp_dir = TempDir::new().unwrap();
        load_session(&temp_dir)
            .login("13812345678", MOCK_VERIFY_CODE)
            .unwrap();

        let reloaded = load_session(&temp_dir);
        assert_eq!(reloaded.user().unwrap().phone, "13812345678");
    }

    #[test]
    fn test_logout() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = load_session(&temp_dir);
        session.login("13812345678", MOCK_VERIFY_CODE).unwrap();

        session.logout().unwrap();
        assert!(!session.is_logged_in());
        assert!(!load_session(&temp_dir).is_logged_in());

        // Logging out twice is fine
        session.logout().unwrap();
    }

    #[test]
    fn test_corrupt_session_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::with_data_dir(temp_dir.path());
        std::fs::write(config.session_path(), "not json").unwrap();

        assert!(Session::load(&config).is_err());
    }
}
