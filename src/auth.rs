use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not signed in. Run `daybook login <user>` first.")]
    NotSignedIn,
    #[error("User id must not be empty")]
    EmptyUser,
    #[error("Failed to read session file: {0}")]
    ReadError(String),
    #[error("Failed to write session file: {0}")]
    WriteError(String),
    #[error("Failed to parse session file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Signed-in identity every store call is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub started_at: DateTime<Utc>,
}

/// Supplies the current session, if any
pub trait AuthProvider {
    fn session(&self) -> Result<Option<Session>, AuthError>;
}

/// Hard precondition for every view: no session, no data
pub fn require_session(auth: &dyn AuthProvider) -> Result<Session, AuthError> {
    auth.session()?.ok_or(AuthError::NotSignedIn)
}

/// Session persisted as TOML beside the database
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Session file living in the same directory as the database
    pub fn beside(db_path: &Path) -> Self {
        let dir = db_path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::new(dir.join("session.toml"))
    }

    pub fn login(&self, user_id: &str) -> Result<Session, AuthError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AuthError::EmptyUser);
        }
        let session = Session { user_id: user_id.to_string(), started_at: Utc::now() };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| AuthError::WriteError(e.to_string()))?;
            }
        }
        let contents = toml::to_string_pretty(&session)
            .map_err(|e| AuthError::WriteError(format!("Failed to serialize session: {}", e)))?;
        fs::write(&self.path, contents).map_err(|e| AuthError::WriteError(e.to_string()))?;

        info!(user = %session.user_id, "signed in");
        Ok(session)
    }

    /// Returns true if a session was ended
    pub fn logout(&self) -> Result<bool, AuthError> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path).map_err(|e| AuthError::WriteError(e.to_string()))?;
        info!("signed out");
        Ok(true)
    }
}

impl AuthProvider for SessionFile {
    fn session(&self) -> Result<Option<Session>, AuthError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no session file");
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| AuthError::ReadError(e.to_string()))?;
        let session: Session = toml::from_str(&contents)?;
        if session.user_id.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(session))
    }
}
