use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::token::Tokens;

const CREDENTIAL_FILE_VERSION: u32 = 1;

/// Service key the token pair is filed under.
pub const DEFAULT_SERVICE: &str = "auth_tokens";

/// Durable storage for the signed-in token pair.
///
/// The store is the authoritative copy of the tokens; the in-memory
/// [`AuthStore`](super::AuthStore) only mirrors it. Implementations must
/// tolerate concurrent calls without exposing a partially written pair.
pub trait CredentialStore: Send + Sync {
    fn store(&self, tokens: &Tokens) -> Result<(), AuthError>;
    fn read(&self) -> Result<Option<Tokens>, AuthError>;
    fn clear(&self) -> Result<(), AuthError>;
}

/// Configuration for file-backed credential storage.
#[derive(Debug, Clone)]
pub struct CredentialStoreConfig {
    pub base_dir: PathBuf,
    pub service: String,
}

impl CredentialStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            service: DEFAULT_SERVICE.to_string(),
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn default_dir() -> PathBuf {
        default_insurly_dir()
    }
}

/// File-backed credential store using a TOML file per service.
///
/// Writes go to a temporary sibling file that is renamed into place, so a
/// concurrent [`read`](CredentialStore::read) sees either the old or the new
/// pair. On unix the file is only readable by its owner.
///
/// # Example
/// ```no_run
/// use insurly::auth::{CredentialStore, FileCredentialStore, Tokens};
///
/// let store = FileCredentialStore::new_default();
/// store.store(&Tokens::new("access", "refresh"))?;
/// # Ok::<(), insurly::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    base_dir: PathBuf,
    service: String,
}

impl FileCredentialStore {
    pub fn new(config: CredentialStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
            service: config.service,
        }
    }

    pub fn new_default() -> Self {
        Self::new(CredentialStoreConfig::new(default_insurly_dir()))
    }

    /// Location of the credential file.
    pub fn path(&self) -> PathBuf {
        self.base_dir
            .join(format!("{}.toml", normalize_label(&self.service)))
    }
}

impl CredentialStore for FileCredentialStore {
    fn store(&self, tokens: &Tokens) -> Result<(), AuthError> {
        let file = CredentialFile {
            version: CREDENTIAL_FILE_VERSION,
            service: self.service.clone(),
            tokens: tokens.clone(),
            saved_at: Utc::now(),
        };
        let serialized = toml::to_string(&file)?;
        atomic_write(&self.path(), serialized.as_bytes())
    }

    fn read(&self) -> Result<Option<Tokens>, AuthError> {
        let path = self.path();
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let file: CredentialFile = toml::from_str(&raw)?;
        if file.version != CREDENTIAL_FILE_VERSION {
            return Err(AuthError::UnsupportedVersion(file.version));
        }
        Ok(Some(file.tokens))
    }

    fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

/// Volatile credential store; contents die with the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    tokens: Mutex<Option<Tokens>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: Tokens) -> Self {
        Self {
            tokens: Mutex::new(Some(tokens)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn store(&self, tokens: &Tokens) -> Result<(), AuthError> {
        *self.tokens.lock().unwrap_or_else(PoisonError::into_inner) = Some(tokens.clone());
        Ok(())
    }

    fn read(&self) -> Result<Option<Tokens>, AuthError> {
        Ok(self
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn clear(&self) -> Result<(), AuthError> {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialFile {
    version: u32,
    service: String,
    tokens: Tokens,
    saved_at: DateTime<Utc>,
}

fn default_insurly_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".insurly"))
        .unwrap_or_else(|| PathBuf::from(".insurly"))
}

fn normalize_label(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return DEFAULT_SERVICE.to_string();
    }
    let out: String = trimmed
        .chars()
        .map(|ch| {
            let lower = ch.to_ascii_lowercase();
            if lower.is_ascii_alphanumeric() || lower == '-' || lower == '_' {
                lower
            } else {
                '-'
            }
        })
        .collect();
    if out.trim_matches('-').is_empty() {
        DEFAULT_SERVICE.to_string()
    } else {
        out
    }
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| AuthError::Io(format!("{} has no file name", path.display())))?;
    let temp_name = format!(
        ".{}.tmp-{}-{}",
        file_name.to_string_lossy(),
        std::process::id(),
        uuid::Uuid::new_v4().simple()
    );
    let temp_path = path.with_file_name(temp_name);

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let write_result = (|| -> std::io::Result<()> {
        let mut temp_file = options.open(&temp_path)?;
        temp_file.write_all(data)?;
        temp_file.sync_all()?;
        Ok(())
    })();

    if let Err(err) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }

    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

    Ok(())
}
