use std::io::Write;
use std::path::PathBuf;

use crate::config::StoreKind;
use crate::error::{Result, WatchError};

pub const SERVICE: &str = "pr-watcher";
pub const ACCOUNT: &str = "github-pat";

/// Persistence for the single GitHub token.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialStore: Send + Sync {
    /// `WatchError::CredentialNotFound` when nothing has been stored yet.
    fn read(&self) -> Result<String>;
    fn write(&self, secret: &str) -> Result<()>;
    fn delete(&self) -> Result<()>;
}

pub fn open_store(kind: StoreKind) -> Result<Box<dyn CredentialStore>> {
    match kind {
        StoreKind::Keyring => Ok(Box::new(KeyringStore::new(SERVICE, ACCOUNT)?)),
        StoreKind::File => Ok(Box::new(FileStore::default_location()?)),
    }
}

/// Platform secret storage (Keychain, Credential Manager, Secret Service).
pub struct KeyringStore {
    entry: keyring::Entry,
}

impl KeyringStore {
    pub fn new(service: &str, account: &str) -> Result<Self> {
        let entry = keyring::Entry::new(service, account).map_err(map_keyring_error)?;
        Ok(Self { entry })
    }
}

fn map_keyring_error(err: keyring::Error) -> WatchError {
    match err {
        keyring::Error::NoEntry => WatchError::CredentialNotFound,
        other => WatchError::CredentialStore(other.to_string()),
    }
}

impl CredentialStore for KeyringStore {
    fn read(&self) -> Result<String> {
        self.entry.get_password().map_err(map_keyring_error)
    }

    fn write(&self, secret: &str) -> Result<()> {
        self.entry.set_password(secret).map_err(map_keyring_error)
    }

    fn delete(&self) -> Result<()> {
        self.entry.delete_credential().map_err(map_keyring_error)
    }
}

/// Plain file under the user config dir, for machines without a secret service.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// ~/.config/pr-watcher/token
    pub fn default_location() -> Result<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            WatchError::CredentialStore("cannot determine the user config directory".into())
        })?;
        Ok(Self::new(config_dir.join(SERVICE).join("token")))
    }
}

impl CredentialStore for FileStore {
    fn read(&self) -> Result<String> {
        let token = match std::fs::read_to_string(&self.path) {
            Ok(token) => token,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(WatchError::CredentialNotFound)
            }
            Err(e) => return Err(WatchError::CredentialStore(e.to_string())),
        };
        // Only a hand-edited line ending is dropped; the secret itself is returned as written.
        let token = token.trim_end_matches(['\r', '\n']);
        if token.trim().is_empty() {
            Err(WatchError::CredentialNotFound)
        } else {
            Ok(token.to_string())
        }
    }

    fn write(&self, secret: &str) -> Result<()> {
        let io = |e: std::io::Error| WatchError::CredentialStore(e.to_string());
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io)?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(io)?;

        // `mode` only applies on creation; tighten a file left by an older run.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(io)?;
        }
        file.write_all(secret.as_bytes()).map_err(io)?;
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(WatchError::CredentialNotFound)
            }
            Err(e) => Err(WatchError::CredentialStore(e.to_string())),
        }
    }
}
