use crate::error::{ConfigError, WalletError};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A raw private key read from the key file.
///
/// The secret is kept with a `0x` prefix and wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct WalletCredential {
    secret: String,
}

impl WalletCredential {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        let secret = if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
            format!("0x{}", &trimmed[2..])
        } else {
            format!("0x{}", trimmed)
        };
        Self { secret }
    }

    /// Prefixed hex key, ready to hand to a signer.
    pub fn expose(&self) -> &str {
        &self.secret
    }

    /// Cheap shape check before handing the key to a signer.
    pub fn validate(&self) -> Result<(), WalletError> {
        let hex = &self.secret[2..];
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(WalletError::InvalidKeyFormat);
        }
        if hex.len() != 64 {
            return Err(WalletError::InvalidKeyLength { length: hex.len() });
        }
        Ok(())
    }
}

impl fmt::Debug for WalletCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletCredential")
            .field("secret", &"***REDACTED***")
            .finish()
    }
}

pub struct WalletManager {
    credentials: Vec<WalletCredential>,
}

impl WalletManager {
    pub const DEFAULT_KEY_FILE: &'static str = "privatekeys.txt";

    /// Loads one key per line. Blank lines and `#` comments are skipped,
    /// order is preserved.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::IoError {
                path: path.display().to_string(),
                msg: e.to_string(),
            },
        })?;

        Ok(Self::from_lines(&content))
    }

    pub fn from_lines(content: &str) -> Self {
        let credentials = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(WalletCredential::new)
            .collect();

        Self { credentials }
    }

    /// Returns the number of available wallets
    pub fn count(&self) -> usize {
        self.credentials.len()
    }

    pub fn credentials(&self) -> &[WalletCredential] {
        &self.credentials
    }

    pub fn into_credentials(self) -> Vec<WalletCredential> {
        self.credentials
    }
}
