//! Key files for the devnet accounts.
//!
//! Each file holds one private key as 64 hex characters without a `0x`
//! prefix. Files are created with owner-only permissions on unix.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::blockchain::wallet::Wallet;
use crate::config::schema::KeysConfig;

/// Accounts with a key file under the keys folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Account {
    Faucet,
    A,
    B,
}

impl KeysConfig {
    /// Path of the key file for `account`.
    pub fn path_of(&self, account: Account) -> PathBuf {
        let file_name = match account {
            Account::Faucet => &self.faucet,
            Account::A => &self.account_a,
            Account::B => &self.account_b,
        };
        self.folder.join(file_name)
    }
}

fn keystore_error(path: &Path, message: impl ToString) -> BlockchainError {
    BlockchainError::Keystore {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}

/// Load the key at `path`; `Ok(None)` when the file does not exist.
pub fn load_credential(path: &Path) -> BlockchainResult<Option<Wallet>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(keystore_error(path, e)),
    };
    Wallet::from_private_key(&content).map(Some)
}

/// Load the key at `path`, failing if it is missing.
pub fn require_credential(path: &Path) -> BlockchainResult<Wallet> {
    load_credential(path)?.ok_or_else(|| keystore_error(path, "key file not found"))
}

pub fn generate_credential() -> Wallet {
    Wallet::random()
}

/// Write the key to `path`, replacing any existing file.
pub fn store_credential(wallet: &Wallet, path: &Path) -> BlockchainResult<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| keystore_error(path, e))?;
    file.write_all(wallet.private_key_hex().as_bytes())
        .map_err(|e| keystore_error(path, e))
}

/// Create the keys folder and generate keys for accounts A and B if they
/// are missing. The faucet key is never generated; it must be funded at
/// genesis. Returns the paths that were created.
pub fn ensure_keys_exist(config: &KeysConfig) -> BlockchainResult<Vec<PathBuf>> {
    fs::create_dir_all(&config.folder).map_err(|e| keystore_error(&config.folder, e))?;

    let mut created = Vec::new();
    for account in [Account::A, Account::B] {
        let path = config.path_of(account);
        if path.exists() {
            continue;
        }
        let wallet = generate_credential();
        store_credential(&wallet, &path)?;
        tracing::info!(account = ?account, address = %wallet.address(), "Created key");
        created.push(path);
    }

    tracing::info!(folder = %config.folder.display(), "All good with keys");
    Ok(created)
}
