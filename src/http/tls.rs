//! Self-signed certificate generation and on-disk caching.
//!
//! Certificate material lives under a fixed per-user cache directory
//! (`~/.autocert`). Generation happens at most once: if both PEM files
//! already exist they are reused unchanged across restarts, so browsers
//! that have accepted the certificate once keep accepting it.

use std::io;
use std::path::{Path, PathBuf};

use rcgen::generate_simple_self_signed;

use crate::config::CERT_CACHE_DIR;

/// Certificate file name inside the cache directory.
pub const CERT_FILE: &str = "cert.pem";

/// Private key file name inside the cache directory.
pub const KEY_FILE: &str = "key.pem";

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("Cannot locate home directory for the certificate cache")]
    MissingHome,

    #[error("Failed to generate self-signed certificate: {0}")]
    Generate(#[from] rcgen::Error),

    #[error("Failed to write certificate material: {0}")]
    Io(#[from] io::Error),
}

/// On-disk locations of the cached certificate and key.
#[derive(Debug, Clone)]
pub struct CertPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// The per-user certificate cache directory (`~/.autocert`).
pub fn certificate_cache_dir() -> Result<PathBuf, TlsError> {
    Ok(dirs::home_dir()
        .ok_or(TlsError::MissingHome)?
        .join(CERT_CACHE_DIR))
}

/// Return cached self-signed certificate paths, generating them on first use.
///
/// The certificate is scoped to `localhost`/loopback. Generation or write
/// failure is fatal to startup; this runs before any listener binds.
pub fn ensure_self_signed(cache_dir: &Path) -> Result<CertPaths, TlsError> {
    let paths = CertPaths {
        cert: cache_dir.join(CERT_FILE),
        key: cache_dir.join(KEY_FILE),
    };

    if paths.cert.is_file() && paths.key.is_file() {
        tracing::info!(cert = %paths.cert.display(), "Reusing cached self-signed certificate");
        return Ok(paths);
    }

    std::fs::create_dir_all(cache_dir)?;

    let names = vec![
        "localhost".to_string(),
        "127.0.0.1".to_string(),
        "::1".to_string(),
    ];
    let certified = generate_simple_self_signed(names)?;

    std::fs::write(&paths.cert, certified.cert.pem())?;
    std::fs::write(&paths.key, certified.key_pair.serialize_pem())?;
    restrict_key_permissions(&paths.key)?;

    tracing::info!(cert = %paths.cert.display(), "Generated self-signed certificate");
    Ok(paths)
}

#[cfg(unix)]
fn restrict_key_permissions(key: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(key, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_key_permissions(_key: &Path) -> io::Result<()> {
    Ok(())
}
