//! Runtime configuration and constants.
//!
//! Command-line flags are resolved once at startup into an immutable
//! [`ServerConfig`] value that is passed into the router and never mutated.
//! All TLS-mode conflicts, the ACME port restriction, and the UI locale are
//! validated here so that a bad invocation fails before any socket is bound.

use std::path::PathBuf;

use const_format::formatcp;
use serde::Serialize;

/// Server name advertised in the `Server` response header.
pub const SERVER_NAME: &str = "dirserve";

/// Crate version advertised in the `Server` response header and the
/// listing footer.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Pre-formatted `Server` header value (compile-time string concatenation).
pub const SERVER_HEADER: &str = formatcp!("{}/{}", SERVER_NAME, SERVER_VERSION);

/// Index file names tried, in order, before a directory listing is rendered.
pub const INDEX_FILES: &[&str] = &["index.html", "index.htm"];

/// Name of the per-user certificate cache directory under `$HOME`.
pub const CERT_CACHE_DIR: &str = ".autocert";

/// Default HTTP bind port.
pub const DEFAULT_HTTP_PORT: u16 = 8000;

/// Default HTTPS port for ACME and manual certificate modes.
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// Default HTTPS port under self-signed TLS, where binding 443 is rarely
/// possible or desirable on a developer machine.
pub const DEFAULT_HTTPS_PORT_SELF_SIGNED: u16 = 4433;

/// Default log filter when neither `--log-level` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "dirserve=info,tower_http=info";

/// TLS operating mode, mutually exclusive and fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Plain HTTP only.
    None,
    /// Self-signed certificate generated (or reused) under the cache dir.
    SelfSigned,
    /// Operator-supplied self-contained PEM file (certificate + key).
    Manual { pem_path: PathBuf },
    /// ACME-issued certificate for exactly one domain.
    Acme { domain: String },
}

impl TlsMode {
    /// Whether an HTTPS listener will be started.
    pub fn is_active(&self) -> bool {
        !matches!(self, TlsMode::None)
    }
}

/// Supported UI languages for the directory listing.
///
/// Unknown codes are rejected at startup; requests never see a locale error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    English,
    German,
    French,
    Spanish,
}

impl Locale {
    /// Parse an ISO 639-1 language code. `None` for unsupported codes.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Locale::English),
            "de" => Some(Locale::German),
            "fr" => Some(Locale::French),
            "es" => Some(Locale::Spanish),
            _ => None,
        }
    }

    /// The ISO 639-1 code, used for the listing page's `lang` attribute.
    pub fn code(self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::German => "de",
            Locale::French => "fr",
            Locale::Spanish => "es",
        }
    }

    /// Localized strings for the listing template.
    pub fn text(self) -> LocaleText {
        match self {
            Locale::English => LocaleText {
                heading: "Directory listing for",
                name: "Name",
                last_modified: "Last Modified",
                size: "Size",
            },
            Locale::German => LocaleText {
                heading: "Verzeichnisinhalt von",
                name: "Name",
                last_modified: "Zuletzt geändert",
                size: "Größe",
            },
            Locale::French => LocaleText {
                heading: "Contenu du répertoire",
                name: "Nom",
                last_modified: "Dernière modification",
                size: "Taille",
            },
            Locale::Spanish => LocaleText {
                heading: "Listado del directorio",
                name: "Nombre",
                last_modified: "Última modificación",
                size: "Tamaño",
            },
        }
    }
}

/// Localized text block handed to the listing template.
#[derive(Debug, Clone, Serialize)]
pub struct LocaleText {
    pub heading: &'static str,
    pub name: &'static str,
    pub last_modified: &'static str,
    pub size: &'static str,
}

/// Immutable server configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Absolute path of the served root directory.
    pub root: PathBuf,
    /// Plain HTTP bind port.
    pub http_port: u16,
    /// HTTPS bind port; only used when `tls` is active.
    pub https_port: u16,
    /// TLS operating mode.
    pub tls: TlsMode,
    /// UI language for directory listings.
    pub locale: Locale,
}

impl ServerConfig {
    /// Resolve raw flag values into a validated configuration.
    ///
    /// The TLS selectors (`--cert`, `--self-signed`, `--acme-domain`) are
    /// mutually exclusive; specifying more than one is a fatal error here,
    /// not a runtime surprise later.
    pub fn resolve(
        root: PathBuf,
        http_port: u16,
        self_signed: bool,
        acme_domain: Option<String>,
        cert_path: Option<PathBuf>,
        https_port: Option<u16>,
        lang: &str,
    ) -> Result<Self, ConfigError> {
        let root = root
            .canonicalize()
            .map_err(|source| ConfigError::Root { path: root, source })?;

        let selected = [cert_path.is_some(), self_signed, acme_domain.is_some()]
            .iter()
            .filter(|&&s| s)
            .count();
        if selected > 1 {
            return Err(ConfigError::ConflictingTls);
        }

        let tls = if let Some(pem_path) = cert_path {
            TlsMode::Manual { pem_path }
        } else if self_signed {
            TlsMode::SelfSigned
        } else if let Some(domain) = acme_domain {
            TlsMode::Acme { domain }
        } else {
            TlsMode::None
        };

        let https_port = https_port.unwrap_or(match tls {
            TlsMode::SelfSigned => DEFAULT_HTTPS_PORT_SELF_SIGNED,
            _ => DEFAULT_HTTPS_PORT,
        });

        // ACME validation traffic arrives on 443; any other port cannot
        // complete an order.
        if matches!(tls, TlsMode::Acme { .. }) && https_port != DEFAULT_HTTPS_PORT {
            return Err(ConfigError::AcmePort(https_port));
        }

        let locale =
            Locale::from_code(lang).ok_or_else(|| ConfigError::UnknownLocale(lang.to_string()))?;

        Ok(Self {
            root,
            http_port,
            https_port,
            tls,
            locale,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot serve directory '{path}': {source}")]
    Root {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("--cert, --self-signed and --acme-domain are mutually exclusive")]
    ConflictingTls,

    #[error("ACME requires HTTPS port 443, got {0}")]
    AcmePort(u16),

    #[error("Unsupported language code '{0}' (supported: en, de, fr, es)")]
    UnknownLocale(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_with(
        self_signed: bool,
        acme_domain: Option<&str>,
        cert_path: Option<&str>,
        https_port: Option<u16>,
        lang: &str,
    ) -> Result<ServerConfig, ConfigError> {
        ServerConfig::resolve(
            PathBuf::from("."),
            DEFAULT_HTTP_PORT,
            self_signed,
            acme_domain.map(String::from),
            cert_path.map(PathBuf::from),
            https_port,
            lang,
        )
    }

    #[test]
    fn plain_http_by_default() {
        let config = resolve_with(false, None, None, None, "en").unwrap();
        assert_eq!(config.tls, TlsMode::None);
        assert_eq!(config.https_port, DEFAULT_HTTPS_PORT);
        assert!(config.root.is_absolute());
    }

    #[test]
    fn self_signed_defaults_to_alternate_port() {
        let config = resolve_with(true, None, None, None, "en").unwrap();
        assert_eq!(config.tls, TlsMode::SelfSigned);
        assert_eq!(config.https_port, DEFAULT_HTTPS_PORT_SELF_SIGNED);
    }

    #[test]
    fn conflicting_tls_flags_rejected() {
        let err = resolve_with(true, None, Some("cert.pem"), None, "en").unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingTls));

        let err = resolve_with(true, Some("example.org"), None, None, "en").unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingTls));
    }

    #[test]
    fn acme_requires_default_https_port() {
        let err = resolve_with(false, Some("example.org"), None, Some(8443), "en").unwrap_err();
        assert!(matches!(err, ConfigError::AcmePort(8443)));

        let config = resolve_with(false, Some("example.org"), None, None, "en").unwrap();
        assert_eq!(
            config.tls,
            TlsMode::Acme {
                domain: "example.org".to_string()
            }
        );
    }

    #[test]
    fn unknown_locale_rejected() {
        let err = resolve_with(false, None, None, None, "tlh").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLocale(_)));
    }

    #[test]
    fn all_supported_locales_parse() {
        for code in ["en", "de", "fr", "es"] {
            assert!(Locale::from_code(code).is_some(), "locale {code} missing");
        }
        assert_eq!(Locale::English, Locale::default());
    }
}
