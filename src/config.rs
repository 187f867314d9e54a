use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::guard::HostClass;
use crate::policy::{
    FilePathPolicy, GuardPolicies, IdentifierPolicy, OutboundPolicy, RedirectPolicy, TokenPolicy,
    DEFAULT_TOKEN_PATTERN,
};
use crate::PolicyError;

/// `[files]` section: where files are served from and which types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Root directory. Relative paths are taken from the config file's
    /// directory when loaded with [`GuardConfig::load`].
    pub root: PathBuf,
    /// Allowed extensions, with or without the leading dot.
    #[serde(default = "default_extensions")]
    pub allowed_extensions: Vec<String>,
}

/// `[redirect]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectConfig {
    /// Schemes a redirect may use.
    #[serde(default = "default_schemes")]
    pub allowed_schemes: Vec<String>,
    /// Exact hostnames a redirect may point at.
    pub allowed_hosts: Vec<String>,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            allowed_schemes: default_schemes(),
            allowed_hosts: vec!["example.com".into(), "letmegooglethat.com".into()],
        }
    }
}

/// `[outbound]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundConfig {
    /// Schemes outbound fetches may use.
    pub allowed_schemes: Vec<String>,
    /// Host classes to refuse: `loopback`, `link_local`, `private`, `unspecified`.
    pub blocked_classes: Vec<String>,
    /// Per-request timeout in seconds. Must be non-zero.
    pub timeout_secs: u64,
}

impl Default for OutboundConfig {
    fn default() -> Self {
        Self {
            allowed_schemes: default_schemes(),
            blocked_classes: HostClass::ALL.iter().map(|c| c.as_str().into()).collect(),
            timeout_secs: 3,
        }
    }
}

/// `[search]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Columns a search may filter on.
    pub allowed_columns: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            allowed_columns: ["id", "name", "type", "price"].map(String::from).to_vec(),
        }
    }
}

/// `[token]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Pattern a token must match in full.
    pub pattern: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_TOKEN_PATTERN.into(),
        }
    }
}

fn default_schemes() -> Vec<String> {
    vec!["http".into(), "https".into()]
}

fn default_extensions() -> Vec<String> {
    vec![".jpg".into(), ".jpeg".into(), ".png".into()]
}

/// Guard configuration loaded from a TOML file.
///
/// Only `[files]` is required; every other section falls back to defaults.
///
/// ```toml
/// [files]
/// root = "uploads"
///
/// [outbound]
/// allowed_schemes = ["https"]
/// blocked_classes = ["loopback", "link_local", "private", "unspecified"]
/// timeout_secs = 3
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// File reads.
    pub files: FilesConfig,
    /// Redirect destinations.
    #[serde(default)]
    pub redirect: RedirectConfig,
    /// Outbound fetches.
    #[serde(default)]
    pub outbound: OutboundConfig,
    /// Search columns.
    #[serde(default)]
    pub search: SearchConfig,
    /// Freeform tokens.
    #[serde(default)]
    pub token: TokenConfig,
}

impl GuardConfig {
    /// Default configuration serving files from `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            files: FilesConfig {
                root: root.into(),
                allowed_extensions: default_extensions(),
            },
            redirect: RedirectConfig::default(),
            outbound: OutboundConfig::default(),
            search: SearchConfig::default(),
            token: TokenConfig::default(),
        }
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// [`PolicyError::Parse`] if the text is not valid for this schema.
    pub fn from_toml_str(text: &str) -> Result<Self, PolicyError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a config file.
    ///
    /// A relative `files.root` is resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// [`PolicyError::Read`] if the file cannot be read, [`PolicyError::Parse`]
    /// if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| PolicyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cfg = Self::from_toml_str(&data)?;

        if cfg.files.root.is_relative() {
            if let Some(dir) = path.parent() {
                cfg.files.root = dir.join(&cfg.files.root);
            }
        }
        tracing::info!(
            config = %path.display(),
            root = %cfg.files.root.display(),
            "loaded guard config"
        );
        Ok(cfg)
    }

    /// Validates the configuration and builds every policy.
    ///
    /// # Errors
    ///
    /// Any [`PolicyError`] a policy constructor reports.
    pub fn into_policies(self) -> Result<GuardPolicies, PolicyError> {
        let blocked = self
            .outbound
            .blocked_classes
            .iter()
            .map(|name| name.parse::<HostClass>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GuardPolicies {
            files: FilePathPolicy::new(&self.files.root, &self.files.allowed_extensions)?,
            redirect: RedirectPolicy::new(&self.redirect.allowed_hosts)?
                .with_schemes(&self.redirect.allowed_schemes)?,
            outbound: OutboundPolicy::default()
                .with_schemes(&self.outbound.allowed_schemes)?
                .with_blocked_classes(blocked)
                .with_timeout(Duration::from_secs(self.outbound.timeout_secs))?,
            identifiers: IdentifierPolicy::new(self.search.allowed_columns)?,
            tokens: TokenPolicy::new(&self.token.pattern)?,
        })
    }
}
