//! API key resolution
//!
//! The key is looked up through an ordered [`CredentialChain`]: an explicit
//! value, then the environment, then a `.env` secrets file. The first
//! resolver that yields a non-empty value wins.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::constants::credentials::{ENV_VARS, SECRETS_FILE_NAME};

const SHORT_KEY_LEN: usize = 8;

/// A resolved API key. `Debug` and `Display` never print the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for empty or whitespace-only input.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Fixed mask for log lines; keys longer than eight characters keep
    /// their first four.
    pub fn masked(&self) -> String {
        if self.0.chars().count() <= SHORT_KEY_LEN {
            return "****".to_string();
        }
        let prefix: String = self.0.chars().take(4).collect();
        format!("{}****", prefix)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self.masked())
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

/// Where a key came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    Explicit,
    Environment(String),
    SecretsFile(PathBuf),
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Explicit => f.write_str("explicit"),
            CredentialSource::Environment(name) => write!(f, "env:{}", name),
            CredentialSource::SecretsFile(path) => write!(f, "file:{}", path.display()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub key: ApiKey,
    pub source: CredentialSource,
}

pub trait CredentialResolver: Send + Sync {
    fn name(&self) -> &'static str;
    fn resolve(&self) -> Option<ResolvedCredential>;
}

/// Tier 1: a key handed to the constructor.
pub struct ExplicitResolver {
    value: Option<String>,
}

impl ExplicitResolver {
    pub fn new(value: Option<String>) -> Self {
        Self { value }
    }
}

impl CredentialResolver for ExplicitResolver {
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn resolve(&self) -> Option<ResolvedCredential> {
        let key = ApiKey::new(self.value.clone()?)?;
        Some(ResolvedCredential {
            key,
            source: CredentialSource::Explicit,
        })
    }
}

/// Tier 2: process environment, names checked in order.
pub struct EnvResolver {
    names: Vec<String>,
}

impl EnvResolver {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl CredentialResolver for EnvResolver {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn resolve(&self) -> Option<ResolvedCredential> {
        self.names.iter().find_map(|name| {
            let key = ApiKey::new(std::env::var(name).ok()?)?;
            Some(ResolvedCredential {
                key,
                source: CredentialSource::Environment(name.clone()),
            })
        })
    }
}

/// How the secrets file is found
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SecretsLocation {
    /// Nearest `.env` from the working directory upward, else `<crate root>/.env`
    Discover,
    Path(PathBuf),
}

impl SecretsLocation {
    pub fn from_config(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => SecretsLocation::Path(p),
            None => SecretsLocation::Discover,
        }
    }

    pub fn locate(&self) -> PathBuf {
        match self {
            SecretsLocation::Path(p) => p.clone(),
            SecretsLocation::Discover => std::env::current_dir()
                .ok()
                .and_then(|cwd| find_secrets_file(&cwd))
                .unwrap_or_else(fallback_secrets_path),
        }
    }
}

/// Walks from `start` up to the filesystem root looking for `.env`.
pub fn find_secrets_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(SECRETS_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// `.env` next to this crate's manifest.
pub fn fallback_secrets_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(SECRETS_FILE_NAME)
}

/// Tier 3: scan a dotenv-style file for the first recognized assignment.
pub struct FileResolver {
    location: SecretsLocation,
    names: Vec<String>,
}

impl FileResolver {
    pub fn new<I, S>(location: SecretsLocation, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            location,
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the first non-empty value assigned to a recognized name, in file order.
    pub fn scan(&self, path: &Path) -> Option<ApiKey> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                error!("Secrets file read failed ({}): {}", path.display(), e);
                return None;
            }
        };

        for line in contents.lines() {
            let Some((name, value)) = self.assignment(line) else {
                continue;
            };
            if let Some(key) = ApiKey::new(unquote(value)) {
                return Some(key);
            }
            warn!("⚠️ {} is present but empty in {}", name, path.display());
        }
        None
    }

    /// `NAME=value` or `export NAME=value` for a recognized name. The value is
    /// taken literally; other lines are never interpreted.
    fn assignment<'a>(&'a self, line: &'a str) -> Option<(&'a str, &'a str)> {
        let line = line.trim_start();
        let line = line.strip_prefix("export ").map(str::trim_start).unwrap_or(line);
        self.names.iter().find_map(|name| {
            let value = line.strip_prefix(name.as_str())?.strip_prefix('=')?;
            Some((name.as_str(), value))
        })
    }
}

/// Trims and removes one pair of matching `'` or `"` quotes.
fn unquote(value: &str) -> &str {
    let value = value.trim();
    ['\'', '"']
        .iter()
        .find_map(|q| value.strip_prefix(*q)?.strip_suffix(*q))
        .unwrap_or(value)
}

impl CredentialResolver for FileResolver {
    fn name(&self) -> &'static str {
        "secrets-file"
    }

    fn resolve(&self) -> Option<ResolvedCredential> {
        let path = self.location.locate();
        info!("🔍 Loading secrets from: {}", path.display());

        if !path.is_file() {
            info!("ℹ️ No secrets file at {}", path.display());
            return None;
        }

        let key = self.scan(&path)?;
        info!("✅ Found API key via secrets file parse");
        Some(ResolvedCredential {
            key,
            source: CredentialSource::SecretsFile(path),
        })
    }
}

/// Ordered resolvers; stops at the first success.
#[derive(Default)]
pub struct CredentialChain {
    resolvers: Vec<Box<dyn CredentialResolver>>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resolver: impl CredentialResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// explicit → environment (`env_vars` in order) → secrets file
    ///
    /// The secrets file is always scanned for `GROQ_API_KEY`/`GROK_API_KEY`.
    pub fn standard(explicit: Option<String>, env_vars: &[String], location: SecretsLocation) -> Self {
        Self::new()
            .with(ExplicitResolver::new(explicit))
            .with(EnvResolver::new(env_vars.iter().cloned()))
            .with(FileResolver::new(location, ENV_VARS))
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn resolve(&self) -> Option<ResolvedCredential> {
        for resolver in &self.resolvers {
            if let Some(found) = resolver.resolve() {
                info!(
                    "🔑 API key resolved via {} ({}): {}",
                    resolver.name(),
                    found.source,
                    found.key.masked()
                );
                return Some(found);
            }
            debug!("Resolver '{}' found no API key", resolver.name());
        }

        error!("❌ GROQ_API_KEY not found in arguments, environment or secrets file!");
        None
    }
}
