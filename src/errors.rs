//! Error handling for the git-ferry crate.
use std::{error::Error as StdError, fmt};

/// Error type for the git-ferry crate.
#[derive(Debug)]
pub struct GitFerryError {
    /// Inner error.
    inner: Box<Inner>,
}

impl GitFerryError {
    /// Create a new error.
    pub(crate) fn new(kind: GitFerryErrorKind) -> Self {
        Self {
            inner: Box::new(Inner {
                kind,
                message: None,
                source: None,
            }),
        }
    }

    /// Attach a free-text detail to the error.
    pub(crate) fn with_text(mut self, text: &str) -> Self {
        self.inner.message = Some(text.to_string());
        self
    }

    /// Create a new error of the given kind wrapping a source error.
    pub(crate) fn new_with_source<E>(kind: GitFerryErrorKind, message: &str, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            inner: Box::new(Inner {
                kind,
                message: Some(message.to_string()),
                source: Some(Box::new(source)),
            }),
        }
    }
}

/// Type alias for a boxed error.
pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Inner error type for the git-ferry crate.
#[derive(Debug)]
struct Inner {
    /// Error kind.
    kind: GitFerryErrorKind,

    /// Optional free-text detail.
    message: Option<String>,

    /// Source error.
    source: Option<BoxError>,
}

/// Error kinds of the git-ferry crate.
#[derive(Debug)]
pub(crate) enum GitFerryErrorKind {
    /// Error in configuration loading or resolution.
    Config,

    /// Error related to the reqwest crate.
    Reqwest,

    /// Error related to serde.
    Serde,

    /// Error spawning or waiting on a subprocess.
    Command,

    /// Local path precondition violated in bare storage.
    Storage,
}

impl fmt::Display for GitFerryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.inner.message, &self.inner.source) {
            (Some(msg), Some(source)) => write!(f, "{:?}: {msg}: {source}", self.inner.kind),
            (Some(msg), None) => write!(f, "{:?}: {msg}", self.inner.kind),
            (None, Some(source)) => write!(f, "{:?}: {source}", self.inner.kind),
            (None, None) => write!(f, "{:?}", self.inner.kind),
        }
    }
}

impl StdError for GitFerryError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| &**e as _)
    }
}

impl From<reqwest::Error> for GitFerryError {
    fn from(e: reqwest::Error) -> Self {
        Self {
            inner: Box::new(Inner {
                kind: GitFerryErrorKind::Reqwest,
                message: None,
                source: Some(Box::new(e)),
            }),
        }
    }
}

impl From<serde_json::Error> for GitFerryError {
    fn from(e: serde_json::Error) -> Self {
        Self {
            inner: Box::new(Inner {
                kind: GitFerryErrorKind::Serde,
                message: None,
                source: Some(Box::new(e)),
            }),
        }
    }
}

impl From<toml::de::Error> for GitFerryError {
    fn from(e: toml::de::Error) -> Self {
        Self {
            inner: Box::new(Inner {
                kind: GitFerryErrorKind::Config,
                message: None,
                source: Some(Box::new(e)),
            }),
        }
    }
}

impl From<std::io::Error> for GitFerryError {
    fn from(e: std::io::Error) -> Self {
        Self {
            inner: Box::new(Inner {
                kind: GitFerryErrorKind::Command,
                message: None,
                source: Some(Box::new(e)),
            }),
        }
    }
}

impl From<&str> for GitFerryError {
    fn from(e: &str) -> Self {
        GitFerryError::new(GitFerryErrorKind::Storage).with_text(e)
    }
}

impl From<String> for GitFerryError {
    fn from(e: String) -> Self {
        GitFerryError::new(GitFerryErrorKind::Storage).with_text(&e)
    }
}
