//! Core types for OpenIngest

use crate::error::IngestError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which source an ingestion call reads from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceDescriptor {
    /// Remote repository identified by owner and name
    Repository {
        owner: String,
        name: String,
        /// Access token, overrides the ingester-wide token
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    /// Arbitrary web page
    Web { url: String },
    /// Local file
    File { path: PathBuf },
    /// Query against a relational database
    Database { connection: String, query: String },
}

impl SourceDescriptor {
    /// Create a repository descriptor
    pub fn repository(owner: impl Into<String>, name: impl Into<String>) -> Self {
        SourceDescriptor::Repository {
            owner: owner.into(),
            name: name.into(),
            token: None,
        }
    }

    /// Parse a repository descriptor from a repository URL
    ///
    /// Takes the last two `/`-separated segments as owner and name, so
    /// `https://github.com/rust-lang/rust` and `rust-lang/rust` both work.
    pub fn repository_from_url(url: &str, token: Option<String>) -> Result<Self, IngestError> {
        let (owner, name) = parse_repository_url(url)
            .ok_or_else(|| IngestError::InvalidRepositoryUrl(url.to_string()))?;
        Ok(SourceDescriptor::Repository { owner, name, token })
    }

    /// Create a web page descriptor
    pub fn web(url: impl Into<String>) -> Self {
        SourceDescriptor::Web { url: url.into() }
    }

    /// Create a local file descriptor
    pub fn file(path: impl Into<PathBuf>) -> Self {
        SourceDescriptor::File { path: path.into() }
    }

    /// Create a database query descriptor
    pub fn database(connection: impl Into<String>, query: impl Into<String>) -> Self {
        SourceDescriptor::Database {
            connection: connection.into(),
            query: query.into(),
        }
    }

    /// Short name of the variant, used for logging
    pub fn kind(&self) -> &'static str {
        match self {
            SourceDescriptor::Repository { .. } => "repository",
            SourceDescriptor::Web { .. } => "web",
            SourceDescriptor::File { .. } => "file",
            SourceDescriptor::Database { .. } => "database",
        }
    }

    /// Set the access token on a repository descriptor; no-op for other kinds
    pub fn with_token(mut self, new_token: Option<String>) -> Self {
        if let SourceDescriptor::Repository { ref mut token, .. } = self {
            *token = new_token;
        }
        self
    }
}

/// Extract `(owner, name)` from the last two path segments
pub(crate) fn parse_repository_url(url: &str) -> Option<(String, String)> {
    let mut segments = url.trim_end_matches('/').rsplit('/');
    let name = segments.next()?;
    let owner = segments.next()?;

    let name = name.strip_suffix(".git").unwrap_or(name);
    if owner.is_empty() || name.is_empty() || owner.ends_with(':') {
        return None;
    }

    Some((owner.to_string(), name.to_string()))
}

/// One labeled piece of a [`Document`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Provenance label such as `File: src/main.rs`; may be empty
    pub label: String,
    pub body: String,
}

impl Block {
    pub fn new(label: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            body: body.into(),
        }
    }

    /// Block without a label line
    pub fn text(body: impl Into<String>) -> Self {
        Self::new("", body)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "{}", self.body)
        } else {
            write!(f, "{}\n{}", self.label, self.body)
        }
    }
}

/// Canonical text document: ordered blocks rendered as flat text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
    /// Items left out after a per-item failure (not rendered)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Render blocks joined by newlines
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl From<Block> for Document {
    fn from(block: Block) -> Self {
        Self {
            blocks: vec![block],
            skipped: Vec::new(),
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", block)?;
        }
        Ok(())
    }
}
