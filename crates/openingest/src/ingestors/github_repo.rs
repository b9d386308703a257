//! GitHub repository ingestor
//!
//! Walks a repository through the contents API and returns its metadata
//! followed by the text of every file in the tree.

use crate::client::IngestOptions;
use crate::error::IngestError;
use crate::ingestors::Ingestor;
use crate::types::{parse_repository_url, Block, Document, SourceDescriptor};
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

/// GitHub repository ingestor
///
/// Matches repository descriptors and web URLs on a repository host.
pub struct GitHubRepoIngestor;

impl GitHubRepoIngestor {
    /// Create a new GitHub repo ingestor
    pub fn new() -> Self {
        Self
    }

    /// Resolve owner, name and effective token for a source
    fn repository_ref(
        source: &SourceDescriptor,
        options: &IngestOptions,
    ) -> Result<(String, String, Option<String>), IngestError> {
        match source {
            SourceDescriptor::Repository { owner, name, token } => Ok((
                owner.clone(),
                name.clone(),
                token.clone().or_else(|| options.github_token.clone()),
            )),
            SourceDescriptor::Web { url } => {
                let (owner, name) = parse_repository_url(url)
                    .ok_or_else(|| IngestError::InvalidRepositoryUrl(url.clone()))?;
                Ok((owner, name, options.github_token.clone()))
            }
            other => Err(IngestError::IngestorError(format!(
                "Not a repository source: {}",
                other.kind()
            ))),
        }
    }
}

impl Default for GitHubRepoIngestor {
    fn default() -> Self {
        Self::new()
    }
}

/// GitHub API repository response (partial)
#[derive(Debug, Deserialize)]
struct GitHubRepo {
    full_name: String,
    description: Option<String>,
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
}

/// Entry of a directory listing
#[derive(Debug, Deserialize)]
struct ContentEntry {
    #[serde(rename = "type")]
    entry_type: String,
    path: String,
}

/// Single file from the contents API
#[derive(Debug, Deserialize)]
struct ContentFile {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
    download_url: Option<String>,
}

/// Per-call view of one repository on the GitHub API
struct RepoApi {
    client: reqwest::Client,
    base: Url,
    owner: String,
    name: String,
}

impl RepoApi {
    fn new(
        options: &IngestOptions,
        owner: String,
        name: String,
        token: Option<&str>,
    ) -> Result<Self, IngestError> {
        let mut headers = HeaderMap::new();
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| IngestError::AuthenticationFailed)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(IngestError::ClientBuildError)?;

        let base = Url::parse(options.github_api_base())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                IngestError::IngestorError(format!(
                    "Invalid API base URL: {}",
                    options.github_api_base()
                ))
            })?;

        Ok(Self {
            client,
            base,
            owner,
            name,
        })
    }

    /// `{base}/repos/{owner}/{name}/...` with every segment percent-encoded
    fn api_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push("repos")
                .push(&self.owner)
                .push(&self.name)
                .extend(segments);
        }
        url
    }

    fn repo_url(&self) -> Url {
        self.api_url(std::iter::empty())
    }

    fn contents_url(&self, path: &str) -> Url {
        let path = path.split('/').filter(|segment| !segment.is_empty());
        self.api_url(std::iter::once("contents").chain(path))
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, IngestError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(IngestError::from_reqwest)?;

        match response.status() {
            s if s.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(IngestError::RepositoryNotFound {
                owner: self.owner.clone(),
                name: self.name.clone(),
            }),
            StatusCode::UNAUTHORIZED => Err(IngestError::AuthenticationFailed),
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Err(IngestError::RateLimited),
            s => Err(IngestError::HttpStatus {
                url: url.to_string(),
                status: s.as_u16(),
            }),
        }
    }

    async fn metadata(&self) -> Result<GitHubRepo, IngestError> {
        self.get(self.repo_url().as_str())
            .await?
            .json()
            .await
            .map_err(|e| IngestError::IngestorError(format!("Failed to parse repo data: {}", e)))
    }

    async fn list(&self, path: &str) -> Result<Vec<ContentEntry>, IngestError> {
        self.get(self.contents_url(path).as_str())
            .await?
            .json()
            .await
            .map_err(|e| {
                IngestError::IngestorError(format!("Failed to parse listing of '{}': {}", path, e))
            })
    }

    /// Fetch a file's raw bytes
    async fn file_bytes(&self, path: &str) -> Result<Vec<u8>, IngestError> {
        let file: ContentFile = self
            .get(self.contents_url(path).as_str())
            .await?
            .json()
            .await
            .map_err(|e| IngestError::IngestorError(format!("Failed to parse file: {}", e)))?;

        match (file.encoding.as_str(), file.download_url) {
            ("base64", _) => decode_base64_content(&file.content),
            // Files over 1 MB come back without inline content
            (_, Some(download_url)) => {
                let bytes = self
                    .get(&download_url)
                    .await?
                    .bytes()
                    .await
                    .map_err(IngestError::from_reqwest)?;
                Ok(bytes.to_vec())
            }
            (encoding, None) => Err(IngestError::IngestorError(format!(
                "Unsupported content encoding '{}'",
                encoding
            ))),
        }
    }

    /// Fetch a file and decode it as UTF-8 text
    async fn file_text(&self, path: &str) -> Result<String, IngestError> {
        let bytes = self.file_bytes(path).await?;
        String::from_utf8(bytes).map_err(|_| IngestError::Extraction {
            format: "UTF-8",
            message: format!("{} is not valid UTF-8 text", path),
        })
    }
}

#[async_trait]
impl Ingestor for GitHubRepoIngestor {
    fn name(&self) -> &'static str {
        "github_repo"
    }

    fn matches(&self, source: &SourceDescriptor, options: &IngestOptions) -> bool {
        match source {
            SourceDescriptor::Repository { .. } => true,
            SourceDescriptor::Web { url } => Url::parse(url)
                .map(|url| options.is_repository_url(&url))
                .unwrap_or(false),
            _ => false,
        }
    }

    async fn ingest(
        &self,
        source: &SourceDescriptor,
        options: &IngestOptions,
    ) -> Result<Document, IngestError> {
        let (owner, name, token) = Self::repository_ref(source, options)?;
        if token.is_none() {
            debug!("No access token, using unauthenticated API access");
        }

        let api = RepoApi::new(options, owner, name, token.as_deref())?;
        let repo = api.metadata().await?;

        let mut document = Document::from(format_metadata(&repo));

        // Depth-first walk; each frame is the remaining entries of one directory
        let mut stack = vec![api.list("").await?.into_iter()];
        while let Some(frame) = stack.last_mut() {
            let Some(entry) = frame.next() else {
                stack.pop();
                continue;
            };

            match entry.entry_type.as_str() {
                "file" => {
                    if !options.includes_path(&entry.path) {
                        debug!(path = %entry.path, "Skipping excluded file");
                        continue;
                    }
                    match api.file_text(&entry.path).await {
                        Ok(text) => {
                            document.push(Block::new(format!("File: {}", entry.path), text));
                        }
                        Err(e) => {
                            warn!(path = %entry.path, error = %e, "Could not decode file");
                            document.skipped.push(entry.path);
                        }
                    }
                }
                "dir" => match api.list(&entry.path).await {
                    Ok(children) => stack.push(children.into_iter()),
                    Err(e) => {
                        warn!(path = %entry.path, error = %e, "Could not list directory");
                        document.skipped.push(entry.path);
                    }
                },
                other => {
                    debug!(path = %entry.path, entry_type = other, "Skipping entry");
                }
            }
        }

        info!(
            repository = %repo.full_name,
            files = document.len() - 1,
            skipped = document.skipped.len(),
            "Ingested repository"
        );

        Ok(document)
    }
}

/// Decode base64-encoded content (GitHub wraps it at 60 columns)
fn decode_base64_content(encoded: &str) -> Result<Vec<u8>, IngestError> {
    let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(cleaned)
        .map_err(|e| IngestError::Extraction {
            format: "base64",
            message: e.to_string(),
        })
}

/// Metadata header block
fn format_metadata(repo: &GitHubRepo) -> Block {
    let body = format!(
        "Description: {}\nMain Language: {}\nStars: {}\nContents:\n",
        repo.description.as_deref().unwrap_or("None"),
        repo.language.as_deref().unwrap_or("None"),
        repo.stargazers_count
    );
    Block::new(format!("Repository: {}", repo.full_name), body)
}
