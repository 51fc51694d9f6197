// Remote catalog client: a small blocking HTTP client for the Google Books
// volume search. One GET per search, the full body is read and parsed into
// title/author candidates.

use anyhow::Context;
use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;

/// A book suggested by the remote search, before it gets a catalog id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub author: String,
}

impl Candidate {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Candidate {
            title: title.into(),
            author: author.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("search service answered {0}")]
    Status(reqwest::StatusCode),
    #[error("unexpected response body: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Anything that can turn a free-text query into candidates.
pub trait BookSource {
    fn search(&self, query: &str) -> Result<Vec<Candidate>, ApiError>;
}

impl<T: BookSource + ?Sized> BookSource for &T {
    fn search(&self, query: &str) -> Result<Vec<Candidate>, ApiError> {
        (**self).search(query)
    }
}

/// Blocking client for a Google Books compatible `volumes` endpoint.
#[derive(Clone)]
pub struct GoogleBooksClient {
    client: Client,
    endpoint: String,
}

impl GoogleBooksClient {
    /// Build a client for `endpoint`, e.g.
    /// `https://www.googleapis.com/books/v1/volumes`.
    pub fn new(endpoint: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(client, endpoint))
    }

    /// Use an already configured `reqwest` client.
    pub fn with_client(client: Client, endpoint: &str) -> Self {
        GoogleBooksClient {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl BookSource for GoogleBooksClient {
    fn search(&self, query: &str) -> Result<Vec<Candidate>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(endpoint = %self.endpoint, query, "searching remote catalog");

        // `query` takes care of escaping the user's text.
        let res = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()?;
        if !res.status().is_success() {
            return Err(ApiError::Status(res.status()));
        }
        let body = res.text()?;
        parse_volumes(&body)
    }
}

// Wire shapes. Only the fields we read are declared; everything else in
// the response is ignored by serde.

#[derive(Deserialize, Debug)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Deserialize, Debug)]
struct Volume {
    #[serde(rename = "volumeInfo")]
    volume_info: Option<VolumeInfo>,
}

#[derive(Deserialize, Debug)]
struct VolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
}

/// Parse a volume search response body.
///
/// A body without `items` means zero matches. Items lacking a title or an
/// author are skipped; only the first listed author is kept.
pub fn parse_volumes(body: &str) -> Result<Vec<Candidate>, ApiError> {
    let response: VolumesResponse = serde_json::from_str(body)?;

    let mut candidates = Vec::with_capacity(response.items.len());
    for (idx, volume) in response.items.into_iter().enumerate() {
        let Some(info) = volume.volume_info else {
            tracing::warn!("search item {} has no volumeInfo, skipping", idx);
            continue;
        };
        let title = match info.title {
            Some(t) if !t.trim().is_empty() => t,
            _ => {
                tracing::warn!("search item {} has no title, skipping", idx);
                continue;
            }
        };
        let Some(author) = info.authors.into_iter().next() else {
            tracing::warn!("search item {} ({:?}) has no authors, skipping", idx, title);
            continue;
        };
        candidates.push(Candidate { title, author });
    }
    Ok(candidates)
}
