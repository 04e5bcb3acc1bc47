//! One-shot push of the whole collection to a remote file.

use crate::article::Article;
use crate::config::SyncConfig;
use crate::error::{EditorResult, SyncError};
use crate::store::articles_to_json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, info};
use serde::Serialize;

/// Body of a contents write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutContents {
    pub message: String,
    /// Base64 of the serialized file.
    pub content: String,
    /// Revision being replaced; absent when creating the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// The two calls a sync needs from the remote side.
pub trait ContentsApi {
    /// Current revision marker, or `None` when the file does not exist.
    fn fetch_revision(&self, config: &SyncConfig) -> Result<Option<String>, SyncError>;

    /// Writes the file, returning the new revision marker when reported.
    fn put_contents(
        &self,
        config: &SyncConfig,
        request: &PutContents,
    ) -> Result<Option<String>, SyncError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub pushed: usize,
    pub created: bool,
    pub revision: Option<String>,
}

pub struct SyncClient<A: ContentsApi> {
    api: A,
}

impl<A: ContentsApi> SyncClient<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Replaces the remote file with `articles`.
    ///
    /// The revision marker read first is sent back with the write so a
    /// concurrent remote edit surfaces as `SyncError::Conflict`.
    pub fn sync_all(&self, config: &SyncConfig, articles: &[Article]) -> EditorResult<SyncReport> {
        config.validate()?;

        let url = config.contents_url();
        debug!("Fetching revision of {url}");
        let sha = self.api.fetch_revision(config)?;
        match &sha {
            Some(sha) => debug!("Remote revision is {sha}"),
            None => debug!("Remote file does not exist, creating it"),
        }

        let json = articles_to_json(articles)?;
        let request = PutContents {
            message: config.commit_message.clone(),
            content: STANDARD.encode(json.as_bytes()),
            sha: sha.clone(),
        };
        let revision = self.api.put_contents(config, &request)?;

        info!(
            "Uploaded {} articles to {}:{}",
            articles.len(),
            config.repo,
            config.remote_path
        );
        Ok(SyncReport {
            pushed: articles.len(),
            created: sha.is_none(),
            revision,
        })
    }
}
