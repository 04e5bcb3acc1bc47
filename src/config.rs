//! Settings for pushing the collection to GitHub.

use crate::error::{EditorError, EditorResult};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update articles via article editor";

/// Where and how to upload. The token only lives in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Repository as `owner/name`.
    pub repo: String,

    /// Path of the file inside the repository.
    pub remote_path: String,

    pub token: String,

    pub commit_message: String,

    /// API root, without trailing slash.
    pub api_url: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            repo: String::new(),
            remote_path: String::new(),
            token: String::new(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("repo", &self.repo)
            .field("remote_path", &self.remote_path)
            .field("token", &"<redacted>")
            .field("commit_message", &self.commit_message)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = repo.into().trim().to_string();
        self
    }

    pub fn remote_path(mut self, path: impl Into<String>) -> Self {
        self.remote_path = path.into().trim().to_string();
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into().trim().to_string();
        self
    }

    pub fn commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fails unless repo, path and token are all present.
    pub fn validate(&self) -> EditorResult<()> {
        let path = self.remote_path.trim_start_matches('/');
        if self.repo.is_empty() || path.is_empty() || self.token.is_empty() {
            return Err(EditorError::validation(
                "Repo, Path, and Token are required.",
            ));
        }
        Ok(())
    }

    pub fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.api_url,
            self.repo,
            self.remote_path.trim_start_matches('/')
        )
    }
}
