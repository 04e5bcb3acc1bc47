//! GitHub Contents API over blocking reqwest.

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::sync::{ContentsApi, PutContents};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde_json::Value;

const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";

#[derive(Debug, Clone, Default)]
pub struct GitHubContents {
    client: Client,
}

impl GitHubContents {
    pub fn new() -> Self {
        Self::default()
    }

    fn authorized(&self, builder: RequestBuilder, config: &SyncConfig) -> RequestBuilder {
        builder
            .header(AUTHORIZATION, format!("token {}", config.token))
            .header(ACCEPT, ACCEPT_GITHUB_JSON)
            .header(
                USER_AGENT,
                concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
            )
    }

    fn read(response: Response) -> Result<(StatusCode, String), SyncError> {
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| SyncError::Transport(format!("failed to read response: {e}")))?;
        Ok((status, text))
    }
}

impl ContentsApi for GitHubContents {
    fn fetch_revision(&self, config: &SyncConfig) -> Result<Option<String>, SyncError> {
        let url = config.contents_url();
        let response = self
            .authorized(self.client.get(&url), config)
            .send()
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        let (status, text) = Self::read(response)?;
        debug!("GET {url} -> {status}");

        fetch_outcome(status, &text)
    }

    fn put_contents(
        &self,
        config: &SyncConfig,
        request: &PutContents,
    ) -> Result<Option<String>, SyncError> {
        let url = config.contents_url();
        let response = self
            .authorized(self.client.put(&url), config)
            .json(request)
            .send()
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        let (status, text) = Self::read(response)?;
        debug!("PUT {url} -> {status}");

        put_outcome(status, &text, request.sha.as_deref())
    }
}

/// Maps a GET answer: 404 means the file does not exist yet.
fn fetch_outcome(status: StatusCode, body: &str) -> Result<Option<String>, SyncError> {
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(api_error(status, body));
    }
    revision_from(body, &["sha"]).map(Some)
}

/// Maps a PUT answer: 409 means `sha` no longer names the remote revision.
fn put_outcome(
    status: StatusCode,
    body: &str,
    sha: Option<&str>,
) -> Result<Option<String>, SyncError> {
    if status == StatusCode::CONFLICT {
        return Err(SyncError::Conflict {
            revision: sha.map(str::to_string),
            message: error_message(body).unwrap_or_else(|| body.to_string()),
        });
    }
    if !status.is_success() {
        return Err(api_error(status, body));
    }
    match revision_from(body, &["content", "sha"]) {
        Ok(revision) => Ok(Some(revision)),
        Err(e) => {
            debug!("Write succeeded but no new revision was reported: {e}");
            Ok(None)
        }
    }
}

/// Pulls a string at `pointer` out of a JSON response body.
fn revision_from(body: &str, pointer: &[&str]) -> Result<String, SyncError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| SyncError::Decode(format!("response is not JSON: {e}")))?;
    let mut current = &value;
    for key in pointer {
        current = &current[*key];
    }
    current
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SyncError::Decode(format!("missing '{}' in response", pointer.join("."))))
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value["message"].as_str().map(str::to_string)
}

fn api_error(status: StatusCode, body: &str) -> SyncError {
    SyncError::Api {
        status: status.as_u16(),
        message: error_message(body).unwrap_or_else(|| body.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_sha_from_get_response() {
        let body = r#"{"name":"articles.json","sha":"abc123","content":"W10=\n"}"#;
        assert_eq!(revision_from(body, &["sha"]).unwrap(), "abc123");
    }

    #[test]
    fn reads_new_sha_from_put_response() {
        let body = r#"{"content":{"sha":"def456"},"commit":{"sha":"ffff"}}"#;
        assert_eq!(revision_from(body, &["content", "sha"]).unwrap(), "def456");
    }

    #[test]
    fn missing_sha_is_a_decode_error() {
        assert!(matches!(
            revision_from(r#"{"name":"x"}"#, &["sha"]),
            Err(SyncError::Decode(_))
        ));
        assert!(matches!(
            revision_from("<html>", &["sha"]),
            Err(SyncError::Decode(_))
        ));
    }

    #[test]
    fn api_error_prefers_message_field() {
        let err = api_error(StatusCode::UNAUTHORIZED, r#"{"message":"Bad credentials"}"#);
        match err {
            SyncError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Bad credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = api_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(err.to_string().contains("upstream down"));
    }

    #[test]
    fn missing_remote_file_means_create() {
        let body = r#"{"message":"Not Found"}"#;
        assert_eq!(fetch_outcome(StatusCode::NOT_FOUND, body).unwrap(), None);
    }

    #[test]
    fn existing_remote_file_reports_its_sha() {
        let body = r#"{"sha":"abc123"}"#;
        assert_eq!(
            fetch_outcome(StatusCode::OK, body).unwrap(),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn failed_fetch_is_an_api_error() {
        let err = fetch_outcome(StatusCode::FORBIDDEN, r#"{"message":"rate limited"}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::Api { status: 403, ref message } if message == "rate limited"
        ));
    }

    #[test]
    fn successful_write_returns_new_sha() {
        let body = r#"{"content":{"sha":"def456"}}"#;
        assert_eq!(
            put_outcome(StatusCode::CREATED, body, None).unwrap(),
            Some("def456".to_string())
        );
        assert_eq!(
            put_outcome(StatusCode::OK, body, Some("abc")).unwrap(),
            Some("def456".to_string())
        );
    }

    #[test]
    fn successful_write_without_sha_still_succeeds() {
        assert_eq!(put_outcome(StatusCode::OK, "{}", Some("abc")).unwrap(), None);
    }

    #[test]
    fn stale_write_is_a_conflict() {
        let err = put_outcome(
            StatusCode::CONFLICT,
            r#"{"message":"is at 111 but expected abc"}"#,
            Some("abc"),
        )
        .unwrap_err();
        match err {
            SyncError::Conflict { revision, message } => {
                assert_eq!(revision.as_deref(), Some("abc"));
                assert_eq!(message, "is at 111 but expected abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejected_write_is_an_api_error() {
        let err = put_outcome(StatusCode::UNPROCESSABLE_ENTITY, r#"{"message":"sha wasn't supplied"}"#, None)
            .unwrap_err();
        assert!(matches!(err, SyncError::Api { status: 422, .. }));
    }

    #[test]
    fn requests_carry_token_and_github_headers() {
        let config = SyncConfig::new()
            .repo("owner/site")
            .remote_path("articles.json")
            .token("secret");
        let api = GitHubContents::new();
        let request = api
            .authorized(api.client.get(config.contents_url()), &config)
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://api.github.com/repos/owner/site/contents/articles.json"
        );
        let headers = request.headers();
        assert_eq!(headers[AUTHORIZATION], "token secret");
        assert_eq!(headers[ACCEPT], ACCEPT_GITHUB_JSON);
        assert!(headers.contains_key(USER_AGENT));
    }
}
