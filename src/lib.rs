//! Local editor for article records with a one-shot push to GitHub.

pub mod article;
pub mod clock;
pub mod config;
pub mod editor;
pub mod error;
pub mod github;
pub mod store;
pub mod sync;

pub use article::{Article, Block, Span};
pub use config::SyncConfig;
pub use editor::{ArticleForm, DeleteOutcome, Editor, SaveOutcome};
pub use error::{EditorError, EditorResult, SyncError};
pub use github::GitHubContents;
pub use store::ArticleStore;
pub use sync::{ContentsApi, SyncClient, SyncReport};
