use crate::article::Article;
use crate::error::{EditorError, EditorResult};
use log::{debug, info};
use std::fs::{self, Permissions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Ordered article collection mirrored to a JSON file.
#[derive(Debug)]
pub struct ArticleStore {
    path: PathBuf,
    articles: Vec<Article>,
}

impl ArticleStore {
    pub fn new(path: impl Into<PathBuf>) -> ArticleStore {
        ArticleStore {
            path: path.into(),
            articles: vec![],
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Article> {
        self.articles.get(index)
    }

    pub fn position(&self, slug: &str) -> Option<usize> {
        self.articles.iter().position(|a| a.slug == slug)
    }

    pub(crate) fn replace(&mut self, index: usize, article: Article) {
        self.articles[index] = article;
    }

    pub(crate) fn push(&mut self, article: Article) {
        self.articles.push(article);
    }

    /// Removes every article with `slug`, returning how many went away.
    pub(crate) fn remove_slug(&mut self, slug: &str) -> usize {
        let before = self.articles.len();
        self.articles.retain(|a| a.slug != slug);
        before - self.articles.len()
    }

    /// Replaces the collection with the file's contents.
    ///
    /// A missing file yields `NotFound` with the collection left empty;
    /// a malformed one yields `Parse` and leaves the collection as it was.
    pub fn load(&mut self) -> EditorResult<usize> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.articles.clear();
                return Err(EditorError::NotFound {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(EditorError::io(&self.path, e)),
        };
        let articles: Vec<Article> =
            serde_json::from_str(&json).map_err(|source| EditorError::Parse {
                path: self.path.clone(),
                source,
            })?;
        info!(
            "Loaded {} articles from {}",
            articles.len(),
            self.path.display()
        );
        self.articles = articles;
        Ok(self.articles.len())
    }

    /// Sorts newest first and writes the collection through a temp file.
    pub fn persist(&mut self) -> EditorResult<()> {
        self.articles.sort_by(Article::newest_first);
        let json = self.to_json()?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut file = NamedTempFile::new_in(&dir).map_err(|e| EditorError::io(&dir, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| EditorError::io(file.path(), e))?;
        // The temp file starts owner-only; the served file must stay readable.
        if let Some(permissions) = self.target_permissions()? {
            file.as_file()
                .set_permissions(permissions)
                .map_err(|e| EditorError::io(file.path(), e))?;
        }
        file.persist(&self.path)
            .map_err(|e| EditorError::io(&self.path, e.error))?;

        debug!(
            "Wrote {} bytes to {}",
            json.len(),
            self.path.display()
        );
        info!("Saved {} articles to {}", self.articles.len(), self.path.display());
        Ok(())
    }

    pub fn to_json(&self) -> EditorResult<String> {
        articles_to_json(&self.articles)
    }

    /// Permissions of the existing file, or the default for a new one.
    fn target_permissions(&self) -> EditorResult<Option<Permissions>> {
        match fs::metadata(&self.path) {
            Ok(metadata) => Ok(Some(metadata.permissions())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(new_file_permissions()),
            Err(e) => Err(EditorError::io(&self.path, e)),
        }
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}

/// Serialized form shared by the local file and uploads.
pub fn articles_to_json(articles: &[Article]) -> EditorResult<String> {
    Ok(serde_json::to_string_pretty(articles)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::text_to_body;

    fn article(slug: &str, published_at: &str) -> Article {
        Article {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            published_at: published_at.to_string(),
            main_image: "images/default.jpg".to_string(),
            body: text_to_body("one\n\ntwo"),
            ..Default::default()
        }
    }

    #[test]
    fn missing_file_is_not_found_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ArticleStore::new(dir.path().join("articles.json"));
        store.push(article("stale", "2020"));

        let err = store.load().unwrap_err();
        assert!(matches!(err, EditorError::NotFound { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn persist_then_load_round_trips_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        let mut store = ArticleStore::new(&path);
        store.push(article("old", "2023-01-01T00:00:00.000000Z"));
        store.push(article("new", "2024-01-01T00:00:00.000000Z"));
        store.push(article("mid", "2023-06-01T00:00:00.000000Z"));
        store.persist().unwrap();

        let mut reloaded = ArticleStore::new(&path);
        assert_eq!(reloaded.load().unwrap(), 3);
        let slugs: Vec<&str> = reloaded.list().iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "mid", "old"]);
        assert_eq!(reloaded.list(), store.list());
    }

    #[test]
    fn persist_uses_two_space_indent_and_keeps_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        let mut store = ArticleStore::new(&path);
        let mut a = article("arabic", "2024");
        a.title = "مقالة".to_string();
        store.push(a);
        store.persist().unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("[\n  {\n    \"slug\": \"arabic\""));
        assert!(written.contains("مقالة"));
    }

    #[test]
    fn malformed_file_keeps_loaded_articles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        let mut store = ArticleStore::new(&path);
        store.push(article("keep", "2024"));
        store.persist().unwrap();
        assert_eq!(store.load().unwrap(), 1);

        std::fs::write(&path, "[{ not json").unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, EditorError::Parse { .. }));
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].slug, "keep");
    }

    #[test]
    fn persist_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ArticleStore::new(dir.path().join("nope").join("articles.json"));
        store.push(article("a", "2024"));
        assert!(matches!(store.persist(), Err(EditorError::Io { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn persist_keeps_existing_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        std::fs::write(&path, "[]").unwrap();
        std::fs::set_permissions(&path, Permissions::from_mode(0o664)).unwrap();

        let mut store = ArticleStore::new(&path);
        store.load().unwrap();
        store.push(article("a", "2024"));
        store.persist().unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o664);
    }

    #[cfg(unix)]
    #[test]
    fn persist_creates_world_readable_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        let mut store = ArticleStore::new(&path);
        store.push(article("a", "2024"));
        store.persist().unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn to_json_matches_shared_serializer() {
        let mut store = ArticleStore::new("unused.json");
        store.push(article("a", "2024"));
        assert_eq!(store.to_json().unwrap(), articles_to_json(store.list()).unwrap());
    }

    #[test]
    fn remove_slug_counts_every_match() {
        let mut store = ArticleStore::new("unused.json");
        store.push(article("dup", "1"));
        store.push(article("other", "2"));
        store.push(article("dup", "3"));
        assert_eq!(store.remove_slug("dup"), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.position("other"), Some(0));
    }
}
