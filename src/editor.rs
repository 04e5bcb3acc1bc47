//! Editing session: one store, the editable form and the current selection.

use crate::article::{text_to_body, Article};
use crate::clock::{timestamp, Clock, SystemClock};
use crate::error::{EditorError, EditorResult};
use crate::store::ArticleStore;
use log::{debug, warn};
use std::path::PathBuf;

pub const DEFAULT_IMAGE: &str = "images/default.jpg";

/// Editable fields of one article.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleForm {
    pub title: String,
    pub slug: String,
    pub main_image: String,
    pub body: String,
}

impl ArticleForm {
    pub fn blank() -> ArticleForm {
        ArticleForm {
            main_image: DEFAULT_IMAGE.to_string(),
            ..Default::default()
        }
    }

    pub fn from_article(article: &Article) -> ArticleForm {
        ArticleForm {
            title: article.title.clone(),
            slug: article.slug.clone(),
            main_image: article.main_image.clone(),
            body: article.body_text(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed(usize),
    Cancelled,
}

#[derive(Debug)]
pub struct Editor<C: Clock = SystemClock> {
    store: ArticleStore,
    form: ArticleForm,
    selected: Option<String>,
    clock: C,
}

impl Editor<SystemClock> {
    /// Opens the file at `path`, starting empty when it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> EditorResult<Editor> {
        let mut editor = Editor::with_clock(ArticleStore::new(path), SystemClock);
        editor.reload()?;
        Ok(editor)
    }
}

impl<C: Clock> Editor<C> {
    pub fn with_clock(store: ArticleStore, clock: C) -> Editor<C> {
        Editor {
            store,
            form: ArticleForm::blank(),
            selected: None,
            clock,
        }
    }

    /// Loads the backing file. A missing file is not an error here.
    pub fn reload(&mut self) -> EditorResult<usize> {
        match self.store.load() {
            Ok(count) => {
                self.refresh_selection();
                Ok(count)
            }
            Err(EditorError::NotFound { path }) => {
                warn!("File '{}' not found. Starting empty.", path.display());
                self.create();
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    pub fn store(&self) -> &ArticleStore {
        &self.store
    }

    pub fn list(&self) -> &[Article] {
        self.store.list()
    }

    pub fn form(&self) -> &ArticleForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ArticleForm {
        &mut self.form
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Binds the form to the article at `index`. Out of range is a no-op.
    pub fn select(&mut self, index: usize) -> Option<&Article> {
        let article = self.store.get(index)?;
        self.form = ArticleForm::from_article(article);
        self.selected = Some(article.slug.clone());
        Some(article)
    }

    /// Like `select`, but an index past the end is a validation error.
    pub fn select_at(&mut self, index: usize) -> EditorResult<&Article> {
        let len = self.store.len();
        self.select(index).ok_or_else(|| {
            EditorError::validation(format!(
                "No article at index {index} ({len} articles)."
            ))
        })
    }

    pub fn create(&mut self) {
        self.form = ArticleForm::blank();
        self.selected = None;
    }

    /// Saves the form, replacing the selected article or appending a new one.
    ///
    /// Changing the slug of a selected article renames it, unless another
    /// article already owns that slug. With nothing selected the article is
    /// always appended, even when its slug is already in use.
    pub fn save(&mut self) -> EditorResult<SaveOutcome> {
        let title = self.form.title.trim();
        let slug = self.form.slug.trim();
        if title.is_empty() || slug.is_empty() {
            return Err(EditorError::validation("Title and Slug are required."));
        }

        let target = self
            .selected
            .as_deref()
            .and_then(|selected| self.store.position(selected));
        if let Some(index) = target {
            let taken = self
                .store
                .list()
                .iter()
                .enumerate()
                .any(|(i, a)| i != index && a.slug == slug);
            if taken {
                return Err(EditorError::validation(format!(
                    "Cannot rename to '{slug}': another article already uses it."
                )));
            }
        }

        let article = Article {
            slug: slug.to_string(),
            title: title.to_string(),
            published_at: timestamp(self.clock.now()),
            main_image: self.form.main_image.trim().to_string(),
            body: text_to_body(self.form.body.trim()),
            ..Default::default()
        };
        let slug = article.slug.clone();

        let outcome = match target {
            Some(index) => {
                debug!("Replacing article at {index} with '{slug}'");
                self.store.replace(index, article);
                SaveOutcome::Updated
            }
            None => {
                debug!("Appending article '{slug}'");
                self.store.push(article);
                SaveOutcome::Created
            }
        };

        self.selected = Some(slug);
        self.store.persist()?;
        self.refresh_selection();
        Ok(outcome)
    }

    /// Removes the selected article once `confirm` agrees.
    pub fn delete(&mut self, confirm: impl FnOnce(&ArticleForm) -> bool) -> EditorResult<DeleteOutcome> {
        let slug = self.selected.clone().ok_or(EditorError::NoSelection)?;
        if !confirm(&self.form) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let removed = self.store.remove_slug(&slug);
        self.selected = None;
        self.store.persist()?;
        if self.select(0).is_none() {
            self.create();
        }
        Ok(DeleteOutcome::Removed(removed))
    }

    /// Writes the collection as it stands, sorted newest first.
    pub fn persist(&mut self) -> EditorResult<()> {
        self.store.persist()?;
        self.refresh_selection();
        Ok(())
    }

    /// Re-binds the form after the store was reordered or reloaded.
    fn refresh_selection(&mut self) {
        let index = self
            .selected
            .as_deref()
            .and_then(|slug| self.store.position(slug));
        match index {
            Some(index) => {
                self.select(index);
            }
            None => {
                if self.select(0).is_none() {
                    self.create();
                }
            }
        }
    }
}
