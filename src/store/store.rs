//! JSON-file backed quote store.
#![allow(dead_code)]
//!
//! Layout under the data root:
//! - quotes/quotes.json : the whole store as one document
//! - quotes/images/     : saved image files, referenced by relative path
//!
//! The document is rewritten in full on every mutation; mutations run as a
//! read-modify-write under a sidecar file lock.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;

use super::lock::with_lock;
use super::quote::Quote;

/// Store directory name under the data root.
pub const STORE_DIR: &str = "quotes";

/// Image directory name under the store directory.
pub const IMAGES_DIR: &str = "images";

/// Store file format.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct StoreDocument {
    pub quotes: Vec<Quote>,
}

/// The quote store, rooted at the data directory.
#[derive(Clone, Debug)]
pub struct QuoteStore {
    root: PathBuf,
}

impl QuoteStore {
    /// Create a store handle rooted at the given data directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store handle and ensure its directories exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let store = Self::new(root);
        fs::create_dir_all(store.images_dir())?;
        Ok(store)
    }

    /// The data root the store was opened with.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the store file.
    pub fn dir(&self) -> PathBuf {
        self.root.join(STORE_DIR)
    }

    /// Path of the persisted document.
    pub fn file(&self) -> PathBuf {
        self.dir().join("quotes.json")
    }

    /// Directory holding saved images.
    pub fn images_dir(&self) -> PathBuf {
        self.dir().join(IMAGES_DIR)
    }

    /// Relative path (from the data root) for an image filename.
    pub fn images_rel(filename: &str) -> String {
        format!("{}/{}/{}", STORE_DIR, IMAGES_DIR, filename)
    }

    /// Absolute path for an image filename.
    pub fn images_abs(&self, filename: &str) -> PathBuf {
        self.images_dir().join(filename)
    }

    /// Resolve a stored (usually relative) path against the data root.
    pub fn resolve(&self, stored: &str) -> PathBuf {
        let p = Path::new(stored);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }

    /// Read the document; a missing or corrupt file yields an empty store.
    pub fn read_document(&self) -> StoreDocument {
        let path = self.file();
        if !path.exists() {
            return StoreDocument::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::error!("Corrupt store file {}: {}", path.display(), e);
                StoreDocument::default()
            }),
            Err(e) => {
                tracing::error!("Failed to read store file {}: {}", path.display(), e);
                StoreDocument::default()
            }
        }
    }

    fn write_document(&self, doc: &StoreDocument) -> Result<(), Error> {
        fs::create_dir_all(self.dir())?;
        let content = serde_json::to_string_pretty(doc)?;
        fs::write(self.file(), content)?;
        Ok(())
    }

    /// Append a quote and persist the whole store.
    pub fn add(&self, quote: Quote) -> Result<Quote, Error> {
        if !quote.has_content() {
            return Err(Error::NoContent);
        }

        fs::create_dir_all(self.dir())?;
        let path = self.file();

        with_lock(&path, || {
            let mut doc = self.read_document();
            doc.quotes.push(quote.clone());
            self.write_document(&doc)?;
            tracing::debug!("Added quote {} by {}", quote.id, quote.author_name);
            Ok(quote)
        })
    }

    /// Pick one quote uniformly at random.
    pub fn random(&self) -> Result<Quote, Error> {
        let doc = self.read_document();
        doc.quotes
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(Error::EmptyStore)
    }

    /// Pick one quote of the given author uniformly at random.
    pub fn random_by_author(&self, author_id: &str) -> Result<Quote, Error> {
        let doc = self.read_document();
        let candidates: Vec<&Quote> = doc
            .quotes
            .iter()
            .filter(|q| q.author_id == author_id)
            .collect();
        candidates
            .choose(&mut rand::thread_rng())
            .map(|q| (*q).clone())
            .ok_or(Error::EmptyStore)
    }

    /// Delete a quote by id. Returns whether a record was removed.
    pub fn delete_by_id(&self, id: &str) -> Result<bool, Error> {
        let path = self.file();
        if !path.exists() {
            return Ok(false);
        }

        with_lock(&path, || {
            let mut doc = self.read_document();
            let before = doc.quotes.len();
            doc.quotes.retain(|q| q.id != id);
            if doc.quotes.len() == before {
                return Ok(false);
            }
            self.write_document(&doc)?;
            tracing::info!("Deleted quote {}", id);
            Ok(true)
        })
    }

    /// All quotes of an author, oldest first.
    pub fn list_by_author(&self, author_id: &str) -> Result<Vec<Quote>, Error> {
        let doc = self.read_document();
        let mut quotes: Vec<Quote> = doc
            .quotes
            .into_iter()
            .filter(|q| q.author_id == author_id)
            .collect();
        quotes.sort_by_key(|q| q.created_at);
        Ok(quotes)
    }

    /// All quotes in insertion order.
    pub fn all(&self) -> Result<Vec<Quote>, Error> {
        Ok(self.read_document().quotes)
    }

    /// Number of stored quotes.
    pub fn count(&self) -> Result<usize, Error> {
        Ok(self.read_document().quotes.len())
    }

    /// Get store statistics.
    pub fn stats(&self) -> Result<StoreStats, Error> {
        let doc = self.read_document();
        let with_images = doc.quotes.iter().filter(|q| q.has_images()).count();

        let mut image_files = 0;
        if self.images_dir().exists() {
            for entry in fs::read_dir(self.images_dir())? {
                if entry?.path().is_file() {
                    image_files += 1;
                }
            }
        }

        Ok(StoreStats {
            quotes: doc.quotes.len(),
            with_images,
            image_files,
        })
    }
}

/// Store statistics.
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub quotes: usize,
    pub with_images: usize,
    pub image_files: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Quote Store:\n")?;
        write!(f, "  Quotes:      {}\n", self.quotes)?;
        write!(f, "  With images: {}\n", self.with_images)?;
        write!(f, "  Image files: {}", self.image_files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn text_quote(author_id: &str, text: &str) -> Quote {
        Quote::new(author_id, "Alice", Some(text.to_string()), vec![], "99")
    }

    #[test]
    fn add_and_reload_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = QuoteStore::open(temp.path()).unwrap();

        store.add(text_quote("1", "first")).unwrap();
        store.add(text_quote("2", "second")).unwrap();
        store.add(text_quote("1", "third")).unwrap();

        // A fresh handle over the same root sees the same ordered sequence.
        let reloaded = QuoteStore::new(temp.path());
        let quotes = reloaded.all().unwrap();
        assert_eq!(quotes.len(), 3);
        assert_eq!(quotes[0].text.as_deref(), Some("first"));
        assert_eq!(quotes[1].text.as_deref(), Some("second"));
        assert_eq!(quotes[2].text.as_deref(), Some("third"));
    }

    #[test]
    fn text_only_add_has_no_images() {
        let temp = TempDir::new().unwrap();
        let store = QuoteStore::open(temp.path()).unwrap();

        let added = store.add(text_quote("1", "words only")).unwrap();
        assert!(added.images.is_empty());

        let quotes = store.all().unwrap();
        assert!(quotes[0].images.is_empty());
    }

    #[test]
    fn add_rejects_empty_record() {
        let temp = TempDir::new().unwrap();
        let store = QuoteStore::open(temp.path()).unwrap();

        let empty = Quote::new("1", "Alice", None, vec![], "99");
        assert!(matches!(store.add(empty), Err(Error::NoContent)));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn random_on_empty_store_errors() {
        let temp = TempDir::new().unwrap();
        let store = QuoteStore::open(temp.path()).unwrap();

        assert!(matches!(store.random(), Err(Error::EmptyStore)));
    }

    #[test]
    fn random_returns_a_stored_record() {
        let temp = TempDir::new().unwrap();
        let store = QuoteStore::open(temp.path()).unwrap();

        store.add(text_quote("1", "a")).unwrap();
        store.add(text_quote("1", "b")).unwrap();

        let ids: Vec<String> = store.all().unwrap().into_iter().map(|q| q.id).collect();
        for _ in 0..10 {
            let picked = store.random().unwrap();
            assert!(ids.contains(&picked.id));
        }
    }

    #[test]
    fn random_by_author_filters() {
        let temp = TempDir::new().unwrap();
        let store = QuoteStore::open(temp.path()).unwrap();

        store.add(text_quote("1", "from one")).unwrap();
        store.add(text_quote("2", "from two")).unwrap();

        let picked = store.random_by_author("2").unwrap();
        assert_eq!(picked.author_id, "2");

        assert!(matches!(
            store.random_by_author("3"),
            Err(Error::EmptyStore)
        ));
    }

    #[test]
    fn delete_by_id_removes_only_match() {
        let temp = TempDir::new().unwrap();
        let store = QuoteStore::open(temp.path()).unwrap();

        let kept = store.add(text_quote("1", "keep")).unwrap();
        let gone = store.add(text_quote("1", "drop")).unwrap();

        assert!(store.delete_by_id(&gone.id).unwrap());
        assert!(!store.delete_by_id(&gone.id).unwrap());

        let quotes = store.all().unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].id, kept.id);
    }

    #[test]
    fn list_by_author_sorts_oldest_first() {
        let temp = TempDir::new().unwrap();
        let store = QuoteStore::open(temp.path()).unwrap();

        let mut older = text_quote("1", "older");
        older.created_at -= 10_000;
        store.add(text_quote("1", "newer")).unwrap();
        store.add(older).unwrap();

        let quotes = store.list_by_author("1").unwrap();
        assert_eq!(quotes[0].text.as_deref(), Some("older"));
        assert_eq!(quotes[1].text.as_deref(), Some("newer"));
    }

    #[test]
    fn corrupt_store_file_reads_as_empty() {
        let temp = TempDir::new().unwrap();
        let store = QuoteStore::open(temp.path()).unwrap();

        std::fs::write(store.file(), "not json at all").unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert!(matches!(store.random(), Err(Error::EmptyStore)));
    }

    #[test]
    fn concurrent_adds_lose_nothing() {
        let temp = TempDir::new().unwrap();
        let store = QuoteStore::open(temp.path()).unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                store.add(text_quote("1", &format!("quote {}", i))).unwrap();
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.count().unwrap(), 8);
    }
}
