//! Shared test harness for integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::io;
use std::path::PathBuf;

use library_catalog::api::{ApiError, BookSource, Candidate};
use library_catalog::catalog::{Book, Library};
use library_catalog::store::{CatalogStore, StoreError};

// =============================================================================
// MemoryStore: catalog store without file I/O
// =============================================================================

#[derive(Default)]
pub struct MemoryStore {
    pub books: RefCell<Vec<Book>>,
    pub saves: Cell<usize>,
}

impl MemoryStore {
    pub fn with(books: Vec<Book>) -> Self {
        Self {
            books: RefCell::new(books),
            saves: Cell::new(0),
        }
    }

    pub fn saved(&self) -> Vec<Book> {
        self.books.borrow().clone()
    }
}

impl CatalogStore for MemoryStore {
    fn load(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.books.borrow().clone())
    }

    fn save(&self, books: &[Book]) -> Result<(), StoreError> {
        *self.books.borrow_mut() = books.to_vec();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

/// Loads its seed books, but every save fails with an I/O error.
pub struct FailingStore {
    pub books: Vec<Book>,
    pub attempts: Cell<usize>,
}

impl FailingStore {
    pub fn with(books: Vec<Book>) -> Self {
        Self {
            books,
            attempts: Cell::new(0),
        }
    }
}

impl CatalogStore for FailingStore {
    fn load(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.books.clone())
    }

    fn save(&self, _books: &[Book]) -> Result<(), StoreError> {
        self.attempts.set(self.attempts.get() + 1);
        Err(StoreError::Io {
            path: PathBuf::from("books.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only medium"),
        })
    }
}

// =============================================================================
// Book sources
// =============================================================================

/// Returns the same candidates for every query and remembers the queries.
#[derive(Default)]
pub struct CannedSource {
    pub candidates: Vec<Candidate>,
    pub queries: RefCell<Vec<String>>,
}

impl CannedSource {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            candidates: pairs.iter().map(|(t, a)| Candidate::new(*t, *a)).collect(),
            queries: RefCell::new(Vec::new()),
        }
    }
}

impl BookSource for CannedSource {
    fn search(&self, query: &str) -> Result<Vec<Candidate>, ApiError> {
        self.queries.borrow_mut().push(query.to_string());
        Ok(self.candidates.clone())
    }
}

/// Always fails the way an unreadable response does.
pub struct FailingSource;

impl BookSource for FailingSource {
    fn search(&self, _query: &str) -> Result<Vec<Candidate>, ApiError> {
        let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        Err(ApiError::Parse(err))
    }
}

// =============================================================================
// Builders
// =============================================================================

pub fn book(id: u32, title: &str, author: &str, borrowed: bool) -> Book {
    let mut b = Book::new(id, title, author);
    if borrowed {
        b.mark_borrowed();
    }
    b
}

pub fn open(store: &MemoryStore) -> Library<&MemoryStore> {
    Library::open(store).unwrap()
}
