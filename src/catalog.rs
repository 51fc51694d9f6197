// Catalog model and operations. `Library` owns the in-memory list of books
// and the store it came from; every successful mutation is written back
// immediately, and `close` writes the final state once more.

use std::fmt;

use thiserror::Error;

use crate::api::BookSource;
use crate::store::{CatalogStore, StoreError};

pub type BookId = u32;

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    borrowed: bool,
}

impl Book {
    /// A new, not borrowed book. Line breaks in `title` and `author` are
    /// replaced by spaces since the catalog file is line oriented.
    pub fn new(id: BookId, title: &str, author: &str) -> Self {
        Book {
            id,
            title: single_line(title),
            author: single_line(author),
            borrowed: false,
        }
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn is_borrowed(&self) -> bool {
        self.borrowed
    }

    /// Flip to borrowed. Returns `false` if it already was.
    pub fn mark_borrowed(&mut self) -> bool {
        !std::mem::replace(&mut self.borrowed, true)
    }

    /// Flip back to available. Returns `false` if it was not borrowed.
    pub fn mark_returned(&mut self) -> bool {
        std::mem::replace(&mut self.borrowed, false)
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Title: {}, Author: {}, Borrowed: {}",
            self.id,
            self.title,
            self.author,
            if self.borrowed { "Yes" } else { "No" }
        )
    }
}

fn single_line(s: &str) -> String {
    s.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("No books found.")]
    NoBooksFound,
    #[error("Book not available for borrowing.")]
    NotAvailable(BookId),
    #[error("Book not found or not borrowed.")]
    NotBorrowed(BookId),
    #[error("No ids left for new books.")]
    IdsExhausted,
    #[error("Failed to save catalog: {0}")]
    Store(#[from] StoreError),
}

/// The session's catalog, bound to the store it is persisted in.
pub struct Library<S: CatalogStore> {
    books: Vec<Book>,
    store: S,
}

impl<S: CatalogStore> Library<S> {
    /// Load the catalog from `store`.
    pub fn open(store: S) -> Result<Self, CatalogError> {
        let books = store.load()?;
        tracing::info!(count = books.len(), "catalog opened");
        Ok(Library { books, store })
    }

    /// Persist the final state and release the store.
    pub fn close(self) -> Result<(), CatalogError> {
        self.store.save(&self.books)?;
        tracing::info!(count = self.books.len(), "catalog closed");
        Ok(())
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Id the next added book will get, or `None` once the highest id is
    /// `BookId::MAX`.
    pub fn next_id(&self) -> Option<BookId> {
        match self.books.iter().map(Book::id).max() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        }
    }

    /// Search `source` for `query` and append every candidate with
    /// sequential ids. Returns the assigned ids in candidate order.
    ///
    /// Failed and empty searches both come back as `NoBooksFound` and leave
    /// the catalog untouched, as does a batch that would run past
    /// `BookId::MAX` (`IdsExhausted`).
    pub fn add_from_search(
        &mut self,
        source: &dyn BookSource,
        query: &str,
    ) -> Result<Vec<BookId>, CatalogError> {
        let candidates = match source.search(query) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("search for {:?} failed: {}", query, e);
                return Err(CatalogError::NoBooksFound);
            }
        };
        if candidates.is_empty() {
            return Err(CatalogError::NoBooksFound);
        }

        // The whole batch must fit before anything is appended.
        let first = self.next_id();
        let last = first.and_then(|first| {
            let extra = BookId::try_from(candidates.len() - 1).ok()?;
            first.checked_add(extra)
        });
        let (Some(first), Some(last)) = (first, last) else {
            tracing::warn!(count = candidates.len(), "no ids left for the search results");
            return Err(CatalogError::IdsExhausted);
        };

        let added: Vec<BookId> = (first..=last).collect();
        for (id, candidate) in added.iter().zip(&candidates) {
            self.books.push(Book::new(*id, &candidate.title, &candidate.author));
        }
        tracing::info!(count = added.len(), query, "books added from search");

        self.persist()?;
        Ok(added)
    }

    /// Remove every book with `id` and return how many went away. The
    /// catalog is saved even when nothing matched.
    pub fn remove(&mut self, id: BookId) -> Result<usize, CatalogError> {
        let before = self.books.len();
        self.books.retain(|b| b.id != id);
        let removed = before - self.books.len();
        tracing::info!(id, removed, "remove");

        self.persist()?;
        Ok(removed)
    }

    /// Mark the first available book with `id` as borrowed.
    pub fn borrow_book(&mut self, id: BookId) -> Result<(), CatalogError> {
        let book = self
            .books
            .iter_mut()
            .find(|b| b.id == id && !b.borrowed)
            .ok_or(CatalogError::NotAvailable(id))?;
        book.mark_borrowed();
        tracing::info!(id, "book borrowed");

        self.persist()
    }

    /// Mark the first borrowed book with `id` as returned.
    pub fn return_book(&mut self, id: BookId) -> Result<(), CatalogError> {
        let book = self
            .books
            .iter_mut()
            .find(|b| b.id == id && b.borrowed)
            .ok_or(CatalogError::NotBorrowed(id))?;
        book.mark_returned();
        tracing::info!(id, "book returned");

        self.persist()
    }

    /// One display line per book, in catalog order. Call again to start
    /// over.
    pub fn list(&self) -> impl Iterator<Item = String> + '_ {
        self.books.iter().map(Book::to_string)
    }

    pub fn count(&self) -> usize {
        self.books.len()
    }

    fn persist(&self) -> Result<(), CatalogError> {
        self.store.save(&self.books).map_err(CatalogError::from)
    }
}
