// Catalog persistence. The catalog lives in a plain text file holding one
// 4-line record per book:
//
//     <id>
//     <title>
//     <author>
//     <borrowed: 1 or 0>
//
// The file is always rewritten as a whole.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::catalog::Book;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where the catalog is loaded from and saved to.
pub trait CatalogStore {
    /// Load every stored book, in stored order. A store that has never been
    /// written yields an empty catalog.
    fn load(&self) -> Result<Vec<Book>, StoreError>;

    /// Replace the stored catalog with `books`.
    fn save(&self, books: &[Book]) -> Result<(), StoreError>;
}

impl<T: CatalogStore + ?Sized> CatalogStore for &T {
    fn load(&self) -> Result<Vec<Book>, StoreError> {
        (**self).load()
    }

    fn save(&self, books: &[Book]) -> Result<(), StoreError> {
        (**self).save(books)
    }
}

/// The flat 4-lines-per-book text file.
#[derive(Debug, Clone)]
pub struct FlatFileStore {
    path: PathBuf,
}

impl FlatFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling of the catalog file used while saving: the full file name
    /// with `.tmp` appended, so it never equals the catalog path itself.
    pub fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn io_err(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CatalogStore for FlatFileStore {
    fn load(&self) -> Result<Vec<Book>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no catalog file yet, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_err(e)),
        };

        let books = parse_records(&content);
        tracing::debug!(path = %self.path.display(), count = books.len(), "catalog loaded");
        Ok(books)
    }

    fn save(&self, books: &[Book]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        // Write next to the target, then swap it in.
        let tmp = self.tmp_path();
        let written = fs::File::create(&tmp).and_then(|file| {
            let mut file = io::BufWriter::new(file);
            file.write_all(render_records(books).as_bytes())?;
            file.flush()
        });
        if let Err(e) = written.and_then(|_| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_err(e));
        }

        tracing::debug!(path = %self.path.display(), count = books.len(), "catalog saved");
        Ok(())
    }
}

/// Serialize books into the 4-line record format.
pub fn render_records(books: &[Book]) -> String {
    let mut out = String::new();
    for book in books {
        out.push_str(&format!(
            "{}\n{}\n{}\n{}\n",
            book.id(),
            book.title(),
            book.author(),
            if book.is_borrowed() { 1 } else { 0 }
        ));
    }
    out
}

/// Parse records until the end of `content` or the first malformed record.
///
/// Reading stops at a record whose id is not a positive integer, whose
/// borrowed flag is not `0`/`1`, or which is cut short by the end of the
/// file. Everything from that point on is ignored and reported with a
/// warning naming the line.
pub fn parse_records(content: &str) -> Vec<Book> {
    let mut books = Vec::new();
    let mut lines = content
        .lines()
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .peekable();

    loop {
        // Blank lines between records are tolerated.
        while lines.next_if(|(_, line)| line.trim().is_empty()).is_some() {}

        let Some((id_line, raw_id)) = lines.next() else {
            break;
        };
        let id = match raw_id.trim().parse::<u32>() {
            Ok(id) if id > 0 => id,
            _ => {
                tracing::warn!(line = id_line, "invalid book id {:?}, ignoring the rest of the catalog file", raw_id);
                break;
            }
        };

        let (Some((_, title)), Some((_, author)), Some((flag_line, flag))) =
            (lines.next(), lines.next(), lines.next())
        else {
            tracing::warn!(line = id_line, "record for book {} is incomplete, ignoring it", id);
            break;
        };

        let borrowed = match flag.trim() {
            "1" => true,
            "0" => false,
            other => {
                tracing::warn!(line = flag_line, "invalid borrowed flag {:?}, ignoring the rest of the catalog file", other);
                break;
            }
        };

        let mut book = Book::new(id, title, author);
        if borrowed {
            book.mark_borrowed();
        }
        books.push(book);
    }

    books
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: u32, title: &str, author: &str, borrowed: bool) -> Book {
        let mut b = Book::new(id, title, author);
        if borrowed {
            b.mark_borrowed();
        }
        b
    }

    #[test]
    fn renders_four_lines_per_book() {
        let books = vec![book(1, "Dune", "Frank Herbert", false), book(3, "Emma", "Jane Austen", true)];
        assert_eq!(
            render_records(&books),
            "1\nDune\nFrank Herbert\n0\n3\nEmma\nJane Austen\n1\n"
        );
    }

    #[test]
    fn parses_records_with_crlf_and_blank_lines() {
        let content = "1\r\nDune\r\nFrank Herbert\r\n0\r\n\r\n2\nEmma\nJane Austen\n1\n";
        assert_eq!(
            parse_records(content),
            vec![book(1, "Dune", "Frank Herbert", false), book(2, "Emma", "Jane Austen", true)]
        );
    }

    #[test]
    fn empty_title_is_kept() {
        let books = parse_records("4\n\nUnknown\n0\n");
        assert_eq!(books, vec![book(4, "", "Unknown", false)]);
    }

    #[test]
    fn stops_at_non_numeric_id() {
        let content = "1\nDune\nFrank Herbert\n0\nxx\nEmma\nJane Austen\n1\n";
        assert_eq!(parse_records(content), vec![book(1, "Dune", "Frank Herbert", false)]);
    }

    #[test]
    fn stops_at_zero_id() {
        assert!(parse_records("0\nNothing\nNobody\n0\n").is_empty());
    }

    #[test]
    fn stops_at_bad_flag() {
        let content = "1\nDune\nFrank Herbert\nmaybe\n2\nEmma\nJane Austen\n1\n";
        assert!(parse_records(content).is_empty());
    }

    #[test]
    fn tmp_path_appends_a_suffix() {
        assert_eq!(FlatFileStore::new("books.txt").tmp_path(), PathBuf::from("books.txt.tmp"));
        assert_eq!(FlatFileStore::new("data/books.tmp").tmp_path(), PathBuf::from("data/books.tmp.tmp"));
    }

    #[test]
    fn drops_truncated_trailing_record() {
        let content = "1\nDune\nFrank Herbert\n1\n2\nEmma\n";
        assert_eq!(parse_records(content), vec![book(1, "Dune", "Frank Herbert", true)]);
    }
}
