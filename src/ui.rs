// UI layer: the numbered text menu. It reads a choice, asks for whatever
// the chosen operation needs, runs it against the `Library` and prints the
// outcome. Catalog errors are printed as notices and never end the loop.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::{ApiError, BookSource, Candidate};
use crate::catalog::{BookId, Library};
use crate::store::CatalogStore;

const MENU: &str = "\
Library Management System
1. Add Book from API
2. Remove Book
3. Borrow Book
4. Return Book
5. Display Books
6. Count Books
7. Exit
";

const INVALID_NUMBER: &str = "Invalid input: please enter a number.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Add,
    Remove,
    Borrow,
    Return,
    Display,
    Count,
    Exit,
}

impl MenuChoice {
    /// Map a menu number (1-7) to its entry.
    pub fn from_number(n: i64) -> Option<Self> {
        Some(match n {
            1 => MenuChoice::Add,
            2 => MenuChoice::Remove,
            3 => MenuChoice::Borrow,
            4 => MenuChoice::Return,
            5 => MenuChoice::Display,
            6 => MenuChoice::Count,
            7 => MenuChoice::Exit,
            _ => return None,
        })
    }
}

/// Source of user input lines.
pub trait Prompter {
    /// Show `prompt` and read one line. `Ok(None)` means the input is over.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Prompts through `dialoguer`, for interactive terminals.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let line: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(Some(line))
    }
}

/// Reads plain lines from any buffered reader and echoes prompts to
/// `output`. Used for piped input and in tests.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        LinePrompter { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}: ", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

/// Wraps a `BookSource` with a terminal spinner while the search runs.
pub struct SpinnerSource<'a> {
    inner: &'a dyn BookSource,
}

impl<'a> SpinnerSource<'a> {
    pub fn new(inner: &'a dyn BookSource) -> Self {
        SpinnerSource { inner }
    }
}

impl BookSource for SpinnerSource<'_> {
    fn search(&self, query: &str) -> Result<Vec<Candidate>, ApiError> {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message("Searching...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = self.inner.search(query);
        spinner.finish_and_clear();
        result
    }
}

/// Run the menu until the user exits or input ends, then close the
/// library. The close happens on every path out of the menu, including
/// errors, and its failure is reported too.
pub fn run<S, P, W>(
    mut library: Library<S>,
    source: &dyn BookSource,
    prompter: &mut P,
    out: &mut W,
) -> Result<()>
where
    S: CatalogStore,
    P: Prompter + ?Sized,
    W: Write + ?Sized,
{
    let outcome = main_menu(&mut library, source, prompter, out);
    let closed = library.close().context("Failed to save catalog on exit");
    outcome?;
    closed
}

/// Main interactive menu: show the options, read a choice, dispatch.
/// Returns when the user picks Exit or the input ends.
pub fn main_menu<S, P, W>(
    library: &mut Library<S>,
    source: &dyn BookSource,
    prompter: &mut P,
    out: &mut W,
) -> Result<()>
where
    S: CatalogStore,
    P: Prompter + ?Sized,
    W: Write + ?Sized,
{
    loop {
        write!(out, "{}", MENU)?;
        out.flush()?;

        let Some(line) = prompter.read_line("Enter your choice")? else {
            writeln!(out, "Exiting...")?;
            return Ok(());
        };
        let Ok(number) = line.trim().parse::<i64>() else {
            writeln!(out, "{}", INVALID_NUMBER)?;
            continue;
        };

        let completed = match MenuChoice::from_number(number) {
            Some(MenuChoice::Add) => handle_add(library, source, prompter, out)?,
            Some(MenuChoice::Remove) => handle_remove(library, prompter, out)?,
            Some(MenuChoice::Borrow) => handle_borrow(library, prompter, out)?,
            Some(MenuChoice::Return) => handle_return(library, prompter, out)?,
            Some(MenuChoice::Display) => {
                handle_display(library, out)?;
                true
            }
            Some(MenuChoice::Count) => {
                writeln!(out, "Total books: {}", library.count())?;
                true
            }
            Some(MenuChoice::Exit) => false,
            None => {
                writeln!(out, "Invalid choice. Try again.")?;
                true
            }
        };

        if !completed {
            writeln!(out, "Exiting...")?;
            return Ok(());
        }
    }
}

// Each handler returns Ok(false) when the input ran out mid-operation.

fn handle_add<S, P, W>(
    library: &mut Library<S>,
    source: &dyn BookSource,
    prompter: &mut P,
    out: &mut W,
) -> Result<bool>
where
    S: CatalogStore,
    P: Prompter + ?Sized,
    W: Write + ?Sized,
{
    let Some(query) = prompter.read_line("Enter book title or author to search")? else {
        return Ok(false);
    };

    match library.add_from_search(source, &query) {
        Ok(ids) => {
            for book in library.books().iter().filter(|b| ids.contains(&b.id())) {
                writeln!(out, "Added {}", book)?;
            }
        }
        Err(e) => writeln!(out, "{}", e)?,
    }
    Ok(true)
}

fn handle_remove<S, P, W>(library: &mut Library<S>, prompter: &mut P, out: &mut W) -> Result<bool>
where
    S: CatalogStore,
    P: Prompter + ?Sized,
    W: Write + ?Sized,
{
    let Some(id) = read_id(prompter, out, "Enter book ID to remove")? else {
        return Ok(false);
    };

    match library.remove(id) {
        Ok(0) => writeln!(out, "No book with ID {}.", id)?,
        Ok(_) => writeln!(out, "Book removed.")?,
        Err(e) => writeln!(out, "{}", e)?,
    }
    Ok(true)
}

fn handle_borrow<S, P, W>(library: &mut Library<S>, prompter: &mut P, out: &mut W) -> Result<bool>
where
    S: CatalogStore,
    P: Prompter + ?Sized,
    W: Write + ?Sized,
{
    let Some(id) = read_id(prompter, out, "Enter book ID to borrow")? else {
        return Ok(false);
    };

    match library.borrow_book(id) {
        Ok(()) => writeln!(out, "Book {} borrowed.", id)?,
        Err(e) => writeln!(out, "{}", e)?,
    }
    Ok(true)
}

fn handle_return<S, P, W>(library: &mut Library<S>, prompter: &mut P, out: &mut W) -> Result<bool>
where
    S: CatalogStore,
    P: Prompter + ?Sized,
    W: Write + ?Sized,
{
    let Some(id) = read_id(prompter, out, "Enter book ID to return")? else {
        return Ok(false);
    };

    match library.return_book(id) {
        Ok(()) => writeln!(out, "Book {} returned.", id)?,
        Err(e) => writeln!(out, "{}", e)?,
    }
    Ok(true)
}

fn handle_display<S, W>(library: &Library<S>, out: &mut W) -> Result<()>
where
    S: CatalogStore,
    W: Write + ?Sized,
{
    if library.count() == 0 {
        writeln!(out, "The catalog is empty.")?;
        return Ok(());
    }
    for line in library.list() {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// Ask for a book id until a number is given or the input ends.
fn read_id<P, W>(prompter: &mut P, out: &mut W, prompt: &str) -> Result<Option<BookId>>
where
    P: Prompter + ?Sized,
    W: Write + ?Sized,
{
    loop {
        let Some(line) = prompter.read_line(prompt)? else {
            return Ok(None);
        };
        match line.trim().parse::<BookId>() {
            Ok(id) => return Ok(Some(id)),
            Err(_) => writeln!(out, "{}", INVALID_NUMBER)?,
        }
    }
}
