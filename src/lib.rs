// Library root
// -----------
// This crate exposes the catalog manager as a library. The binary
// (`main.rs`) wires these modules together into the interactive CLI.
//
// Module responsibilities:
// - `api`: Talks to the remote book-search service and turns its JSON
//   into title/author candidates.
// - `store`: Reads and writes the flat text catalog file.
// - `catalog`: The book record and the operations on the catalog (add,
//   remove, borrow, return, list, count).
// - `ui`: The numbered text menu that drives the operations.
// - `config`: Environment-driven settings with sensible defaults.
pub mod api;
pub mod catalog;
pub mod config;
pub mod store;
pub mod ui;
