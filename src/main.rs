// Entrypoint for the catalog manager.
// - Keeps `main` small: build config, logging, client and store, then
//   hand everything to the menu loop.
// - Returns `anyhow::Result` so startup failures print with context.

use std::io::{self, IsTerminal};

use anyhow::Context;
use library_catalog::api::GoogleBooksClient;
use library_catalog::catalog::Library;
use library_catalog::config::Config;
use library_catalog::store::FlatFileStore;
use library_catalog::ui::{self, LinePrompter, SpinnerSource, TerminalPrompter};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(&config.log_filter);

    tracing::debug!(?config, "starting library-catalog");

    let client = GoogleBooksClient::new(&config.api_url)?;
    let store = FlatFileStore::new(&config.catalog_path);
    tracing::debug!(endpoint = client.endpoint(), catalog = %store.path().display(), "opening catalog");
    let library = Library::open(store)
        .with_context(|| format!("Failed to load catalog from {}", config.catalog_path.display()))?;

    let mut out = io::stdout();
    if io::stdin().is_terminal() {
        // Spinner and dialoguer prompts only make sense with a human attached.
        let source = SpinnerSource::new(&client);
        ui::run(library, &source, &mut TerminalPrompter, &mut out)
    } else {
        let mut prompter = LinePrompter::new(io::stdin().lock(), io::stdout());
        ui::run(library, &client, &mut prompter, &mut out)
    }
}

/// Install a stderr `fmt` subscriber. `RUST_LOG` takes precedence over the
/// configured directive.
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
