//! Example: List a folder
//!
//! Usage:
//!   cargo run --example ls -- [--url URL] [--hide NAME]... [--all] [FOLDER]

mod cli;

use bucketlib::{Listing, Result, SessionState};
use cli::{ArgParser, connection_from_parser, init_tracing};

const USAGE: &str = "Usage: cargo run --example ls -- [--url URL] [--hide NAME]... [--all] [FOLDER]";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let mut parser = ArgParser::new(USAGE);
    let show_all = parser.take_flag(&["--all", "-a"]);
    let mut hidden = Vec::new();
    while let Some(name) = parser.take_value(&["--hide"]) {
        hidden.push(name);
    }
    let conn = connection_from_parser(parser, USAGE);
    let folder = conn.positionals.first().cloned().unwrap_or_default();

    let session = conn.session()?;
    let mut state = SessionState::new();
    state.set_show_hidden(show_all);

    let listing = session.navigate_to(&mut state, &folder).await?;
    for name in &hidden {
        let key = state.resolve(name);
        state.toggle_hidden(&key);
    }

    let entries = match &listing {
        Listing::NotConfigured => {
            println!("Storage not configured. Please configure a storage provider.");
            return Ok(());
        }
        Listing::Entries(entries) => entries,
    };

    println!("Listing: /{}\n", state.prefix());
    if entries.is_empty() {
        println!("  (empty)");
    }
    for row in state.render(entries) {
        let icon = if row.entry.is_folder() { "📁" } else { "📄" };
        let preview = row
            .entry
            .preview()
            .map(|(kind, _)| format!(" [{:?}]", kind))
            .unwrap_or_default();
        println!(
            "  {} {:<40} {:>12}{}{}",
            icon,
            row.label,
            row.detail.unwrap_or_default(),
            preview,
            if row.dimmed { " (hidden)" } else { "" }
        );
    }

    Ok(())
}
