//! Example: Upload a file
//!
//! Usage:
//!   cargo run --example upload -- [--url URL] [--chunk-size BYTES] <LOCAL_FILE> [REMOTE_FOLDER]

mod cli;

use std::process;

use bucketlib::{DirectoryPrefix, Notification};
use cli::{cancel_on_ctrl_c, init_tracing, parse_connection, show_progress, usage_and_exit};
use tokio_util::sync::CancellationToken;

const USAGE: &str = "Usage: cargo run --example upload -- [--url URL] [--csrf-token TOKEN] [--chunk-size BYTES] [--proxy PROXY] <LOCAL_FILE> [REMOTE_FOLDER]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let conn = parse_connection(USAGE);
    let (local_file, folder) = match conn.positionals.as_slice() {
        [file] => (file.clone(), String::new()),
        [file, folder] => (file.clone(), folder.clone()),
        _ => usage_and_exit(USAGE),
    };

    let mut session = conn.session()?;
    if session.config().csrf_token.is_none() {
        session.refresh_csrf_token().await?;
    }
    let progress = show_progress(session.take_events(), local_file.clone());

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let prefix = DirectoryPrefix::new(&folder);
    let result = session.upload(&local_file, &prefix, cancel).await;
    let _ = progress.await;

    match result {
        Ok(report) => {
            println!(
                "Stored {} ({} bytes, {} chunk(s))",
                report.target_path, report.size, report.chunks
            );
            Ok(())
        }
        Err(e) if e.is_cancelled() => {
            eprintln!("Upload cancelled");
            process::exit(130);
        }
        Err(e) => {
            eprintln!("{}", Notification::from_error(&e).message);
            process::exit(1);
        }
    }
}
