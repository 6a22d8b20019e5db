//! Example: Download a file
//!
//! Usage:
//!   cargo run --example download -- [--url URL] <REMOTE_KEY> <LOCAL_PATH>

mod cli;

use bucketlib::Result;
use cli::{cancel_on_ctrl_c, init_tracing, parse_connection, show_progress, usage_and_exit};
use tokio_util::sync::CancellationToken;

const USAGE: &str = "Usage: cargo run --example download -- [--url URL] [--proxy PROXY] <REMOTE_KEY> <LOCAL_PATH>";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let conn = parse_connection(USAGE);
    if conn.positionals.len() != 2 {
        usage_and_exit(USAGE);
    }
    let remote_key = conn.positionals[0].clone();
    let local_path = conn.positionals[1].clone();

    let mut session = conn.session()?;
    let progress = show_progress(session.take_events(), remote_key.clone());

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let result = session.download_to_file(&remote_key, &local_path, cancel).await;
    let _ = progress.await;

    let written = result?;
    println!("Saved {} bytes to {}", written, local_path);
    Ok(())
}
