use std::env;
use std::process;

use bucketlib::{ClientConfig, Session, TransferEvent};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

pub fn usage_and_exit(usage: &str) -> ! {
    eprintln!("{usage}");
    process::exit(1);
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bucketlib=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

pub struct ArgParser {
    args: Vec<String>,
    usage: &'static str,
}

impl ArgParser {
    pub fn new(usage: &'static str) -> Self {
        let args: Vec<String> = env::args().skip(1).collect();

        if args.iter().any(|a| a == "--help" || a == "-h") {
            println!("{usage}");
            process::exit(0);
        }

        Self { args, usage }
    }

    pub fn take_value(&mut self, names: &[&str]) -> Option<String> {
        let mut i = 0;
        while i < self.args.len() {
            if names.contains(&self.args[i].as_str()) {
                let value = self.args.get(i + 1).cloned();
                if value.is_none() {
                    usage_and_exit(self.usage);
                }
                self.args.drain(i..=i + 1);
                return value;
            }
            i += 1;
        }
        None
    }

    #[allow(dead_code)]
    pub fn take_flag(&mut self, names: &[&str]) -> bool {
        let before = self.args.len();
        self.args.retain(|a| !names.contains(&a.as_str()));
        self.args.len() != before
    }

    pub fn remaining(self) -> Vec<String> {
        self.args
    }
}

/// Backend connection options shared by all demos.
pub struct Connection {
    pub config: ClientConfig,
    pub positionals: Vec<String>,
}

/// Parse `--url`, `--csrf-token`, `--chunk-size` and `--proxy`; the
/// `BUCKETLIB_*` environment variables fill in anything not given.
#[allow(dead_code)]
pub fn parse_connection(usage: &'static str) -> Connection {
    connection_from_parser(ArgParser::new(usage), usage)
}

pub fn connection_from_parser(mut parser: ArgParser, usage: &'static str) -> Connection {
    let mut config = ClientConfig::default()
        .apply_env()
        .unwrap_or_else(|e| {
            eprintln!("{e}");
            usage_and_exit(usage)
        });
    if let Some(url) = parser.take_value(&["--url", "-u"]) {
        config.base_url = url;
    }
    if let Some(token) = parser.take_value(&["--csrf-token"]) {
        config.csrf_token = Some(token);
    }
    if let Some(size) = parser.take_value(&["--chunk-size"]) {
        config.chunk_size = size.parse().unwrap_or_else(|_| usage_and_exit(usage));
    }
    if let Some(proxy) = parser.take_value(&["--proxy"]) {
        config.proxy = Some(proxy);
    }

    Connection {
        config,
        positionals: parser.remaining(),
    }
}

impl Connection {
    pub fn session(&self) -> bucketlib::Result<Session> {
        Session::new(self.config.clone())
    }
}

/// Cancel `token` on Ctrl-C.
#[allow(dead_code)]
pub fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
}

/// Drive a progress bar from transfer events and print notifications.
#[allow(dead_code)]
pub fn show_progress(mut events: UnboundedReceiver<TransferEvent>, label: String) -> JoinHandle<()> {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    bar.set_message(label);

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match &event {
                TransferEvent::Started { total, .. } => {
                    if let Some(total) = total {
                        bar.set_length(*total);
                    }
                }
                TransferEvent::Progress(progress) => {
                    if let Some(total) = progress.total {
                        bar.set_length(total);
                    } else {
                        bar.set_length(progress.done.max(1));
                    }
                    bar.set_position(progress.done);
                }
                _ => {}
            }

            if event.is_terminal() {
                match bucketlib::Notification::from_event(&event) {
                    Some(notification) => bar.finish_with_message(notification.message),
                    None => bar.finish_with_message("done"),
                }
                break;
            }
        }
    })
}
