//! A terminal front end for the news search backend.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use news_chat::core::{ChatSession, ChatSessionBuilder, Notice, Snapshot};
use news_chat::render::{render_message, role_label, transcript_to_html};
use news_chat_http_gateway::{GatewayConfigBuilder, HttpGateway};
use news_chat_model::Role;
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt};
use tokio::select;
use tokio::time::sleep;

const BAR_CHAR: &str = "▎";

enum Command<'a> {
    Quit,
    Clear,
    History,
    Export(&'a str),
    Query(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line.split_once(char::is_whitespace) {
            Some(("/export", path)) => Command::Export(path.trim()),
            _ => match line {
                "/quit" => Command::Quit,
                "/clear" => Command::Clear,
                "/history" => Command::History,
                "/export" => Command::Export(""),
                _ => Command::Query(line),
            },
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut config_builder = GatewayConfigBuilder::new();
    if let Ok(base_url) = env::var("NEWS_CHAT_BASE_URL") {
        config_builder = config_builder.with_base_url(base_url);
    }
    if let Ok(timeout) = env::var("NEWS_CHAT_TIMEOUT_SECS") {
        let Some(timeout) = parse_timeout(&timeout) else {
            eprintln!(
                "NEWS_CHAT_TIMEOUT_SECS must be a positive number of seconds"
            );
            return;
        };
        config_builder = config_builder.with_timeout(timeout);
    }
    let seed_welcome_message = env::var("NEWS_CHAT_WELCOME")
        .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    let gateway = match HttpGateway::new(config_builder.build()) {
        Ok(gateway) => gateway,
        Err(err) => {
            eprintln!("failed to set up the search gateway: {err}");
            return;
        }
    };
    let session = ChatSessionBuilder::with_gateway(gateway)
        .seed_welcome_message(seed_welcome_message)
        .build();

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    let mut shown = 0;
    shown = print_new_entries(&session.snapshot(), shown);

    // One reader for the whole run, so piped lines stay buffered.
    let mut stdin = io::BufReader::new(io::stdin());
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line(&mut stdin).await else {
            break;
        };

        match Command::parse(&line) {
            Command::Quit => break,
            Command::Clear => {
                if let Err(err) = session.clear_conversation().await {
                    eprintln!("{}", format!("Cannot clear: {err}").bright_red());
                    continue;
                }
                let snapshot =
                    wait_idle(&session, &progress_style, "🧹 Clearing...").await;
                if let Some(notice) = &snapshot.last_notice {
                    let text = notice.text();
                    match notice {
                        Notice::Cleared => println!("{}", text.bright_green()),
                        Notice::ClearFailed(_) => {
                            println!("{}", text.bright_yellow())
                        }
                    }
                }
                shown = print_new_entries(&snapshot, 0);
            }
            Command::History => show_history(&session).await,
            Command::Export(path) => {
                if path.is_empty() {
                    eprintln!("usage: /export <file>");
                    continue;
                }
                let html = transcript_to_html(&session.snapshot().transcript);
                match tokio::fs::write(path, html).await {
                    Ok(()) => println!("Exported to {path}"),
                    Err(err) => {
                        error!("error writing {path}: {err}");
                        eprintln!("{}", format!("Cannot export: {err}").bright_red());
                    }
                }
            }
            Command::Query("") => continue,
            Command::Query(text) => {
                if let Err(err) = session.submit_query(text).await {
                    eprintln!("{}", format!("Cannot send: {err}").bright_red());
                    continue;
                }
                // The user's own entry is already on screen.
                shown += 1;
                let snapshot =
                    wait_idle(&session, &progress_style, "🔎 Searching...").await;
                shown = print_new_entries(&snapshot, shown);
                if let Some(report) = &snapshot.last_error {
                    eprintln!("{}", report.message.bright_red());
                }
            }
        }
    }
}

/// Waits for the outstanding request, spinning a typing indicator.
async fn wait_idle(
    session: &ChatSession,
    style: &ProgressStyle,
    message: &'static str,
) -> Snapshot {
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(style.clone());
    progress_bar.set_message(message);

    let idle = session.wait_idle();
    tokio::pin!(idle);
    let snapshot = loop {
        select! {
            snapshot = &mut idle => break snapshot,
            _ = sleep(Duration::from_millis(100)) => progress_bar.inc(1),
        }
    };

    // Finish the progress bar before printing anything else.
    progress_bar.finish_and_clear();
    snapshot
}

/// Prints the entries past `shown` and returns the new count.
fn print_new_entries(snapshot: &Snapshot, shown: usize) -> usize {
    let items = snapshot.transcript.items();
    for msg in items.iter().skip(shown) {
        let text = render_message(msg, &Local);
        let bar = match msg.role() {
            Role::User => BAR_CHAR.bright_green().to_string(),
            Role::Assistant => BAR_CHAR.bright_cyan().to_string(),
        };
        for line in text.lines() {
            println!("{bar}{}", line.bright_white());
        }
        println!();
    }
    items.len()
}

async fn show_history(session: &ChatSession) {
    match session.remote_conversation().await {
        Ok(Some(conversation)) => {
            println!("Session {}", conversation.session_id.bold());
            for msg in &conversation.messages {
                println!(
                    "{} [{}] {}",
                    role_label(msg.role).bright_cyan(),
                    msg.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    msg.content
                );
            }
        }
        Ok(None) => println!("No conversation yet."),
        Err(err) => {
            eprintln!("{}", format!("Cannot fetch history: {err}").bright_red())
        }
    }
}

fn parse_timeout(secs: &str) -> Option<Duration> {
    match secs.trim().parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(secs) => Some(Duration::from_secs(secs)),
    }
}

async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Option<String> {
    let mut line = String::new();

    match reader.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
