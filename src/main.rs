// src/main.rs
use env_logger::Builder;
use log::{error, info, LevelFilter};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;
use stock_dashboard::api::HttpBackend;
use stock_dashboard::config::Config;
use stock_dashboard::render::{Fragment, Tone};
use stock_dashboard::screen::{Notice, Screen, Snapshot};
use stock_dashboard::Dashboard;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task;

const HELP: &str = "commands: quote <symbol> | type <buy|sell> | target <price> | qty <n> | rule | refresh | help | quit";
const MESSAGE_HISTORY: usize = 5;

fn paint(line: &str, tone: Tone) -> String {
    match tone {
        Tone::Neutral => line.to_string(),
        Tone::Gain => format!("\x1b[32m{}\x1b[0m", line),
        Tone::Loss => format!("\x1b[31m{}\x1b[0m", line),
    }
}

fn section(out: &mut String, title: &str, fragment: Option<&Fragment>) {
    out.push_str(&format!("\x1b[1m{}\x1b[0m\n", title));
    match fragment {
        Some(fragment) => {
            for line in &fragment.lines {
                out.push_str(&paint(&line.text, line.tone));
                out.push('\n');
            }
        }
        None => out.push_str("...\n"),
    }
    out.push('\n');
}

fn draw(snapshot: &Snapshot, messages: &VecDeque<Notice>) {
    let mut out = String::from("\x1b[2J\x1b[H");
    if let Some(quote) = &snapshot.quote {
        section(&mut out, "Quote", Some(quote));
    }
    section(&mut out, "Active rules", snapshot.rules.as_ref());
    section(&mut out, "Portfolio", snapshot.portfolio.as_ref());
    section(&mut out, "Transactions", snapshot.transactions.as_ref());

    let inputs = &snapshot.inputs;
    out.push_str(&format!(
        "symbol [{}]  type [{}]  target [{}]  qty [{}]\n",
        inputs.symbol, inputs.rule_type, inputs.target_price, inputs.quantity
    ));
    for message in messages {
        match message {
            Notice::Info(text) => out.push_str(&paint(text, Tone::Gain)),
            Notice::Error(text) => out.push_str(&paint(text, Tone::Loss)),
        }
        out.push('\n');
    }
    out.push_str(HELP);
    out.push_str("\n> ");
    print!("{}", out);
    let _ = std::io::stdout().flush();
}

async fn redraw_loop(screen: Arc<Screen>) {
    let mut rx = screen.subscribe();
    let mut messages: VecDeque<Notice> = VecDeque::new();
    loop {
        for notice in screen.take_notices() {
            if messages.len() == MESSAGE_HISTORY {
                messages.pop_front();
            }
            messages.push_back(notice);
        }
        let snapshot = rx.borrow_and_update().clone();
        draw(&snapshot, &messages);
        if rx.changed().await.is_err() {
            break;
        }
    }
}

#[tokio::main]
async fn main() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };
    let backend = match HttpBackend::new(&config) {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return;
        }
    };

    info!("Starting the stock dashboard against {}...", config.base_url);
    let dashboard = Dashboard::new(backend);
    let mut sync = dashboard.scheduler(config.poll_interval);
    sync.start();
    task::spawn(redraw_loop(dashboard.screen.clone()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };
        let (command, rest) = match line.trim().split_once(char::is_whitespace) {
            Some((command, rest)) => (command.to_string(), rest.to_string()),
            None => (line.trim().to_string(), String::new()),
        };
        let screen = dashboard.screen.clone();

        match command.as_str() {
            "" => {}
            "quote" => {
                screen.edit_inputs(|i| i.symbol = rest.clone());
                let quotes = dashboard.quotes.clone();
                task::spawn(async move {
                    let _ = quotes.fetch_quote(&rest).await;
                });
            }
            "type" => screen.edit_inputs(|i| i.rule_type = rest),
            "target" => screen.edit_inputs(|i| i.target_price = rest),
            "qty" => screen.edit_inputs(|i| i.quantity = rest),
            "rule" => {
                let rules = dashboard.lists.rules.clone();
                task::spawn(async move {
                    let _ = rules.create_rule().await;
                });
            }
            "refresh" => {
                dashboard.lists.refresh_all();
            }
            "quit" | "exit" => break,
            "help" => screen.notify(Notice::Info(HELP.to_string())),
            other => screen.notify(Notice::Error(format!("Unknown command: {}", other))),
        }
    }

    drop(sync);
    info!("Dashboard closed.");
}
