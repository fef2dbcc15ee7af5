//! Velore email verification - terminal front-end

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use velore_storefront::domain::aggregates::{Key, Notice};
use velore_storefront::services::{AuthClient, Effect, JsonFileStore, SessionUpdate, StoredIdentity, UiEvent};
use velore_storefront::{Config, VerificationSession, VerifyView};

const HELP: &str = "digits: type at the cursor | paste <text> | back | left | right | enter | submit | resend | quit";

#[derive(Debug, PartialEq, Eq)]
enum Command { Event(UiEvent), Help, Quit }

fn parse_command(line: &str, focus: usize) -> Command {
    let line = line.trim();
    match line {
        "" | "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "back" => Command::Event(UiEvent::KeyDown { index: focus, key: Key::Backspace }),
        "left" => Command::Event(UiEvent::KeyDown { index: focus, key: Key::ArrowLeft }),
        "right" => Command::Event(UiEvent::KeyDown { index: focus, key: Key::ArrowRight }),
        "enter" => Command::Event(UiEvent::KeyDown { index: focus, key: Key::Enter }),
        "submit" => Command::Event(UiEvent::Submit),
        "resend" => Command::Event(UiEvent::Resend),
        _ => match line.strip_prefix("paste ") {
            Some(text) => Command::Event(UiEvent::Paste { index: focus, text: text.to_string() }),
            None => Command::Event(UiEvent::DigitChange { index: focus, raw: line.to_string() }),
        },
    }
}

fn render(view: &VerifyView) {
    let cells: String = view
        .slots
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let c = c.unwrap_or('_');
            if i == view.focus { format!("[{c}]") } else { format!(" {c} ") }
        })
        .collect();
    println!("{}  ({})", cells, view.email);
    match &view.notice {
        Some(Notice::Error(msg)) => println!("  ! {msg}"),
        Some(Notice::Success(msg)) => println!("  * {msg}"),
        None => {}
    }
    let verify = if view.verify_enabled { view.verify_label.to_string() } else { format!("({})", view.verify_label) };
    let resend = if view.resend_enabled { view.resend_label.clone() } else { format!("({})", view.resend_label) };
    println!("  {verify}   {resend}");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)).init();
    let config = Config::from_env()?;
    let store = JsonFileStore::open(&config.store_path)?;
    let identity = StoredIdentity::load(&store);
    let client = AuthClient::new(config.backend_url.clone(), config.request_timeout)?;
    tracing::info!(backend = %client.base_url(), "starting verification");

    let session = VerificationSession::new(&identity, client);
    let mut focus = session.view().focus;
    render(&session.view());
    println!("{HELP}");

    let (ui_tx, ui_rx) = mpsc::channel::<UiEvent>(16);
    let (update_tx, mut updates) = mpsc::channel::<SessionUpdate>(16);
    let runner = tokio::spawn(session.run(ui_rx, update_tx));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else { break };
                focus = update.view.focus;
                render(&update.view);
                if let Some(Effect::Navigate(route)) = update.effects.iter().find(|e| matches!(e, Effect::Navigate(_))) {
                    println!("Continue at {}", route.path());
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line, focus) {
                    Command::Event(event) => {
                        if ui_tx.send(event).await.is_err() { break; }
                    }
                    Command::Help => println!("{HELP}"),
                    Command::Quit => break,
                }
            }
        }
    }

    drop(ui_tx);
    drop(updates);
    runner.await?;
    Ok(())
}
