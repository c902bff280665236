//! crates/notes_client/src/bin/notes.rs
//!
//! A line-oriented terminal front end for the notes client. Each stdin line is
//! turned into a `Command`; the rendered view is printed whenever it changes.

use notes_client::{render, ClientState, Command, Controller, HttpNotesApi, View};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_API_URL: &str = "http://localhost:5001/api/notes";

const HELP: &str = "\
Commands:
  :list            reload notes from the server
  /text            search notes (a lone / clears the search)
  :open N          open the N-th note of the list
  :new             start a new note
  :title TEXT      set the title
  :content TEXT    replace the content
  TEXT             append a line to the content
  :save            save now (edits also save after 3 quiet seconds)
  :delete          delete the open note (asks for confirmation)
  :help            show this help
  :quit            save pending edits and exit";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Command(Command),
    Help,
    Quit,
    Invalid(String),
}

/// Maps a line to an intent. Anything that depends on the current state
/// (list positions, a pending delete confirmation, the existing content)
/// is left for the controller to resolve when it handles the command.
fn parse_line(line: &str) -> Input {
    if let Some(search) = line.strip_prefix('/') {
        return Input::Command(Command::Search(search.to_string()));
    }

    let Some(rest) = line.strip_prefix(':') else {
        return Input::Command(Command::AppendLine(line.to_string()));
    };

    let (name, arg) = rest.split_once(' ').unwrap_or((rest, ""));
    match name {
        "list" | "reload" => Input::Command(Command::Reload),
        "new" => Input::Command(Command::New),
        "save" => Input::Command(Command::Save),
        "delete" => Input::Command(Command::RequestDelete),
        "title" => Input::Command(Command::EditTitle(arg.to_string())),
        "content" => Input::Command(Command::EditContent(arg.to_string())),
        "open" => match arg.trim().parse::<usize>() {
            Ok(n) => Input::Command(Command::Open(n)),
            Err(_) => Input::Invalid(format!("'{}' is not a note number", arg.trim())),
        },
        "help" => Input::Help,
        "quit" | "q" => Input::Quit,
        other => Input::Invalid(format!("Unknown command ':{}' (try :help)", other)),
    }
}

/// Prints the view each time it changes; ends when the controller stops.
async fn print_views(mut updates: watch::Receiver<ClientState>) {
    let mut last: Option<View> = None;
    while updates.changed().await.is_ok() {
        let view = render(&updates.borrow_and_update());
        if view.loading || last.as_ref() == Some(&view) {
            continue;
        }
        println!("\n{}", view);
        last = Some(view);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let base_url = std::env::var("NOTES_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    info!("Using notes API at {}", base_url);
    let api = HttpNotesApi::new(reqwest::Client::new(), base_url);

    let (controller, updates) = Controller::new(api);
    let (tx, rx) = mpsc::channel(32);
    let shutdown = CancellationToken::new();
    let controller_task = tokio::spawn(controller.run(rx, shutdown.clone()));
    let printer = tokio::spawn(print_views(updates));

    let ctrl_c_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };

        match parse_line(&line) {
            Input::Command(command) => {
                if tx.send(command).await.is_err() {
                    break;
                }
            }
            Input::Help => println!("{}", HELP),
            Input::Quit => break,
            Input::Invalid(message) => eprintln!("{}", message),
        }
    }

    // Closing the channel makes the controller save pending edits and stop.
    drop(tx);
    controller_task.await?;
    printer.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_become_appends() {
        assert_eq!(
            parse_line("second line"),
            Input::Command(Command::AppendLine("second line".into()))
        );
        // A confirmation answer is also just a line; the controller decides.
        assert_eq!(parse_line("y"), Input::Command(Command::AppendLine("y".into())));
    }

    #[test]
    fn open_carries_the_position() {
        assert_eq!(parse_line(":open 2"), Input::Command(Command::Open(2)));
        assert!(matches!(parse_line(":open two"), Input::Invalid(_)));
    }

    #[test]
    fn search_and_titles() {
        assert_eq!(
            parse_line("/shop"),
            Input::Command(Command::Search("shop".into()))
        );
        assert_eq!(
            parse_line(":title Groceries list"),
            Input::Command(Command::EditTitle("Groceries list".into()))
        );
        assert_eq!(parse_line(":quit"), Input::Quit);
        assert!(matches!(parse_line(":frobnicate"), Input::Invalid(_)));
    }
}
