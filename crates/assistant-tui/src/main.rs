use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use assistant_core::config::ENDPOINT_ENV;
use assistant_core::{logging, ChatClient, Config, Conversation};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "assistant")]
#[command(about = "Chat with the business assistant from your terminal")]
#[command(version)]
struct Cli {
    /// Chat endpoint URL (overrides config file)
    #[arg(long, global = true, env = ENDPOINT_ENV)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single message and print the reply
    Ask {
        /// Your message
        message: String,
    },
    /// Save the chat endpoint to the config file
    SetEndpoint {
        /// Endpoint URL, e.g. http://192.168.1.20:5000/chat
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|_| Config::new());
    let endpoint = config.resolve_endpoint(cli.endpoint.as_deref());

    match cli.command {
        None => {
            let log_path = logging::init_file_logging(&config)?;
            tracing::info!(%endpoint, log = %log_path.display(), "starting chat widget");
            run_tui(&endpoint).await
        }
        Some(Commands::Ask { message }) => {
            logging::init_stderr_logging(&config)?;
            ask(&endpoint, &message).await
        }
        Some(Commands::SetEndpoint { url }) => {
            Config::save_endpoint(&url)?;
            println!("Endpoint saved: {}", url);
            Ok(())
        }
    }
}

async fn ask(endpoint: &str, message: &str) -> Result<()> {
    let client = ChatClient::new(endpoint);
    let mut conversation = Conversation::new();

    conversation.apply_priming(client.prime().await);

    match conversation.exchange(&client, message).await {
        Some(reply) => {
            println!("{}", reply.text);
            Ok(())
        }
        None => bail!("Nothing to send: message is empty"),
    }
}

async fn run_tui(endpoint: &str) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut app = App::new(ChatClient::new(endpoint));
    app.start_priming();

    let mut events = EventHandler::new();
    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    drop(events);
    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }

        app.poll_tasks().await;
    }
    Ok(())
}
