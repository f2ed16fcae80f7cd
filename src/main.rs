use std::{io, sync::Arc, time::Duration};

use clap::Parser;
use log::{debug, info};
use tokio::io::{AsyncBufReadExt, BufReader};

use github_profile_lookup::{
    DismissReason, GITHUB_REST_ENDPOINT, LookupConfiguration, LookupController,
    LookupOrchestrator, StdResult, TerminalPresenter,
};

/// Command line arguments for the GitHub profile lookup
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Username looked up at startup
    username: Option<String>,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "GITHUB_API_ENDPOINT", default_value = GITHUB_REST_ENDPOINT)]
    endpoint: String,

    /// Optional API token, used for elevated rate limits
    #[arg(long, env = "GITHUB_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Timeout of each API call, in seconds
    #[arg(short, long, env = "LOOKUP_TIMEOUT_SECS", default_value_t = 8)]
    timeout_secs: u64,

    /// Delay before a lookup hits the API, in milliseconds
    #[arg(short, long, env = "LOOKUP_DEBOUNCE_MS", default_value_t = 300)]
    debounce_ms: u64,
}

impl Args {
    fn configuration(&self) -> LookupConfiguration {
        LookupConfiguration {
            endpoint: self.endpoint.clone(),
            api_token: self.api_token.clone().filter(|token| !token.is_empty()),
            timeout: Duration::from_secs(self.timeout_secs),
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }
}

/// A line typed by the user
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Lookup(String),
    Reload,
    Open(usize),
    Dismiss(DismissReason),
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return Command::Lookup(line.to_string());
        };
        let mut words = command.split_whitespace();
        match (words.next(), words.next()) {
            (Some("open"), Some(position)) => match position.parse::<usize>() {
                Ok(position) if position > 0 => Command::Open(position - 1),
                _ => Command::Unknown(line.to_string()),
            },
            (Some("reload"), None) => Command::Reload,
            (Some("close"), None) => Command::Dismiss(DismissReason::CloseButton),
            (Some("escape"), None) => Command::Dismiss(DismissReason::EscapeKey),
            (Some("outside"), None) => Command::Dismiss(DismissReason::OutsideClick),
            (Some("quit"), None) => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

#[tokio::main]
async fn main() -> StdResult<()> {
    env_logger::init();
    let args = Args::parse();
    let configuration = args.configuration();
    debug!(
        "Configuration: endpoint={}, timeout={:?}, debounce={:?}, authenticated={}",
        configuration.endpoint,
        configuration.timeout,
        configuration.debounce,
        configuration.api_token.is_some()
    );

    let orchestrator = Arc::new(LookupOrchestrator::try_from_configuration(&configuration)?);
    let presenter = Arc::new(TerminalPresenter::new(io::stdout()));
    let controller = Arc::new(LookupController::new(orchestrator.clone(), presenter));
    info!("Starting GitHub profile lookup");

    if let Some(username) = args.username {
        spawn_lookup(&controller, username);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Lookup(username) => spawn_lookup(&controller, username),
            Command::Reload => match orchestrator.context().last_key().await {
                Some(key) => spawn_lookup(&controller, key.to_string()),
                None => println!("Nothing to reload yet"),
            },
            Command::Open(index) => match controller.repository_at(index).await {
                Some(repository) => controller.repository_selected(&repository).await,
                None => println!("No repository at position {}", index + 1),
            },
            Command::Dismiss(reason) => controller.overlay_dismissed(reason).await,
            Command::Quit => break,
            Command::Unknown(line) => {
                println!("Unknown command {line}, use :open N, :close, :escape, :outside, :reload or :quit")
            }
        }
    }
    info!("Stopping GitHub profile lookup");

    Ok(())
}

fn spawn_lookup(controller: &Arc<LookupController>, username: String) {
    let controller = Arc::clone(controller);
    tokio::spawn(async move { controller.lookup_requested(&username).await });
}
