//! Relay Panel - terminal controller for a REST relay-switching backend.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use relay_panel::client::{
    discover_pins, Action, HttpRelayApi, Pin, RelayApi, TokenField, TokenGate, TokenInput,
};
use relay_panel::config::{ConfigLoader, PanelConfig};
use relay_panel::panel::{
    DispatchOutcome, PanelCommand, PanelElements, PanelSession, RefreshOutcome, RelayPanelClient,
    SessionFlow, TerminalPanel,
};

#[derive(Parser)]
#[command(
    name = "relay-panel",
    about = "Terminal control panel for a REST relay-switching backend",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file to use instead of the default search paths.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the config file).
    #[arg(long)]
    base_url: Option<String>,

    /// Access token (overrides the config file and environment).
    #[arg(long)]
    token: Option<String>,

    /// Relay pins to show (overrides the config file).
    #[arg(long, value_delimiter = ',')]
    pins: Vec<Pin>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and print relay state once.
    Status,
    /// Switch a relay on.
    On { pin: Pin },
    /// Switch a relay off.
    Off { pin: Pin },
    /// Toggle a relay.
    Toggle { pin: Pin },
    /// Interactive panel reading commands from stdin.
    Panel,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(cli: &Cli) -> Result<PanelConfig, String> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::with_path(path.clone()),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load().map_err(|e| e.to_string())?;

    if let Some(base_url) = &cli.base_url {
        config.base_url.clone_from(base_url);
    }
    if let Some(token) = &cli.token {
        config.token = Some(token.clone());
        config.token_field = true;
    }
    if !cli.pins.is_empty() {
        config.pins.clone_from(&cli.pins);
    }
    Ok(config)
}

/// Everything the commands need: the controller plus the handles the
/// terminal input side edits.
struct Panel {
    client: Arc<RelayPanelClient>,
    view: Arc<TerminalPanel>,
    token: Option<TokenInput>,
}

async fn build_panel(config: &PanelConfig) -> Result<Panel, String> {
    let api: Arc<dyn RelayApi> = Arc::new(
        HttpRelayApi::with_timeout(config.base_url.clone(), config.request_timeout())
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?,
    );

    let token = config
        .token_field
        .then(|| TokenInput::new(config.resolve_token().unwrap_or_default()));
    let field = token
        .clone()
        .map(|input| Arc::new(input) as Arc<dyn TokenField>);

    let pins = if config.pins.is_empty() {
        let gate = TokenGate::new(field.clone());
        discover_pins(api.as_ref(), &gate)
            .await
            .map_err(|e| format!("Failed to discover relay pins: {e}"))?
    } else {
        config.pins.clone()
    };
    tracing::info!(base_url = %config.base_url, pins = ?pins, "Relay panel ready");

    let view = Arc::new(TerminalPanel::new(pins));
    let mut elements = PanelElements::new(view.clone(), view.clone()).with_status(view.clone());
    if let Some(field) = field {
        elements = elements.with_token(field);
    }

    Ok(Panel {
        client: Arc::new(RelayPanelClient::new(api, elements)),
        view,
        token,
    })
}

fn refresh_exit_code(outcome: &RefreshOutcome) -> ExitCode {
    match outcome {
        RefreshOutcome::Applied(_) | RefreshOutcome::Superseded => ExitCode::SUCCESS,
        RefreshOutcome::Failed(_) => ExitCode::FAILURE,
    }
}

async fn run_action(panel: &Panel, pin: Pin, action: Action) -> ExitCode {
    match panel.client.dispatch(pin, action).await {
        DispatchOutcome::Confirmed(outcome) => {
            panel.view.print_outcome(&outcome);
            refresh_exit_code(&outcome)
        }
        DispatchOutcome::Rejected { .. } | DispatchOutcome::Unreachable { .. } => {
            ExitCode::FAILURE
        }
    }
}

async fn run_interactive(panel: Panel) -> ExitCode {
    TerminalPanel::print_help();
    panel.client.refresh().await;

    let mut session = PanelSession::new(panel.client.clone(), panel.token.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                session.abort().await;
                return ExitCode::SUCCESS;
            }
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read input");
                session.finish().await;
                return ExitCode::FAILURE;
            }
        };

        let command = match PanelCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        match command {
            PanelCommand::List => panel.view.print_summary(),
            PanelCommand::Help => TerminalPanel::print_help(),
            command => match session.submit(command) {
                Ok(SessionFlow::Continue) => {}
                Ok(SessionFlow::Quit) => break,
                Err(e) => eprintln!("{e}"),
            },
        }
    }

    session.finish().await;
    ExitCode::SUCCESS
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let panel = match build_panel(&config).await {
        Ok(panel) => panel,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Status => {
            let outcome = panel.client.refresh().await;
            panel.view.print_outcome(&outcome);
            refresh_exit_code(&outcome)
        }
        Commands::On { pin } => run_action(&panel, pin, Action::On).await,
        Commands::Off { pin } => run_action(&panel, pin, Action::Off).await,
        Commands::Toggle { pin } => run_action(&panel, pin, Action::Toggle).await,
        Commands::Panel => run_interactive(panel).await,
    }
}
