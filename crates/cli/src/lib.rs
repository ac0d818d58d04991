pub mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use moltbot_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "moltbot",
    about = "Moltbot operator CLI",
    long_about = "Run assistant turns, preview reply rendering, inspect configuration, and check readiness.",
    after_help = "Examples:\n  moltbot ask \"幫我查台積電股價\" --json\n  echo '## Plan' | moltbot render\n  moltbot doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run one assistant turn and print the reply")]
    Ask {
        #[arg(required = true, num_args = 1.., help = "Message text (joined with spaces)")]
        text: Vec<String>,
        #[arg(long, help = "Caller id attached to log lines")]
        caller: Option<String>,
        #[arg(long, help = "Print the rendered outgoing payload as JSON")]
        json: bool,
    },
    #[command(about = "Render reply text as an outgoing payload without calling the backend")]
    Render {
        #[arg(help = "Reply text; read from stdin when omitted")]
        text: Option<String>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, backend credentials, search mode, and tool registry")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        init_logging(&config);
    }

    let result = match cli.command {
        Command::Ask { text, caller, json } => {
            commands::ask::run(&text.join(" "), caller.as_deref(), json)
        }
        Command::Render { text } => commands::render::run(text),
        Command::Config => commands::CommandResult::text(commands::config::run()),
        Command::Doctor { json } => commands::CommandResult::text(commands::doctor::run(json)),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}
