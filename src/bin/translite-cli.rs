use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::process::ExitCode;

use translite::net::{Command, ControlClient, Reply};

#[derive(Parser)]
#[command(name = "translite-cli")]
#[command(about = "Send text to the running translite daemon", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "127.0.0.1:47231")]
    address: SocketAddr,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate text (English ⇄ Chinese, direction detected)
    Translate {
        #[arg(required = true)]
        text: Vec<String>,
        /// Backend to try first
        #[arg(short, long)]
        backend: Option<String>,
    },
    /// List backends with their health
    Backends,
    /// Measure one backend's latency
    Probe { id: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Translate { text, backend } => Command::Translate {
            text: text.join(" "),
            backend,
        },
        Commands::Backends => Command::Backends,
        Commands::Probe { id } => Command::Probe { backend: id },
    };

    let mut client = ControlClient::connect(cli.address).await?;
    let reply = client.send(&command).await?;
    print_reply(reply)
}

fn print_reply(reply: Reply) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match reply {
        Reply::Translated { text, .. } => println!("{}", text),
        Reply::Failed { message, attempts, .. } => {
            eprintln!("{}", message);
            for attempt in attempts {
                eprintln!("  {}: {}", attempt.backend, attempt.reason);
            }
            return Ok(ExitCode::FAILURE);
        }
        Reply::Backends { backends } => {
            println!("{}", serde_json::to_string_pretty(&backends)?);
        }
        Reply::Probed {
            backend,
            latency_ms: Some(ms),
            ..
        } => println!("{}: {}ms", backend, ms),
        Reply::Probed { backend, error, .. } => {
            eprintln!("{}: {}", backend, error.unwrap_or_else(|| "no answer".into()));
            return Ok(ExitCode::FAILURE);
        }
        Reply::Error { message } => {
            eprintln!("Error: {}", message);
            return Ok(ExitCode::FAILURE);
        }
    }
    Ok(ExitCode::SUCCESS)
}
