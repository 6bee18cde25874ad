use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::*;
use env_logger::{Builder, Env};
use log::info;
use rouilleftp::config::load_config;
use rouilleftp::core_cli::Cli;
use rouilleftp::{Config, FtpCommand, Session, SessionState};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Initialize the logger with a custom format and colors
    let default_filter = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            let timestamp = buf.timestamp().to_string();
            let level = match record.level() {
                log::Level::Error => record.level().to_string().red(),
                log::Level::Warn => record.level().to_string().yellow(),
                log::Level::Info => record.level().to_string().green(),
                log::Level::Debug => record.level().to_string().blue(),
                log::Level::Trace => record.level().to_string().white(),
            };
            writeln!(buf, "[{}] [{}] {}", timestamp, level, record.args())
        })
        .init();

    let mut config = if args.config.is_empty() {
        Config::default()
    } else {
        load_config(&args.config)?
    };
    args.apply(&mut config.client)?;

    if !config.client.local_dir.is_dir() {
        bail!("Invalid working directory: {:?}", config.client.local_dir);
    }

    let target = format!("{}:{}", config.client.server_addr, config.client.server_port);
    let mut session = Session::connect(config.client)
        .await
        .with_context(|| format!("Failed to open a session with {}", target))?;
    println!("Connected to {}", target);

    run_interactive(&mut session).await
}

/// Reads commands from stdin until QUIT, end of input or a fatal error.
async fn run_interactive(session: &mut Session) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while session.state() == SessionState::Ready {
        let Some(line) = lines.next_line().await? else {
            info!("End of input, closing session");
            session.execute(FtpCommand::Quit).await?;
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match session.execute_line(&line).await {
            Ok(outcome) => print!("{}", outcome),
            Err(e) => println!("{}", e.to_string().red()),
        }
    }
    Ok(())
}
