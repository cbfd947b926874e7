mod cli;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use promptrun::commands;
use promptrun::config::{self, Config, GatewayKind};
use promptrun::gateway;
use promptrun::session::state::RunStatus;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, GlobalOpts};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    install_panic_hook();
    let cli = Cli::parse();
    init_logging(cli.opts.log_file.as_deref())?;

    let mut config = match &cli.opts.config {
        Some(path) => config::load_from(path)?,
        None => config::load(&std::env::current_dir()?)?,
    };
    apply_gateway_overrides(&mut config, &cli.opts);

    let mut stdout = std::io::stdout();
    match cli.command {
        Some(Command::Exec { file, inputs }) => {
            let gateway = gateway::connect(&config.gateway)?;
            let status = commands::exec::exec(
                commands::exec::ExecConfig { file, inputs },
                &config,
                gateway,
                &mut stdout,
            )
            .await?;
            if status == RunStatus::Failed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Some(Command::Prompts { file }) => {
            commands::prompts::prompts(&file, &config, &mut stdout)?;
        }
        Some(Command::Ping) => {
            let gateway = gateway::connect(&config.gateway)?;
            commands::ping::ping(gateway, &mut stdout).await?;
        }
        Some(Command::Export { path }) => {
            let store = commands::open_store(&config, &cli.opts.session)?;
            let path = path.unwrap_or_else(|| PathBuf::from(&config.session.download_name));
            commands::store::export(&store, &path, &mut stdout)?;
        }
        Some(Command::Clear) => {
            let mut store = commands::open_store(&config, &cli.opts.session)?;
            commands::store::clear(&mut store, &mut stdout)?;
        }
        None => {
            let gateway = gateway::connect(&config.gateway)?;
            commands::run::run(
                commands::run::RunConfig {
                    file: cli.file,
                    session: cli.opts.session,
                },
                &config,
                gateway,
            )
            .await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Install a panic hook that restores terminal state before printing the panic.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        crossterm::terminal::disable_raw_mode().ok();
        default_hook(info);
    }));
}

/// Log to `log_file` if given, otherwise to stderr. Filtered by
/// `PROMPTRUN_LOG`, defaulting to warnings only.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_env("PROMPTRUN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

/// Command-line gateway options win over the config file.
fn apply_gateway_overrides(config: &mut Config, opts: &GlobalOpts) {
    if let Some(url) = &opts.gateway {
        config.gateway.kind = GatewayKind::Http;
        config.gateway.url.clone_from(url);
    }
    if opts.local {
        config.gateway.kind = GatewayKind::Process;
    }
}
