use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Options shared by every command.
#[derive(clap::Args, Debug)]
pub struct GlobalOpts {
    /// Name of the persisted session.
    #[arg(long, global = true, default_value = "default")]
    pub session: String,

    /// Read configuration from this file instead of .promptrun/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base URL of the HTTP execution service.
    #[arg(long, global = true, env = "PROMPTRUN_GATEWAY", value_name = "URL")]
    pub gateway: Option<String>,

    /// Run code with a local interpreter instead of the HTTP service.
    /// Takes precedence over --gateway.
    #[arg(long, global = true)]
    pub local: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(
    name = "promptrun",
    about = "Run scripts that ask for input, collecting the answers up front",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Source file to load and watch for changes.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub opts: GlobalOpts,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a file once with the given inputs and print its output.
    Exec {
        /// Source file to run.
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Answer for the next prompt. Repeat for each prompt.
        #[arg(short, long = "input", value_name = "TEXT")]
        inputs: Vec<String>,
    },

    /// List the prompts a file asks for.
    Prompts {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Check that the execution gateway is reachable.
    Ping,

    /// Write the saved session source to a file.
    Export {
        /// Target file. Defaults to the configured download name.
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
    },

    /// Delete the saved session source.
    Clear,
}
