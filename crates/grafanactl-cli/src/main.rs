//! `grafanactl`: a command-line control plane for a Grafana instance's
//! Kubernetes-style resource API.

mod commands;
mod error;
mod exit_codes;
mod lint;
mod output;
mod session;
mod telemetry;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::SetContextArgs;
use error::CliError;
use output::{OnError, OutputFormat};

#[derive(Parser)]
#[command(name = "grafanactl", version, about = "Command-line control plane for a Grafana instance's resource API")]
struct Cli {
    /// Context to use instead of the config file's current context.
    #[arg(long, global = true)]
    context: Option<String>,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    /// Increase log verbosity. Repeatable.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage connection contexts.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Operate on a Grafana instance's resources.
    Resources {
        #[command(subcommand)]
        command: ResourcesCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the current configuration file.
    View,
    /// Create or update a named context.
    SetContext {
        name: String,
        #[arg(long = "grafana-server")]
        grafana_server: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        token: Option<String>,
        #[arg(long = "org-id")]
        org_id: Option<i64>,
        #[arg(long = "stack-id")]
        stack_id: Option<i64>,
        #[arg(long = "tls-insecure")]
        tls_insecure: Option<bool>,
    },
    /// Switch the current context.
    UseContext { name: String },
}

#[derive(Subcommand)]
enum ResourcesCommands {
    /// List the resource kinds the server advertises.
    List {
        #[arg(long)]
        wide: bool,
    },
    /// Fetch and print resources without touching disk.
    Get {
        selectors: Vec<String>,
        #[arg(short = 'o', long = "output", default_value = "yaml")]
        output: OutputFormat,
        #[arg(long)]
        include_managed: bool,
    },
    /// Pull resources from the server into a local directory tree.
    Pull {
        selectors: Vec<String>,
        #[arg(short = 'p', long = "path", default_value = "./resources")]
        path: PathBuf,
        #[arg(long)]
        include_managed: bool,
        #[arg(long, default_value = "yaml")]
        format: String,
        #[arg(long = "on-error", default_value = "fail")]
        on_error: OnError,
    },
    /// Push a local directory tree to the server.
    Push {
        selectors: Vec<String>,
        #[arg(short = 'd', long = "path", default_value = "./resources")]
        path: PathBuf,
        #[arg(long)]
        overwrite: bool,
        #[arg(long)]
        dry_run: bool,
        #[arg(long = "max-concurrent", default_value_t = 10)]
        max_concurrent: usize,
        #[arg(long = "on-error", default_value = "fail")]
        on_error: OnError,
    },
    /// Delete resources matching selectors.
    Delete {
        selectors: Vec<String>,
        /// Delete every resource the server advertises, ignoring selectors.
        #[arg(long)]
        all: bool,
        #[arg(long)]
        dry_run: bool,
        #[arg(long = "on-error", default_value = "fail")]
        on_error: OnError,
    },
    /// Dry-run push a local directory tree and report server-side validation errors.
    Validate {
        #[arg(short = 'p', long = "path", default_value = "./resources")]
        path: PathBuf,
        #[arg(long = "on-error", default_value = "fail")]
        on_error: OnError,
    },
    /// Serve a local directory tree for preview, reloading on file changes.
    Serve {
        #[arg(default_value = "./resources")]
        path: PathBuf,
        #[arg(long, default_value = "127.0.0.1")]
        address: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long = "watch")]
        watch: Vec<PathBuf>,
        #[arg(long)]
        script: Option<String>,
    },
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    miette::set_panic_hook();

    let cli = Cli::parse();
    console::set_colors_enabled(!cli.no_color);
    telemetry::init(cli.verbose);

    match run(cli).await {
        Ok(code) => std::process::ExitCode::from(code as u8),
        Err(err) => std::process::ExitCode::from(error::present(&err) as u8),
    }
}

async fn run(cli: Cli) -> Result<i32, CliError> {
    match cli.command {
        Commands::Config { command } => run_config(command),
        Commands::Resources { command } => run_resources(cli.context.as_deref(), command).await,
    }
}

fn run_config(command: ConfigCommands) -> Result<i32, CliError> {
    match command {
        ConfigCommands::View => commands::config::view(),
        ConfigCommands::SetContext { name, grafana_server, user, password, token, org_id, stack_id, tls_insecure } => {
            commands::config::set_context(
                name,
                SetContextArgs { grafana_server, user, password, token, org_id, stack_id, tls_insecure },
            )
        }
        ConfigCommands::UseContext { name } => commands::config::use_context(name),
    }
}

async fn run_resources(context: Option<&str>, command: ResourcesCommands) -> Result<i32, CliError> {
    // `serve` is filesystem-only and needs no server connection.
    if let ResourcesCommands::Serve { path, address, port, watch, script } = &command {
        return commands::resources::serve::run(path, address, *port, watch, script.as_deref()).await;
    }

    let session = session::connect(context).await?;

    match command {
        ResourcesCommands::List { wide } => commands::resources::list::run(&session, wide).await,
        ResourcesCommands::Get { selectors, output, include_managed } => {
            commands::resources::get::run(&session, &selectors, include_managed, output).await
        }
        ResourcesCommands::Pull { selectors, path, include_managed, format, on_error } => {
            commands::resources::pull::run(&session, &selectors, &path, include_managed, &format, on_error).await
        }
        ResourcesCommands::Push { selectors, path, overwrite, dry_run, max_concurrent, on_error } => {
            commands::resources::push::run(&session, &selectors, &path, overwrite, dry_run, max_concurrent, on_error).await
        }
        ResourcesCommands::Delete { selectors, all, dry_run, on_error } => {
            commands::resources::delete::run(&session, &selectors, all, dry_run, on_error).await
        }
        ResourcesCommands::Validate { path, on_error } => commands::resources::validate::run(&session, &path, on_error).await,
        ResourcesCommands::Serve { .. } => unreachable!("handled above"),
    }
}
