//! Command-line interface for the dashboards binary.
//!
//! The CLI mirrors `mkr dashboards`: generate a dashboard from YAML, pull
//! and push JSON artifacts, migrate legacy dashboards, or list everything
//! when no subcommand is given.

use std::{io, path::PathBuf, process};

use clap::{ArgAction, Args, Parser, Subcommand};
use mkr_dashboards::{
    ClientConfig, Error, GenerateOutcome, MackerelClient, generate_dashboard, list_dashboards,
    load_config, pull_dashboards, push_dashboard, run_migration_to_stdout,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line interface for managing Mackerel custom dashboards.
#[derive(Debug, Parser,)]
#[command(name = "mkr-dashboards", version, about = "Manage Mackerel custom dashboards")]
struct Cli
{
    /// API key of the Mackerel organization.
    #[arg(long = "apikey", env = "MACKEREL_APIKEY", global = true, hide_env_values = true)]
    api_key: Option<String,>,

    /// Base URL of the Mackerel API.
    #[arg(long = "apibase", env = "MACKEREL_APIBASE", global = true)]
    api_base: Option<String,>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand,)]
enum Command
{
    /// Manipulate custom dashboards. Lists all dashboards when no subcommand
    /// is given.
    Dashboards(DashboardsArgs,),
}

#[derive(Debug, Args,)]
struct DashboardsArgs
{
    #[command(subcommand)]
    command: Option<DashboardsCommand,>,
}

#[derive(Debug, Subcommand,)]
enum DashboardsCommand
{
    /// Generate a custom dashboard from a YAML file.
    Generate(GenerateArgs,),
    /// Save every dashboard to `dashboard-<id>.json` files.
    Pull(PullArgs,),
    /// Create or update a dashboard from a JSON file.
    Push(PushArgs,),
    /// Migrate a legacy dashboard to a markdown widget dashboard.
    Migrate(MigrateArgs,),
}

#[derive(Debug, Args,)]
struct GenerateArgs
{
    /// YAML file describing the dashboard.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Print the markdown instead of submitting it.
    #[arg(short = 'p', long = "print", action = ArgAction::SetTrue)]
    print: bool,
}

#[derive(Debug, Args,)]
struct PullArgs
{
    /// Directory receiving the dashboard files.
    #[arg(long = "output-dir", value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Debug, Args,)]
struct PushArgs
{
    /// Dashboard JSON file to push.
    #[arg(short = 'F', long = "file-path", value_name = "PATH")]
    file_path: PathBuf,
}

#[derive(Debug, Args,)]
struct MigrateArgs
{
    /// Identifier of the legacy dashboard.
    #[arg(long = "id", value_name = "ID")]
    id: String,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    init_tracing();

    if let Err(error,) = run(Cli::parse(),).await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

fn init_tracing()
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info",),);
    tracing_subscriber::fmt().with_env_filter(filter,).with_writer(io::stderr,).with_target(false,).init();
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates configuration, API and artifact errors.
async fn run(cli: Cli,) -> Result<(), Error,>
{
    let Command::Dashboards(args,) = cli.command;

    // Configuration problems are reported before credentials are checked.
    let document = match &args.command {
        Some(DashboardsCommand::Generate(generate,),) => Some(load_config(&generate.file,)?,),
        _ => None,
    };

    let config = ClientConfig::new(cli.api_key.as_deref(), cli.api_base.as_deref(),)?;
    let client = MackerelClient::new(config,)?;

    match args.command {
        None => {
            println!("{}", list_dashboards(&client,).await?);
        }
        Some(DashboardsCommand::Generate(generate,),) => {
            let document = document.ok_or_else(|| Error::validation("missing dashboard document",),)?;
            match generate_dashboard(&client, &document, generate.print,).await? {
                GenerateOutcome::Printed(markdown,) => println!("{markdown}"),
                GenerateOutcome::Created(dashboard,) => {
                    info!(id = %dashboard.id, "dashboard created");
                }
                GenerateOutcome::Updated(dashboard,) => {
                    info!(id = %dashboard.id, "dashboard updated");
                }
            }
        }
        Some(DashboardsCommand::Pull(pull,),) => {
            pull_dashboards(&client, &pull.output_dir,).await?;
        }
        Some(DashboardsCommand::Push(push,),) => {
            let dashboard = push_dashboard(&client, &push.file_path,).await?;
            info!(id = %dashboard.id, "dashboard pushed");
        }
        Some(DashboardsCommand::Migrate(migrate,),) => {
            let dashboard = run_migration_to_stdout(&client, &migrate.id, &PathBuf::from(".",),).await?;
            info!(id = %dashboard.id, "dashboard migrated");
        }
    }

    Ok((),)
}
