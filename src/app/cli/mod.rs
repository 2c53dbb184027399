//! CLI Adapter.

mod cluster_args;
mod config;
mod logging;

use clap::{Parser, Subcommand};

use crate::domain::AppError;

pub use cluster_args::ClusterArgs;

#[derive(Parser)]
#[command(name = "lxdask")]
#[command(version)]
#[command(about = "Build and submit Dask worker jobs for the CERN HTCondor pool", long_about = None)]
struct Cli {
    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the HTCondor submit description for one worker job
    #[clap(visible_alias = "js")]
    JobScript {
        #[command(flatten)]
        cluster: ClusterArgs,
    },
    /// Print the keywords handed to the job builder as JSON
    Kwargs {
        #[command(flatten)]
        cluster: ClusterArgs,
    },
    /// Submit worker jobs with condor_submit
    Submit {
        #[command(flatten)]
        cluster: ClusterArgs,
        /// Number of worker jobs
        #[arg(short = 'n', long, default_value_t = 1)]
        jobs: u32,
    },
    /// Inspect or initialize the jobqueue configuration
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

/// Entry point for the CLI.
pub fn run() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result: Result<(), AppError> = match cli.command {
        Commands::JobScript { cluster } => run_job_script(cluster),
        Commands::Kwargs { cluster } => run_kwargs(cluster),
        Commands::Submit { cluster, jobs } => run_submit(cluster, jobs),
        Commands::Config { command } => config::run_config(command),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_job_script(cluster: ClusterArgs) -> Result<(), AppError> {
    let script = crate::app::api::job_script(&cluster.into_options()?)?;
    print!("{}", script);
    Ok(())
}

fn run_kwargs(cluster: ClusterArgs) -> Result<(), AppError> {
    let kwargs = crate::app::api::kwargs(&cluster.into_options()?)?;
    let json = serde_json::to_string_pretty(&kwargs)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize keywords: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn run_submit(cluster: ClusterArgs, jobs: u32) -> Result<(), AppError> {
    if jobs == 0 {
        return Err(AppError::InvalidSetting {
            key: "jobs".to_string(),
            expected: "a positive integer",
        });
    }
    let ids = crate::app::api::submit(&cluster.into_options()?, jobs)?;
    println!("✅ Submitted {} worker job(s)", ids.len());
    for id in ids {
        println!("  {}", id);
    }
    Ok(())
}
