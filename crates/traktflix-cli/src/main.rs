use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::eyre;
use commands::{auth, daemon, run, App};
use traktflix_config::PathManager;

mod commands;
mod logging;
mod output;
mod ui;

#[derive(Parser)]
#[command(name = "traktflix")]
#[command(about = "Mark what you watch on Netflix as watched on Trakt")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize traktflix on your Trakt account
    #[command(long_about = "Authorize traktflix on your Trakt account using the device code flow. Open the printed URL, approve the application, and the credential is stored in the config directory.")]
    Auth,

    /// Run one reconciliation cycle
    #[command(long_about = "Fetch the Netflix viewing activity once, match new titles on Trakt and mark them as watched. Authorizes first if no Trakt credential is stored.")]
    Run,

    /// Run on a schedule until interrupted
    #[command(long_about = "Run a reconciliation cycle on every tick of the configured cron schedule until Ctrl-C. A cycle also runs on startup unless --no-startup-run is given.")]
    Daemon {
        /// Cron schedule expression with seconds (e.g. '0 0 * * * *' for hourly)
        #[arg(long, value_name = "SCHEDULE")]
        schedule: Option<String>,

        /// Skip the cycle on startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_run: bool,

        /// Also write logs to a daily rotated file in the log directory
        #[arg(long, action = ArgAction::SetTrue)]
        log_file: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let paths = PathManager::new().map_err(|e| eyre!("{:#}", e))?;
    let log_file = match &cli.command {
        Commands::Daemon { log_file: true, .. } => Some(paths.daemon_log_file()),
        _ => None,
    };
    logging::init_logging(cli.verbose, cli.quiet, log_file).map_err(|e| eyre!("{}", e))?;

    let output = output::Output::new(cli.quiet);
    let app = App::load(paths)?;

    match cli.command {
        Commands::Auth => auth::run_auth(&app, &output).await,
        Commands::Run => run::run_once(&app, &output).await,
        Commands::Daemon {
            schedule,
            no_startup_run,
            ..
        } => daemon::run_daemon(&app, schedule, no_startup_run, &output).await,
    }
}
