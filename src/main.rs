mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use helpdesk::config::{DatabaseArgs, LogFormat, ServeArgs};

#[derive(Parser)]
#[command(name = "helpdesk")]
#[command(about = "A minimal helpdesk ticketing web application")]
#[command(version)]
struct Cli {
    /// Log output format
    #[arg(long, global = true, env = "HELPDESK_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the helpdesk over HTTP
    Serve(ServeArgs),

    /// Create the database schema
    Init {
        #[command(flatten)]
        db: DatabaseArgs,
        /// Seed a few sample tickets into an empty database
        #[arg(long)]
        sample: bool,
    },
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.with_target(false).init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Commands::Serve(args) => commands::serve::run(&args).await,
        Commands::Init { db, sample } => commands::init::run(&db.database, sample),
    }
}
