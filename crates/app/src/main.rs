//! Despatch Application CLI

use std::{process::ExitCode, sync::Arc};

use clap::{Args, Parser, Subcommand};
use despatch_app::{
    config::args::DeliveryArgs,
    database::{self, Db},
    domain::{
        reservations::PgReservationSweeper,
        slots::{PgSlotsService, SlotsService},
    },
};
use jiff::Timestamp;
use sqlx::PgPool;

#[derive(Debug, Parser)]
#[command(name = "despatch-app", about = "Despatch CLI", long_about = None)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(DbCommand),
    Slots(SlotsCommand),
    Reservations(ReservationsCommand),
}

#[derive(Debug, Args)]
struct DbCommand {
    #[command(subcommand)]
    command: DbSubcommand,
}

#[derive(Debug, Subcommand)]
enum DbSubcommand {
    /// Apply pending schema migrations
    Migrate,
}

#[derive(Debug, Args)]
struct SlotsCommand {
    #[command(subcommand)]
    command: SlotsSubcommand,
}

#[derive(Debug, Subcommand)]
enum SlotsSubcommand {
    /// Create any missing slots for the upcoming working days
    Ensure(EnsureSlotsArgs),
}

#[derive(Debug, Args)]
struct EnsureSlotsArgs {
    /// Number of working days to cover; the slot window when omitted
    #[arg(long)]
    days: Option<usize>,

    /// Same delivery settings the server reads
    #[command(flatten)]
    delivery: DeliveryArgs,
}

#[derive(Debug, Args)]
struct ReservationsCommand {
    #[command(subcommand)]
    command: ReservationsSubcommand,
}

#[derive(Debug, Subcommand)]
enum ReservationsSubcommand {
    /// Expire lapsed holds and return their capacity
    Sweep,
}

#[tokio::main]
pub async fn main() -> ExitCode {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let database_url = cli
        .database_url
        .ok_or_else(|| "DATABASE_URL is required".to_string())?;

    let pool = database::connect(&database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    match cli.command {
        Commands::Db(DbCommand {
            command: DbSubcommand::Migrate,
        }) => migrate(&pool).await,
        Commands::Slots(SlotsCommand {
            command: SlotsSubcommand::Ensure(args),
        }) => ensure_slots(pool, args).await,
        Commands::Reservations(ReservationsCommand {
            command: ReservationsSubcommand::Sweep,
        }) => sweep_reservations(pool).await,
    }
}

async fn migrate(pool: &PgPool) -> Result<(), String> {
    database::migrate(pool)
        .await
        .map_err(|error| format!("failed to apply migrations: {error}"))?;

    println!("migrations applied");

    Ok(())
}

async fn ensure_slots(pool: PgPool, args: EnsureSlotsArgs) -> Result<(), String> {
    let config = args
        .delivery
        .to_delivery_config()
        .map_err(|error| format!("invalid delivery settings: {error}"))?;

    let days = args.days.unwrap_or(config.window_days);

    let created = PgSlotsService::new(Db::new(pool), Arc::new(config))
        .ensure_slots_for_window(days, Timestamp::now())
        .await
        .map_err(|error| format!("failed to create slots: {error}"))?;

    println!("slots_created: {created}");

    Ok(())
}

async fn sweep_reservations(pool: PgPool) -> Result<(), String> {
    let released = PgReservationSweeper::new(Db::new(pool))
        .release_expired(Timestamp::now())
        .await
        .map_err(|error| format!("failed to sweep reservations: {error}"))?;

    println!("reservations_expired: {released}");

    Ok(())
}
