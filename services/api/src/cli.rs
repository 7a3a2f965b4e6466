use crate::infra::open_ordering;
use crate::server;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use smartserve::auth::Authenticator;
use smartserve::config::AppConfig;
use smartserve::error::AppError;
use smartserve::ordering::NewUser;
use smartserve::telemetry;
use smartserve::testdata::{Seeder, TestDataPool};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "SmartServe",
    about = "Run and administer the SmartServe table-service ordering backend",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Validate the environment and print the effective settings
    CheckConfig,
    /// Fill the catalog with restaurants built from a test data file
    Seed(SeedArgs),
    /// Create an account with staff and superuser rights
    CreateSuperuser(SuperuserArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
struct SeedArgs {
    /// Test data JSON file; defaults to TEST_DATA_JSON_FILE_PATH
    #[arg(long)]
    fixture: Option<PathBuf>,
    /// Number of restaurants to generate
    #[arg(long, default_value_t = 1)]
    restaurants: usize,
}

#[derive(Args, Debug)]
struct SuperuserArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    password: String,
    /// Six-digit login identifier; generated when omitted
    #[arg(long)]
    employee_id: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::CheckConfig => check_config(),
        Command::Seed(args) => seed(args),
        Command::CreateSuperuser(args) => create_superuser(args),
    }
}

fn check_config() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    println!("{config:#?}");
    Ok(())
}

fn seed(args: SeedArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let fixture = args.fixture.or_else(|| config.test_data_path.clone());
    let pool = TestDataPool::from_path(fixture.as_deref())?;
    let ordering = open_ordering(&config)?;
    let report = Seeder::new(&*ordering, pool).seed(args.restaurants, Utc::now())?;

    println!(
        "seeded {} restaurants, {} users, {} tables, {} seats, {} menu items, {} bookings, {} orders",
        report.restaurants,
        report.users,
        report.tables,
        report.seats,
        report.menu_items,
        report.bookings,
        report.orders,
    );
    Ok(())
}

fn create_superuser(args: SuperuserArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let ordering = open_ordering(&config)?;
    let auth = Authenticator::new(ordering, &config);
    let user = auth.register_superuser(
        NewUser {
            employee_id: args.employee_id,
            first_name: args.first_name,
            last_name: args.last_name,
            password: Some(args.password),
            ..NewUser::default()
        },
        Utc::now(),
    )?;

    info!(user = %user.id, employee_id = %user.employee_id, "superuser created");
    println!("created superuser {} ({})", user.full_name(), user.employee_id);
    Ok(())
}
