mod find;
mod locations;
mod team;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use meetpoint_amap::AmapClient;
use meetpoint_core::{AppConfig, Geocoder, LocationStore, RankBy, TransportMode, VenueCategory};
use meetpoint_db::PgLocationStore;
use meetpoint_planner::{FindRequest, MeetingPlanner, DEFAULT_RADIUS_METERS};
use tracing_subscriber::EnvFilter;

use crate::locations::{LocationsCommands, MemberArgs};
use crate::team::TeamCommands;

#[derive(Debug, Parser)]
#[command(name = "meetpoint-cli")]
#[command(about = "Find a place everyone in the team can reach in time")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Create or join a team
    Team {
        #[command(subcommand)]
        command: TeamCommands,
    },
    /// Manage your saved starting points within a team
    Locations {
        #[command(subcommand)]
        command: LocationsCommands,
    },
    /// Resolve an address to coordinates
    Geocode {
        address: String,
    },
    /// Find meeting places reachable by every member within the budget
    Find {
        #[command(flatten)]
        member: MemberArgs,
        /// driving, transit, or walking
        #[arg(long, default_value = "driving")]
        mode: TransportMode,
        /// Maximum one-way travel time in minutes
        #[arg(long, default_value = "30")]
        budget: u32,
        /// Category name (dining, hotel, ...) or six-digit POI type code
        #[arg(long, default_value = "dining")]
        category: VenueCategory,
        /// Rank by the worst traveler's time (max) or the group average (avg)
        #[arg(long, default_value = "max")]
        rank_by: RankBy,
        /// Search radius around each origin, in meters
        #[arg(long, default_value_t = DEFAULT_RADIUS_METERS)]
        radius: u32,
        #[arg(long, default_value = "")]
        keyword: String,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("meetpoint-cli: run with --help to list commands");
        return Ok(());
    };

    let config = meetpoint_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Db { command } => run_db(&config, command).await,
        Commands::Team { command } => {
            let pool = connect(&config).await?;
            team::run(&pool, command).await
        }
        Commands::Locations { command } => {
            let pool = connect(&config).await?;
            let store: Arc<dyn LocationStore> = Arc::new(PgLocationStore::new(pool));
            let amap = AmapClient::from_app_config(&config)?;
            locations::run(store, &amap, command).await
        }
        Commands::Geocode { address } => {
            let amap = AmapClient::from_app_config(&config)?;
            run_geocode(&amap, &address).await
        }
        Commands::Find {
            member,
            mode,
            budget,
            category,
            rank_by,
            radius,
            keyword,
            json,
        } => {
            let pool = connect(&config).await?;
            let store: Arc<dyn LocationStore> = Arc::new(PgLocationStore::new(pool));
            let amap = Arc::new(AmapClient::from_app_config(&config)?);
            let planner = MeetingPlanner::new(amap.clone(), amap, store)
                .with_max_concurrency(config.provider_max_concurrency);

            let mut request = FindRequest::new(mode, budget, category, rank_by);
            request.radius_meters = radius;
            request.keyword = keyword;

            find::run_find(&planner, &member.session(), &request, json).await
        }
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = meetpoint_db::PoolConfig::from_app_config(config);
    Ok(meetpoint_db::connect_pool(&config.database_url, pool_config).await?)
}

async fn run_db(config: &AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    match command {
        DbCommands::Ping => {
            meetpoint_db::ping(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = meetpoint_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}

async fn run_geocode(geocoder: &dyn Geocoder, address: &str) -> anyhow::Result<()> {
    let location = meetpoint_planner::locate_address(geocoder, address).await?;
    println!(
        "{:.6},{:.6}  {}",
        location.lat, location.lng, location.address
    );
    Ok(())
}
