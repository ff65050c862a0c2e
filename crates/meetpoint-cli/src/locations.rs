//! `locations` command handlers.
//!
//! Every mutation loads the member's stored list, applies the change through
//! [`PersistedLocations`], and writes the whole list back.

use std::sync::Arc;

use clap::{ArgGroup, Args, Subcommand};
use meetpoint_core::{Geocoder, Location, LocationSet, LocationStore, Point, Session};
use meetpoint_planner::{locate_address, resolve_typed_point, PersistedLocations};
use uuid::Uuid;

#[derive(Debug, Args)]
pub struct MemberArgs {
    #[arg(long)]
    pub team: Uuid,
    #[arg(long)]
    pub user: String,
}

impl MemberArgs {
    /// The user id is trimmed so every command addresses the same member.
    pub(crate) fn session(&self) -> Session {
        Session::new(self.team, self.user.trim())
    }
}

#[derive(Debug, Subcommand)]
pub enum LocationsCommands {
    /// Show your saved locations
    List {
        #[command(flatten)]
        member: MemberArgs,
    },
    /// Save a location by address, or by coordinates with --lat/--lng
    #[command(group(ArgGroup::new("source").required(true).args(["address", "lat"])))]
    Add {
        #[command(flatten)]
        member: MemberArgs,
        address: Option<String>,
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
    },
    /// Remove the location at INDEX (as shown by `list`)
    Remove {
        #[command(flatten)]
        member: MemberArgs,
        index: usize,
    },
    /// Make the location at INDEX your primary one
    Primary {
        #[command(flatten)]
        member: MemberArgs,
        index: usize,
    },
    /// Remove all of your saved locations
    Clear {
        #[command(flatten)]
        member: MemberArgs,
    },
}

pub(crate) async fn run(
    store: Arc<dyn LocationStore>,
    geocoder: &dyn Geocoder,
    command: LocationsCommands,
) -> anyhow::Result<()> {
    match command {
        LocationsCommands::List { member } => {
            let persisted = PersistedLocations::load(member.session(), store).await?;
            print_set(persisted.set());
        }
        LocationsCommands::Add {
            member,
            address,
            lat,
            lng,
        } => {
            let location = locate(geocoder, address.as_deref(), lat, lng).await?;
            let mut persisted = PersistedLocations::load(member.session(), store).await?;
            persisted.add(location.clone()).await?;
            println!("saved {}", describe(&location));
            print_set(persisted.set());
        }
        LocationsCommands::Remove { member, index } => {
            let mut persisted = PersistedLocations::load(member.session(), store).await?;
            let removed = persisted.remove(index).await?;
            println!("removed {}", describe(&removed));
            print_set(persisted.set());
        }
        LocationsCommands::Primary { member, index } => {
            let mut persisted = PersistedLocations::load(member.session(), store).await?;
            persisted.set_primary(index).await?;
            print_set(persisted.set());
        }
        LocationsCommands::Clear { member } => {
            let session = member.session();
            let owner = session.user_id.clone();
            PersistedLocations::new(session, LocationSet::new(owner), store)
                .clear()
                .await?;
            println!("all locations removed");
        }
    }
    Ok(())
}

/// Typed coordinates win over an address; zero on either axis is a real
/// coordinate here, not an unresolved click.
async fn locate(
    geocoder: &dyn Geocoder,
    address: Option<&str>,
    lat: Option<f64>,
    lng: Option<f64>,
) -> anyhow::Result<Location> {
    match (lat, lng, address) {
        (Some(lat), Some(lng), _) => Ok(resolve_typed_point(geocoder, Point::new(lat, lng)).await?),
        (_, _, Some(address)) => Ok(locate_address(geocoder, address).await?),
        _ => anyhow::bail!("pass an address or both --lat and --lng"),
    }
}

fn describe(location: &Location) -> String {
    format!(
        "{} ({:.6}, {:.6})",
        location.address, location.lat, location.lng
    )
}

fn format_set(set: &LocationSet) -> Vec<String> {
    set.entries()
        .iter()
        .enumerate()
        .map(|(i, location)| {
            let marker = if set.primary_index() == Some(i) { "*" } else { " " };
            format!("{marker} {i:<3} {}", describe(location))
        })
        .collect()
}

fn print_set(set: &LocationSet) {
    if set.is_empty() {
        println!("no locations saved; add one with `locations add`");
        return;
    }
    for line in format_set(set) {
        println!("{line}");
    }
}
