//! Assembly of the origin set for one find run.

use std::collections::BTreeMap;

use meetpoint_core::{LocationSet, Point, Session, StoredLocation};
use serde::Serialize;

/// One origin as it participates in a single run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOrigin {
    /// `"{owner_id}#{n}"`, unique within the run.
    pub id: String,
    pub owner_id: String,
    pub location: Point,
    pub address: String,
    /// `true` for the requesting user's own origins.
    pub is_own: bool,
}

/// All of the requester's own origins followed by exactly one origin per
/// other team member.
///
/// For another member the row with the highest position is used: lists are
/// append-only, so that is the entry the member stored last. Members without
/// a usable row contribute nothing. Other members are ordered by user id so repeated runs
/// see the same origin order.
#[must_use]
pub fn assemble_origins(
    session: &Session,
    own: &LocationSet,
    team_rows: &[StoredLocation],
) -> Vec<RunOrigin> {
    let mut origins: Vec<RunOrigin> = own
        .entries()
        .iter()
        .enumerate()
        .map(|(i, e)| RunOrigin {
            id: format!("{}#{i}", session.user_id),
            owner_id: session.user_id.clone(),
            location: e.point(),
            address: e.address.clone(),
            is_own: true,
        })
        .collect();

    let mut latest: BTreeMap<&str, &StoredLocation> = BTreeMap::new();
    for row in team_rows {
        if row.user_id == session.user_id {
            continue;
        }
        if !row.point().is_valid() {
            tracing::debug!(user_id = %row.user_id, lat = row.lat, lng = row.lng, "skipping stored location with invalid coordinates");
            continue;
        }
        latest
            .entry(row.user_id.as_str())
            .and_modify(|current| {
                if row.position > current.position {
                    *current = row;
                }
            })
            .or_insert(row);
    }

    origins.extend(latest.into_values().map(|row| RunOrigin {
        id: format!("{}#0", row.user_id),
        owner_id: row.user_id.clone(),
        location: row.point(),
        address: row.address.clone(),
        is_own: false,
    }));

    origins
}
