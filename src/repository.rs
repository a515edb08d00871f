//! Translation of organisation and location operations into SQL.
//!
//! Every function takes the caller's session as its unit of work. Writes run
//! in their own transaction which is committed before the function returns;
//! the written row is then read back so generated columns are populated.
//! Store failures are not caught here.

use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use crate::error::Result;
use crate::model::{BoundingBox, Location, LocationSummary, Organisation};

const SELECT_ORGANISATION: &str = "select id, name from organisation";
const SELECT_LOCATION: &str =
    "select id, organisation_id, location_name, longitude, latitude from location";
const SELECT_LOCATION_SUMMARY: &str =
    "select location_name, longitude, latitude from location where organisation_id = ?1";

fn organisation_from_row(row: &Row<'_>) -> rusqlite::Result<Organisation> {
    Ok(Organisation { id: row.get(0)?, name: row.get(1)? })
}

fn location_from_row(row: &Row<'_>) -> rusqlite::Result<Location> {
    Ok(Location {
        id: row.get(0)?,
        organisation_id: row.get(1)?,
        location_name: row.get(2)?,
        longitude: row.get(3)?,
        latitude: row.get(4)?,
    })
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<LocationSummary> {
    Ok(LocationSummary { location_name: row.get(0)?, longitude: row.get(1)?, latitude: row.get(2)? })
}

pub fn create_organisation(name: &str, session: &Connection) -> Result<Organisation> {
    let tx = session.unchecked_transaction()?;
    tx.execute("insert into organisation (name) values (?1)", params![name])?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    let organisation = session.query_row(
        &format!("{SELECT_ORGANISATION} where id = ?1"),
        params![id],
        organisation_from_row,
    )?;
    info!(id = organisation.id, name = %organisation.name, "organisation created");
    Ok(organisation)
}

/// All organisations, in whatever order the store returns them.
pub fn get_organisations(session: &Connection) -> Result<Vec<Organisation>> {
    let mut statement = session.prepare(SELECT_ORGANISATION)?;
    let organisations = statement
        .query_map([], organisation_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    debug!(count = organisations.len(), "organisations listed");
    Ok(organisations)
}

/// `None` when no organisation has this id.
pub fn get_organisation_by_id(organisation_id: i64, session: &Connection) -> Result<Option<Organisation>> {
    let organisation = session
        .query_row(
            &format!("{SELECT_ORGANISATION} where id = ?1"),
            params![organisation_id],
            organisation_from_row,
        )
        .optional()?;
    Ok(organisation)
}

/// Existence of the organisation is left to the store's foreign key.
pub fn create_location(
    organisation_id: i64,
    location_name: &str,
    longitude: f64,
    latitude: f64,
    session: &Connection,
) -> Result<Location> {
    let tx = session.unchecked_transaction()?;
    tx.execute(
        "insert into location (organisation_id, location_name, longitude, latitude) values (?1, ?2, ?3, ?4)",
        params![organisation_id, location_name, longitude, latitude],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    let location = session.query_row(&format!("{SELECT_LOCATION} where id = ?1"), params![id], location_from_row)?;
    info!(id = location.id, organisation_id, name = %location.location_name, "location created");
    Ok(location)
}

/// Name and coordinates of an organisation's locations, optionally limited to
/// those inside `bounding_box` (edges included).
pub fn get_locations_by_organisation_id(
    organisation_id: i64,
    bounding_box: Option<BoundingBox>,
    session: &Connection,
) -> Result<Vec<LocationSummary>> {
    let locations = match bounding_box {
        None => {
            let mut statement = session.prepare(SELECT_LOCATION_SUMMARY)?;
            statement
                .query_map(params![organisation_id], summary_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?
        }
        Some(bbox) => {
            let mut statement = session.prepare(&format!(
                "{SELECT_LOCATION_SUMMARY}
                    and latitude >= ?2 and latitude <= ?3
                    and longitude >= ?4 and longitude <= ?5"
            ))?;
            statement
                .query_map(
                    params![organisation_id, bbox.min_lat, bbox.max_lat, bbox.min_lon, bbox.max_lon],
                    summary_from_row,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?
        }
    };
    debug!(organisation_id, ?bounding_box, count = locations.len(), "locations listed");
    Ok(locations)
}
