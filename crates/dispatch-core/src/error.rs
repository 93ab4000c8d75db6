//! Input validation at the scheduling boundary.
//!
//! Everything past [`validate_inputs`] assumes well-formed records; the
//! scheduling loop itself has no failure modes.

use std::collections::HashSet;

use thiserror::Error;

use crate::models::{Coordinate, DroneSnapshot, PackageSnapshot};

#[derive(Debug, Error, PartialEq)]
pub enum DispatchError {
    #[error("{entity} {id:?} has invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate {
        entity: &'static str,
        id: String,
        lat: f64,
        lon: f64,
    },
    #[error("{entity} with empty id")]
    EmptyId { entity: &'static str },
    #[error("duplicate {entity} id {id:?}")]
    DuplicateId { entity: &'static str, id: String },
    #[error("invalid dispatch rules: {0}")]
    InvalidRules(String),
}

fn coordinate_is_valid(coord: &Coordinate) -> bool {
    coord.lat.is_finite()
        && coord.lon.is_finite()
        && (-90.0..=90.0).contains(&coord.lat)
        && (-180.0..=180.0).contains(&coord.lon)
}

pub fn validate_coordinate(
    entity: &'static str,
    id: &str,
    coord: &Coordinate,
) -> Result<(), DispatchError> {
    if coordinate_is_valid(coord) {
        Ok(())
    } else {
        Err(DispatchError::InvalidCoordinate {
            entity,
            id: id.to_string(),
            lat: coord.lat,
            lon: coord.lon,
        })
    }
}

fn check_id<'a>(
    entity: &'static str,
    id: &'a str,
    seen: &mut HashSet<&'a str>,
) -> Result<(), DispatchError> {
    if id.trim().is_empty() {
        return Err(DispatchError::EmptyId { entity });
    }
    if !seen.insert(id) {
        return Err(DispatchError::DuplicateId {
            entity,
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Reject malformed records before they reach the scheduler.
pub fn validate_inputs(
    depot: &Coordinate,
    drones: &[DroneSnapshot],
    packages: &[PackageSnapshot],
) -> Result<(), DispatchError> {
    validate_coordinate("depot", "depot", depot)?;

    let mut drone_ids = HashSet::with_capacity(drones.len());
    for drone in drones {
        check_id("drone", &drone.drone_id, &mut drone_ids)?;
        validate_coordinate("drone", &drone.drone_id, &drone.location)?;
        if let Some(dest) = &drone.active_destination {
            validate_coordinate("drone", &drone.drone_id, dest)?;
        }
    }

    let mut package_ids = HashSet::with_capacity(packages.len());
    for package in packages {
        check_id("package", &package.package_id, &mut package_ids)?;
        validate_coordinate("package", &package.package_id, &package.destination)?;
    }

    Ok(())
}
