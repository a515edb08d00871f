//! Domain records and request bodies.
//!
//! Identifiers are SQLite rowids and therefore `i64`. Field names match the
//! JSON payloads exchanged over HTTP, except for [`LocationSummary`] whose
//! coordinates are prefixed with `location_` on the wire.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named owner of zero or more locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organisation {
    pub id: i64,
    pub name: String,
}

/// A named point belonging to exactly one organisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub organisation_id: i64,
    pub location_name: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// Name and coordinates of a location, as returned by the locations listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSummary {
    pub location_name: String,
    #[serde(rename = "location_longitude")]
    pub longitude: f64,
    #[serde(rename = "location_latitude")]
    pub latitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrganisation {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLocation {
    pub organisation_id: i64,
    pub location_name: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// Closed rectangle `[min_lat, max_lat] x [min_lon, max_lon]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

#[derive(Error, Debug, PartialEq)]
pub enum BoundingBoxError {
    #[error("bounding_box needs 4 numbers (min_lat, min_lon, max_lat, max_lon), got {0}")]
    WrongArity(usize),
    #[error("bounding_box value is not a finite number: {0:?}")]
    NotANumber(String),
    #[error("bounding_box must be one comma separated value or repeated once per number, not both")]
    MixedForms,
}

impl BoundingBox {
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self { min_lat, min_lon, max_lat, max_lon }
    }

    /// Picks `bounding_box` out of decoded query pairs.
    ///
    /// Accepts a single comma separated value (`bounding_box=10,10,25,25`) as
    /// well as the key repeated once per number, but not a mix of the two.
    /// Returns `Ok(None)` when the key is absent.
    pub fn from_query(pairs: &[(String, String)]) -> Result<Option<Self>, BoundingBoxError> {
        let values: Vec<&str> = pairs
            .iter()
            .filter(|(key, _)| key == "bounding_box")
            .map(|(_, value)| value.as_str())
            .collect();
        if values.is_empty() {
            return Ok(None);
        }
        if values.len() > 1 && values.iter().any(|value| value.contains(',')) {
            return Err(BoundingBoxError::MixedForms);
        }
        let mut numbers = Vec::with_capacity(4);
        for value in values {
            for part in value.split(',') {
                let part = part.trim();
                let number: f64 = part
                    .parse()
                    .map_err(|_| BoundingBoxError::NotANumber(part.to_string()))?;
                if !number.is_finite() {
                    return Err(BoundingBoxError::NotANumber(part.to_string()));
                }
                numbers.push(number);
            }
        }
        match numbers[..] {
            [min_lat, min_lon, max_lat, max_lon] => Ok(Some(Self::new(min_lat, min_lon, max_lat, max_lon))),
            _ => Err(BoundingBoxError::WrongArity(numbers.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn absent_key_means_no_filter() {
        let got = BoundingBox::from_query(&pairs(&[("other", "1")])).unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn comma_separated_and_repeated_forms_agree() {
        let csv = BoundingBox::from_query(&pairs(&[("bounding_box", "10, 10,25,25")])).unwrap();
        let repeated = BoundingBox::from_query(&pairs(&[
            ("bounding_box", "10"),
            ("bounding_box", "10"),
            ("bounding_box", "25"),
            ("bounding_box", "25"),
        ]))
        .unwrap();
        assert_eq!(csv, Some(BoundingBox::new(10.0, 10.0, 25.0, 25.0)));
        assert_eq!(csv, repeated);
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let err = BoundingBox::from_query(&pairs(&[("bounding_box", "1,2,3")])).unwrap_err();
        assert_eq!(err, BoundingBoxError::WrongArity(3));
        let err = BoundingBox::from_query(&pairs(&[("bounding_box", "1,2,3,4,5")])).unwrap_err();
        assert_eq!(err, BoundingBoxError::WrongArity(5));
    }

    #[test]
    fn empty_parts_are_not_skipped() {
        for raw in ["", "10,,10,25,25", "10,10,25,25,", ",10,10,25,25"] {
            let err = BoundingBox::from_query(&pairs(&[("bounding_box", raw)])).unwrap_err();
            assert_eq!(err, BoundingBoxError::NotANumber(String::new()), "{raw:?}");
        }
    }

    #[test]
    fn comma_and_repeated_forms_do_not_mix() {
        let err = BoundingBox::from_query(&pairs(&[("bounding_box", "10,10"), ("bounding_box", "25,25")]))
            .unwrap_err();
        assert_eq!(err, BoundingBoxError::MixedForms);
    }

    #[test]
    fn non_numbers_are_rejected() {
        let err = BoundingBox::from_query(&pairs(&[("bounding_box", "1,2,x,4")])).unwrap_err();
        assert_eq!(err, BoundingBoxError::NotANumber("x".into()));
        let err = BoundingBox::from_query(&pairs(&[("bounding_box", "1,2,NaN,4")])).unwrap_err();
        assert_eq!(err, BoundingBoxError::NotANumber("NaN".into()));
    }

    #[test]
    fn summary_uses_prefixed_coordinate_names() {
        let summary = LocationSummary { location_name: "A".into(), longitude: 1.5, latitude: -2.0 };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"location_name": "A", "location_longitude": 1.5, "location_latitude": -2.0})
        );
    }
}
