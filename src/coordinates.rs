// 📍 Region Coordinates
// Opaque region → point lookup consumed by map layers.
//
// File format: { "ADELAIDE": { "lat": -34.93, "lng": 138.60 }, ... }

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Squared distance in degrees; only used to compare candidates.
    pub fn distance_sq(&self, lat: f64, lng: f64) -> f64 {
        (self.lat - lat).powi(2) + (self.lng - lng).powi(2)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoordinateLookup {
    points: HashMap<String, Coordinate>,
}

impl CoordinateLookup {
    pub fn empty() -> Self {
        CoordinateLookup::default()
    }

    pub fn from_points(points: HashMap<String, Coordinate>) -> Self {
        CoordinateLookup { points }
    }

    /// Load the lookup; an absent file is an empty lookup.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CoordinateLookup::empty()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read coordinates: {:?}", path))
            }
        };

        let points: HashMap<String, Coordinate> =
            serde_json::from_str(&content).context("Failed to parse coordinates JSON")?;
        Ok(CoordinateLookup { points })
    }

    pub fn get(&self, region: &str) -> Option<Coordinate> {
        self.points.get(region).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Nearest region to a point among those accepted by `filter`.
    /// Equal distances resolve to the lexicographically smaller name.
    pub fn nearest<F>(&self, lat: f64, lng: f64, filter: F) -> Option<(&str, Coordinate)>
    where
        F: Fn(&str) -> bool,
    {
        self.points
            .iter()
            .filter(|(name, _)| filter(name.as_str()))
            .map(|(name, c)| (name.as_str(), *c, c.distance_sq(lat, lng)))
            .filter(|(_, _, d)| d.is_finite())
            .min_by(|a, b| a.2.total_cmp(&b.2).then_with(|| a.0.cmp(&b.0)))
            .map(|(name, c, _)| (name, c))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn lookup() -> CoordinateLookup {
        let mut points = HashMap::new();
        points.insert("ADELAIDE".to_string(), Coordinate { lat: -34.93, lng: 138.60 });
        points.insert("GLENELG".to_string(), Coordinate { lat: -34.98, lng: 138.51 });
        points.insert("SALISBURY".to_string(), Coordinate { lat: -34.76, lng: 138.64 });
        CoordinateLookup::from_points(points)
    }

    #[test]
    fn test_nearest() {
        let lookup = lookup();
        let (name, _) = lookup.nearest(-34.97, 138.52, |_| true).unwrap();
        assert_eq!(name, "GLENELG");
    }

    #[test]
    fn test_nearest_respects_filter() {
        let lookup = lookup();
        let (name, _) = lookup
            .nearest(-34.97, 138.52, |n| n != "GLENELG")
            .unwrap();
        assert_eq!(name, "ADELAIDE");
    }

    #[test]
    fn test_nearest_empty() {
        assert!(CoordinateLookup::empty().nearest(0.0, 0.0, |_| true).is_none());
    }

    #[test]
    fn test_from_file_missing_is_empty() {
        let dir = tempdir().unwrap();
        let lookup = CoordinateLookup::from_file(&dir.path().join("none.json")).unwrap();
        assert!(lookup.is_empty());
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("coords.json");
        fs::write(&path, r#"{"ADELAIDE": {"lat": -34.93, "lng": 138.6}}"#).unwrap();

        let lookup = CoordinateLookup::from_file(&path).unwrap();
        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup.get("ADELAIDE").unwrap().lng, 138.6);
    }

    #[test]
    fn test_from_file_bad_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("coords.json");
        fs::write(&path, "not json").unwrap();
        assert!(CoordinateLookup::from_file(&path).is_err());
    }
}
