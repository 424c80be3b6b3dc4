//! Geography types: administrative divisions and map coordinates.

use serde::{Deserialize, Serialize};

/// First-level administrative division (a Brazilian state).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    /// Stable selection key, e.g. "SP"
    pub code: String,
    pub name: String,
}

impl Division {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Second-level administrative division (a city) inside a [`Division`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubDivision {
    pub id: u64,
    pub name: String,
}

impl SubDivision {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Selection key: the decimal id, as submitted in the `city` field
    pub fn code(&self) -> String {
        self.id.to_string()
    }
}

/// Geographic point (lat/lon)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are inside the WGS84 ranges
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

impl std::str::FromStr for Coordinate {
    type Err = String;

    /// Parse "lat,lon"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|e| format!("invalid coordinate '{}': {}", s, e))?;

        match parts.as_slice() {
            [lat, lon] => {
                let coord = Coordinate::new(*lat, *lon);
                if coord.is_valid() {
                    Ok(coord)
                } else {
                    Err(format!("coordinate out of range: {}", s))
                }
            }
            _ => Err(format!("expected 'lat,lon', got '{}'", s)),
        }
    }
}
