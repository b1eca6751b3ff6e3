use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `[lat, lng]` in degrees, serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(c: Coords) -> Self {
        [c.lat, c.lng]
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

impl FromStr for Coords {
    type Err = String;

    /// Parses `LAT,LNG`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LNG, got {s:?}"))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|e| format!("bad latitude {lat:?}: {e}"))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|e| format!("bad longitude {lng:?}: {e}"))?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(format!("coordinate out of range: {lat},{lng}"));
        }
        Ok(Self { lat, lng })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" => Ok(Self::Running),
            "cycling" => Ok(Self::Cycling),
            other => Err(format!("unknown workout type: {other:?}")),
        }
    }
}

/// Kind-specific inputs plus the value derived from them.
///
/// Flattened into [`Workout`] so the snapshot carries `type` next to the
/// common fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutDetails {
    Running {
        /// steps/min
        cadence: u32,
        /// min/km
        #[serde(default)]
        pace: f64,
    },
    Cycling {
        /// meters, may be negative
        #[serde(rename = "elevationGain")]
        elevation_gain: f64,
        /// km/h
        #[serde(default)]
        speed: f64,
    },
}

impl WorkoutDetails {
    pub const fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

/// One logged session, in the exact shape of a snapshot entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub clicks: u32,
    pub coords: Coords,
    /// km
    pub distance: f64,
    /// minutes
    pub duration: f64,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub details: WorkoutDetails,
}

impl Workout {
    pub const fn kind(&self) -> WorkoutKind {
        self.details.kind()
    }
}

/// Values of the entry form.
///
/// Both metric fields exist on the form; only the one matching `kind` is
/// read on submit.
#[derive(Debug, Clone, PartialEq)]
pub struct FormFields {
    pub kind: WorkoutKind,
    pub distance: f64,
    pub duration: f64,
    pub cadence: Option<f64>,
    pub elevation_gain: Option<f64>,
}

impl FormFields {
    pub const fn running(distance: f64, duration: f64, cadence: f64) -> Self {
        Self {
            kind: WorkoutKind::Running,
            distance,
            duration,
            cadence: Some(cadence),
            elevation_gain: None,
        }
    }

    pub const fn cycling(distance: f64, duration: f64, elevation_gain: f64) -> Self {
        Self {
            kind: WorkoutKind::Cycling,
            distance,
            duration,
            cadence: None,
            elevation_gain: Some(elevation_gain),
        }
    }

    /// Write-back of a stored record into the form, as done when entering
    /// edit mode.
    pub fn from_workout(w: &Workout) -> Self {
        let (cadence, elevation_gain) = match w.details {
            WorkoutDetails::Running { cadence, .. } => (Some(f64::from(cadence)), None),
            WorkoutDetails::Cycling { elevation_gain, .. } => (None, Some(elevation_gain)),
        };
        Self {
            kind: w.kind(),
            distance: w.distance,
            duration: w.duration,
            cadence,
            elevation_gain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortCriterion {
    Distance,
    Duration,
}

impl FromStr for SortCriterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distance" => Ok(Self::Distance),
            "duration" => Ok(Self::Duration),
            other => Err(format!("unknown sort criterion: {other:?}")),
        }
    }
}

/// Where the single entry form currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Idle,
    /// A map location was chosen; the form creates a new record there.
    Placing { coords: Coords },
    /// The form is bound to an existing record.
    Editing { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_parse() {
        assert_eq!("40.0,-73.0".parse::<Coords>(), Ok(Coords::new(40.0, -73.0)));
        assert_eq!(" 1.5 , 2 ".parse::<Coords>(), Ok(Coords::new(1.5, 2.0)));
        assert!("40.0".parse::<Coords>().is_err());
        assert!("91,0".parse::<Coords>().is_err());
        assert!("a,b".parse::<Coords>().is_err());
    }

    #[test]
    fn coords_serialize_as_pair() {
        let json = serde_json::to_string(&Coords::new(1.5, -2.0)).unwrap();
        assert_eq!(json, "[1.5,-2.0]");
        let back: Coords = serde_json::from_str("[3,4]").unwrap();
        assert_eq!(back, Coords::new(3.0, 4.0));
    }

    #[test]
    fn kind_and_sort_names() {
        assert_eq!("Running".parse::<WorkoutKind>(), Ok(WorkoutKind::Running));
        assert_eq!(WorkoutKind::Cycling.to_string(), "cycling");
        assert!("swimming".parse::<WorkoutKind>().is_err());
        assert_eq!("duration".parse::<SortCriterion>(), Ok(SortCriterion::Duration));
    }

    #[test]
    fn form_write_back_uses_matching_metric() {
        let w = Workout {
            id: "1".into(),
            date: Utc::now(),
            clicks: 0,
            coords: Coords::new(0.0, 0.0),
            distance: 5.0,
            duration: 25.0,
            description: String::new(),
            details: WorkoutDetails::Running {
                cadence: 180,
                pace: 5.0,
            },
        };
        assert_eq!(FormFields::from_workout(&w), FormFields::running(5.0, 25.0, 180.0));
    }
}
