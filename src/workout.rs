use chrono::{DateTime, Datelike, Local, TimeZone, Utc};

use crate::error::ValidationError;
use crate::types::{Coords, WorkoutId, WorkoutKind};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Raw numeric input for a new workout, as extracted by the input source.
///
/// `extra` is the cadence for running and the elevation gain for cycling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutInput {
    pub kind: WorkoutKind,
    pub coords: Coords,
    pub distance: f64,
    pub duration: f64,
    pub extra: f64,
}

/// Variant-specific fields, including the derived metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activity {
    /// `pace` in min/km.
    Running { cadence: u32, pace: f64 },
    /// `elevation_gain` in m, `speed` in km/h.
    Cycling { elevation_gain: f64, speed: f64 },
}

impl Activity {
    pub const fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

/// A displayable value with its unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric {
    pub value: f64,
    pub unit: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    created_at: DateTime<Utc>,
    coords: Coords,
    distance: f64,
    duration: f64,
    description: String,
    clicks: u32,
    activity: Activity,
}

impl Workout {
    /// Create now; the description follows the local calendar date.
    pub fn create(input: WorkoutInput) -> Result<Self, ValidationError> {
        Self::create_at(input, &Local::now())
    }

    /// Validate `input` and derive the metric and description as of `at`.
    ///
    /// Month and day of the description are read in `at`'s own timezone.
    pub fn create_at<Tz: TimeZone>(
        input: WorkoutInput,
        at: &DateTime<Tz>,
    ) -> Result<Self, ValidationError> {
        let WorkoutInput {
            kind,
            coords,
            distance,
            duration,
            extra,
        } = input;

        positive("distance", distance)?;
        positive("duration", duration)?;

        let activity = match kind {
            WorkoutKind::Running => Activity::Running {
                cadence: cadence(extra)?,
                pace: derived("pace", duration / distance)?,
            },
            WorkoutKind::Cycling => Activity::Cycling {
                elevation_gain: non_negative("elevationGain", extra)?,
                speed: derived("speed", distance / (duration / 60.0))?,
            },
        };

        Ok(Self {
            id: WorkoutId::generate(),
            created_at: at.with_timezone(&Utc),
            coords,
            distance,
            duration,
            description: describe(kind, at),
            clicks: 0,
            activity,
        })
    }

    /// Reassemble a workout from persisted fields without re-deriving anything.
    ///
    /// Only the base invariants are checked; `description` and the derived
    /// metric inside `activity` are taken as stored.
    pub(crate) fn restored(
        id: WorkoutId,
        created_at: DateTime<Utc>,
        coords: Coords,
        distance: f64,
        duration: f64,
        description: String,
        activity: Activity,
    ) -> Result<Self, ValidationError> {
        positive("distance", distance)?;
        positive("duration", duration)?;
        match activity {
            Activity::Running { cadence, .. } => {
                positive("cadence", f64::from(cadence))?;
            }
            Activity::Cycling { elevation_gain, .. } => {
                non_negative("elevationGain", elevation_gain)?;
            }
        }

        Ok(Self {
            id,
            created_at,
            coords,
            distance,
            duration,
            description,
            clicks: 0,
            activity,
        })
    }

    pub const fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn coords(&self) -> Coords {
        self.coords
    }

    /// Kilometers.
    pub const fn distance(&self) -> f64 {
        self.distance
    }

    /// Minutes.
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn kind(&self) -> WorkoutKind {
        self.activity.kind()
    }

    pub const fn activity(&self) -> &Activity {
        &self.activity
    }

    pub const fn interaction_count(&self) -> u32 {
        self.clicks
    }

    pub const fn visit(&mut self) {
        self.clicks = self.clicks.saturating_add(1);
    }

    /// Pace for running, speed for cycling.
    pub const fn metric(&self) -> Metric {
        match self.activity {
            Activity::Running { pace, .. } => Metric {
                value: pace,
                unit: "min/km",
            },
            Activity::Cycling { speed, .. } => Metric {
                value: speed,
                unit: "km/h",
            },
        }
    }

    /// Cadence for running, elevation gain for cycling.
    pub fn extra_metric(&self) -> Metric {
        match self.activity {
            Activity::Running { cadence, .. } => Metric {
                value: f64::from(cadence),
                unit: "spm",
            },
            Activity::Cycling { elevation_gain, .. } => Metric {
                value: elevation_gain,
                unit: "m",
            },
        }
    }
}

/// e.g. "Running on April 14".
pub fn describe<Tz: TimeZone>(kind: WorkoutKind, at: &DateTime<Tz>) -> String {
    format!("{} on {} {}", kind.label(), MONTHS[at.month0() as usize], at.day())
}

/// Round to one decimal place, half away from zero.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Rounded metric; extreme but finite inputs can still overflow to infinity.
fn derived(field: &'static str, raw: f64) -> Result<f64, ValidationError> {
    let value = round1(raw);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotFinite { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field, value });
    }
    if value <= 0.0 {
        return Err(ValidationError::NotPositive { field, value });
    }
    Ok(value)
}

pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field, value });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    // -0.0 would otherwise survive as a distinct value
    Ok(value.abs())
}

pub(crate) fn cadence(value: f64) -> Result<u32, ValidationError> {
    let value = positive("cadence", value)?;
    if value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(ValidationError::NotWhole {
            field: "cadence",
            value,
        });
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(value as u32)
}
