//! Flat JSON records: the on-disk shape of one workout.
//!
//! ```json
//! {"id":"…","date":"2024-04-14T09:30:00Z","coords":[10.0,10.0],
//!  "distance":5.0,"duration":25.0,"workoutType":"running",
//!  "description":"Running on April 14","cadence":178,"pace":5.0}
//! ```
//!
//! Cycling records carry `elevationGain` and `speed` instead of
//! `cadence` and `pace`. The visit counter is session-only and never written.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::RecordFault;
use crate::types::{Coords, WorkoutId, WorkoutKind};
use crate::workout::{self, Activity, Workout};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordRef<'a> {
    id: &'a WorkoutId,
    date: DateTime<Utc>,
    coords: Coords,
    distance: f64,
    duration: f64,
    workout_type: WorkoutKind,
    description: &'a str,
    #[serde(flatten)]
    metrics: MetricFields,
}

#[derive(Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
enum MetricFields {
    Running { cadence: u32, pace: f64 },
    Cycling { elevation_gain: f64, speed: f64 },
}

pub fn to_record(w: &Workout) -> Result<JsonValue, serde_json::Error> {
    let metrics = match *w.activity() {
        Activity::Running { cadence, pace } => MetricFields::Running { cadence, pace },
        Activity::Cycling {
            elevation_gain,
            speed,
        } => MetricFields::Cycling {
            elevation_gain,
            speed,
        },
    };

    let rec = RecordRef {
        id: w.id(),
        date: w.created_at(),
        coords: w.coords(),
        distance: w.distance(),
        duration: w.duration(),
        workout_type: w.kind(),
        description: w.description(),
        metrics,
    };

    serde_json::to_value(rec)
}

/// Best-effort id of a raw record, for error reporting.
pub fn record_id(raw: &JsonValue) -> Option<String> {
    raw.get("id").and_then(JsonValue::as_str).map(str::to_string)
}

pub fn from_record(raw: &JsonValue) -> Result<Workout, RecordFault> {
    let obj = raw.as_object().ok_or(RecordFault::NotAnObject)?;

    let kind_raw = obj
        .get("workoutType")
        .and_then(JsonValue::as_str)
        .ok_or(RecordFault::BadField("workoutType"))?;
    let kind: WorkoutKind = kind_raw
        .parse()
        .map_err(RecordFault::UnknownKind)?;

    let activity = match kind {
        WorkoutKind::Running => Activity::Running {
            cadence: workout::cadence(number(obj, "cadence")?)?,
            pace: derived(obj, "pace")?,
        },
        WorkoutKind::Cycling => Activity::Cycling {
            elevation_gain: number(obj, "elevationGain")?,
            speed: derived(obj, "speed")?,
        },
    };

    let id = obj
        .get("id")
        .and_then(JsonValue::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(RecordFault::BadField("id"))?;

    let date = obj
        .get("date")
        .and_then(JsonValue::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .ok_or(RecordFault::BadField("date"))?
        .with_timezone(&Utc);

    let coords = match obj.get("coords").and_then(JsonValue::as_array).map(Vec::as_slice) {
        Some([lat, lng]) => {
            let lat = lat.as_f64().ok_or(RecordFault::BadField("coords"))?;
            let lng = lng.as_f64().ok_or(RecordFault::BadField("coords"))?;
            Coords::new(lat, lng)?
        }
        _ => return Err(RecordFault::BadField("coords")),
    };

    let description = obj
        .get("description")
        .and_then(JsonValue::as_str)
        .ok_or(RecordFault::BadField("description"))?;

    Workout::restored(
        WorkoutId::from(id),
        date,
        coords,
        number(obj, "distance")?,
        number(obj, "duration")?,
        description.to_string(),
        activity,
    )
    .map_err(RecordFault::from)
}

fn number(obj: &Map<String, JsonValue>, field: &'static str) -> Result<f64, RecordFault> {
    obj.get(field)
        .and_then(JsonValue::as_f64)
        .ok_or(RecordFault::BadField(field))
}

/// Stored derived metric. Older snapshots kept pace as a fixed-point string.
fn derived(obj: &Map<String, JsonValue>, field: &'static str) -> Result<f64, RecordFault> {
    let v = match obj.get(field) {
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    v.filter(|v| v.is_finite()).ok_or(RecordFault::BadField(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::workout::WorkoutInput;
    use serde_json::json;

    fn running() -> Workout {
        Workout::create(WorkoutInput {
            kind: WorkoutKind::Running,
            coords: Coords::new(10.0, 10.0).unwrap(),
            distance: 5.0,
            duration: 25.0,
            extra: 178.0,
        })
        .unwrap()
    }

    fn cycling_record() -> JsonValue {
        json!({
            "id": "c-1",
            "date": "2024-04-14T09:30:00Z",
            "coords": [51.5, -0.12],
            "distance": 20.0,
            "duration": 60.0,
            "workoutType": "cycling",
            "description": "Cycling on April 14",
            "elevationGain": 230.0,
            "speed": 20.0
        })
    }

    #[test]
    fn record_is_flat_and_tagged() {
        let w = running();
        let rec = to_record(&w).unwrap();
        assert_eq!(rec["workoutType"], "running");
        assert_eq!(rec["cadence"], 178);
        assert_eq!(rec["pace"], 5.0);
        assert_eq!(rec["coords"], json!([10.0, 10.0]));
        assert_eq!(rec["id"], w.id().as_str());
        assert!(rec.get("elevationGain").is_none());
        assert!(rec.get("clicks").is_none());
    }

    #[test]
    fn stored_derived_fields_are_trusted() {
        let mut raw = cycling_record();
        // not what distance / duration would give
        raw["speed"] = json!(99.9);
        raw["description"] = json!("Cycling on New Year's Day");
        let w = from_record(&raw).unwrap();
        assert_eq!(w.metric().value, 99.9);
        assert_eq!(w.description(), "Cycling on New Year's Day");
        assert_eq!(w.id().as_str(), "c-1");
    }

    #[test]
    fn legacy_string_pace_is_accepted() {
        let raw = json!({
            "id": "1713087000",
            "date": "2024-04-14T09:30:00.000Z",
            "coords": [10, 10],
            "distance": 5,
            "duration": 30,
            "workoutType": "running",
            "description": "Running on April 14",
            "cadence": 178,
            "pace": "6.0",
            "clicks": 3
        });
        let w = from_record(&raw).unwrap();
        assert_eq!(w.metric().value, 6.0);
        assert_eq!(w.interaction_count(), 0);
    }

    #[test]
    fn discriminant_must_match_variant_fields() {
        let mut raw = cycling_record();
        raw["workoutType"] = json!("running");
        assert_eq!(from_record(&raw).unwrap_err(), RecordFault::BadField("cadence"));

        raw["workoutType"] = json!("swimming");
        assert_eq!(
            from_record(&raw).unwrap_err(),
            RecordFault::UnknownKind("swimming".to_string())
        );
    }

    #[test]
    fn base_invariants_are_revalidated() {
        let mut raw = cycling_record();
        raw["distance"] = json!(-3.0);
        assert_eq!(
            from_record(&raw).unwrap_err(),
            RecordFault::Invalid(ValidationError::NotPositive {
                field: "distance",
                value: -3.0
            })
        );

        let mut raw = cycling_record();
        raw["elevationGain"] = json!(-1.0);
        assert!(matches!(
            from_record(&raw).unwrap_err(),
            RecordFault::Invalid(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn rejects_malformed_shapes() {
        assert_eq!(from_record(&json!([1, 2])).unwrap_err(), RecordFault::NotAnObject);

        let mut raw = cycling_record();
        raw["coords"] = json!([1.0]);
        assert_eq!(from_record(&raw).unwrap_err(), RecordFault::BadField("coords"));

        let mut raw = cycling_record();
        raw["date"] = json!("yesterday");
        assert_eq!(from_record(&raw).unwrap_err(), RecordFault::BadField("date"));

        let mut raw = cycling_record();
        raw["elevationGain"] = json!("230");
        assert_eq!(
            from_record(&raw).unwrap_err(),
            RecordFault::BadField("elevationGain")
        );
    }
}
