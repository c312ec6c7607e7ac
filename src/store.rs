use std::collections::HashSet;

use serde_json::Value as JsonValue;

use crate::error::{CorruptRecordError, RecordFault, StoreError};
use crate::record::{from_record, record_id};
use crate::types::WorkoutId;
use crate::workout::Workout;

/// Outcome of [`WorkoutStore::restore`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RestoreReport {
    pub restored: usize,
    pub skipped: Vec<CorruptRecordError>,
}

/// Workouts of the current session, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct WorkoutStore {
    items: Vec<Workout>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, workout: Workout) -> Result<(), StoreError> {
        if self.position(workout.id()).is_some() {
            return Err(StoreError::DuplicateId(workout.id().to_string()));
        }
        self.items.push(workout);
        Ok(())
    }

    pub fn remove(&mut self, id: &WorkoutId) -> Result<Workout, StoreError> {
        let idx = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(self.items.remove(idx))
    }

    pub fn find(&self, id: &WorkoutId) -> Option<&Workout> {
        self.items.iter().find(|w| w.id() == id)
    }

    /// Record one interaction with the workout and return it.
    pub fn visit(&mut self, id: &WorkoutId) -> Result<&Workout, StoreError> {
        let w = self
            .items
            .iter_mut()
            .find(|w| w.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        w.visit();
        Ok(w)
    }

    pub fn all(&self) -> &[Workout] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the contents with workouts rebuilt from `records`.
    ///
    /// Unusable records are skipped and reported; the rest keep their order.
    pub fn restore(&mut self, records: &[JsonValue]) -> RestoreReport {
        let mut items = Vec::with_capacity(records.len());
        let mut seen: HashSet<WorkoutId> = HashSet::with_capacity(records.len());
        let mut skipped = Vec::new();

        for (index, raw) in records.iter().enumerate() {
            let result = from_record(raw).and_then(|w| {
                if seen.insert(w.id().clone()) {
                    Ok(w)
                } else {
                    Err(RecordFault::DuplicateId(w.id().to_string()))
                }
            });

            match result {
                Ok(w) => items.push(w),
                Err(fault) => {
                    let err = CorruptRecordError {
                        index,
                        id: record_id(raw),
                        fault,
                    };
                    tracing::warn!(err = %err, "skipping corrupt workout record");
                    skipped.push(err);
                }
            }
        }

        self.items = items;
        tracing::info!(
            restored = self.items.len(),
            skipped = skipped.len(),
            "workouts restored"
        );

        RestoreReport {
            restored: self.items.len(),
            skipped,
        }
    }

    fn position(&self, id: &WorkoutId) -> Option<usize> {
        self.items.iter().position(|w| w.id() == id)
    }
}
