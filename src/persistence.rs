use serde_json::Value as JsonValue;

use crate::dlog;
use crate::error::StorageError;
use crate::kv::KeyValueStore;
use crate::record::to_record;
use crate::workout::Workout;

pub const DEFAULT_SLOT: &str = "workouts";

/// Writes the whole workout list to one slot and reads it back untyped.
pub struct PersistenceGateway<S> {
    kv: S,
    key: String,
}

impl<S: KeyValueStore> PersistenceGateway<S> {
    pub fn new(kv: S) -> Self {
        Self::with_key(kv, DEFAULT_SLOT)
    }

    pub fn with_key(kv: S, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub const fn backend(&self) -> &S {
        &self.kv
    }

    pub const fn backend_mut(&mut self) -> &mut S {
        &mut self.kv
    }

    pub fn into_backend(self) -> S {
        self.kv
    }

    /// Replace the stored snapshot with `workouts`.
    pub fn save(&mut self, workouts: &[Workout]) -> Result<(), StorageError> {
        let records = workouts
            .iter()
            .map(to_record)
            .collect::<Result<Vec<_>, _>>()?;
        let body = serde_json::to_string(&records)?;
        self.kv.set(&self.key, &body)?;
        tracing::debug!(key = %self.key, workouts = records.len(), "snapshot saved");
        Ok(())
    }

    /// Raw records of the stored snapshot.
    ///
    /// A missing slot, unparseable JSON and a non-array value all read as empty;
    /// backend failures are returned.
    pub fn load(&self) -> Result<Vec<JsonValue>, StorageError> {
        let Some(body) = self.kv.get(&self.key)? else {
            dlog!("snapshot_absent key={}", self.key);
            return Ok(Vec::new());
        };

        match serde_json::from_str::<JsonValue>(&body) {
            Ok(JsonValue::Array(records)) => {
                tracing::debug!(key = %self.key, records = records.len(), "snapshot loaded");
                Ok(records)
            }
            Ok(JsonValue::Null) => Ok(Vec::new()),
            Ok(other) => {
                tracing::warn!(
                    key = %self.key,
                    found = json_type(&other),
                    "stored snapshot is not a list; treating as empty"
                );
                Ok(Vec::new())
            }
            Err(e) => {
                tracing::warn!(key = %self.key, err = %e, "stored snapshot is corrupt; treating as empty");
                Ok(Vec::new())
            }
        }
    }
}

const fn json_type(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
