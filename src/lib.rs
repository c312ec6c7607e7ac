//! Workout log: validated running/cycling entries with derived pace and speed,
//! kept in an ordered in-memory store and flushed to a durable key-value slot.

pub mod app;
pub mod cli;
pub mod database;
pub mod error;
pub mod gpx;
pub mod kv;
pub mod persistence;
pub mod position;
pub mod record;
pub mod store;
pub mod types;
pub mod utils;
pub mod workout;

pub use app::App;
pub use error::{AppError, CorruptRecordError, StoreError, ValidationError};
pub use store::{RestoreReport, WorkoutStore};
pub use types::{Coords, WorkoutId, WorkoutKind};
pub use workout::{Activity, Workout, WorkoutInput};
