use crate::error::{AppError, StoreError};
use crate::kv::KeyValueStore;
use crate::persistence::PersistenceGateway;
use crate::store::{RestoreReport, WorkoutStore};
use crate::types::WorkoutId;
use crate::workout::{Workout, WorkoutInput};

/// Session context: the workout store plus the gateway it is flushed through.
///
/// Every mutating call persists the full list before returning. If that save
/// fails the in-memory change stands and the next successful save catches up.
pub struct App<S> {
    store: WorkoutStore,
    gateway: PersistenceGateway<S>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(kv: S) -> Self {
        Self::with_gateway(PersistenceGateway::new(kv))
    }

    pub fn with_gateway(gateway: PersistenceGateway<S>) -> Self {
        Self {
            store: WorkoutStore::new(),
            gateway,
        }
    }

    /// Build an app and restore whatever the backend holds.
    pub fn open(kv: S) -> Result<(Self, RestoreReport), AppError> {
        let mut app = Self::new(kv);
        let report = app.load_persisted()?;
        Ok((app, report))
    }

    pub fn create_workout(&mut self, input: WorkoutInput) -> Result<&Workout, AppError> {
        let workout = Workout::create(input)?;
        let id = workout.id().clone();
        tracing::info!(
            id = %id,
            kind = %workout.kind(),
            distance = workout.distance(),
            duration = workout.duration(),
            "workout created"
        );
        self.store.add(workout)?;
        self.persist()?;
        self.store
            .find(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()).into())
    }

    pub fn delete_workout(&mut self, id: &WorkoutId) -> Result<Workout, AppError> {
        let removed = self.store.remove(id)?;
        tracing::info!(id = %id, "workout deleted");
        self.persist()?;
        Ok(removed)
    }

    pub fn list_workouts(&self) -> &[Workout] {
        self.store.all()
    }

    pub fn find(&self, id: &WorkoutId) -> Option<&Workout> {
        self.store.find(id)
    }

    /// Visits are session-only and do not trigger a save.
    pub fn visit(&mut self, id: &WorkoutId) -> Result<&Workout, AppError> {
        Ok(self.store.visit(id)?)
    }

    pub fn persist(&mut self) -> Result<(), AppError> {
        self.gateway.save(self.store.all())?;
        Ok(())
    }

    pub fn load_persisted(&mut self) -> Result<RestoreReport, AppError> {
        let records = self.gateway.load()?;
        Ok(self.store.restore(&records))
    }

    pub const fn gateway(&self) -> &PersistenceGateway<S> {
        &self.gateway
    }

    pub fn into_backend(self) -> S {
        self.gateway.into_backend()
    }
}
