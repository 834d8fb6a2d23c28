//! # Drone Service
//!
//! Application layer around the movement planner. Each operation runs the
//! "load, validate, plan, persist" sequence while holding one lock over the
//! registry and the history sink, so two requests can never interleave a
//! read-modify-write of the same drone, and occupancy checks always see every
//! committed move.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::DroneError;
use crate::field::{validate_bounds, validate_position};
use crate::history::{HistoryEntry, HistorySink};
use crate::planner::plan_move;
use crate::registry::{DroneRecord, DroneStore};
use crate::types::{Direction, DroneState, Position};

/// What a successful move reports back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub id: Uuid,
    pub state: DroneState,
    pub details: Vec<String>,
}

struct Inner<S, H> {
    store: S,
    history: H,
}

pub struct DroneService<S, H> {
    inner: Mutex<Inner<S, H>>,
}

impl<S: DroneStore, H: HistorySink> DroneService<S, H> {
    pub fn new(store: S, history: H) -> Self {
        Self {
            inner: Mutex::new(Inner { store, history }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S, H>> {
        // State is only mutated once every check of a request has passed.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a drone at `(x, y)`; `direction` is matched case-insensitively.
    pub fn register(&self, x: i32, y: i32, direction: &str) -> Result<DroneRecord, DroneError> {
        let facing: Direction = direction.parse()?;
        validate_bounds(x, y)?;
        let state = DroneState::new(x, y, facing);

        let mut inner = self.lock();
        if inner.store.is_occupied(state.position, None) {
            warn!(x, y, "registration rejected, cell occupied");
            return Err(DroneError::PositionTaken);
        }

        let id = Uuid::new_v4();
        inner
            .history
            .start(id, HistoryEntry::new(id, state, Vec::new()))?;
        inner.store.insert(id, state);

        info!(drone = %id, x, y, facing = %facing, "drone registered");
        Ok(DroneRecord { id, state })
    }

    pub fn move_drone(&self, id: Uuid, x: i32, y: i32) -> Result<MoveOutcome, DroneError> {
        let mut inner = self.lock();
        let current = inner.store.get(id).ok_or(DroneError::NotFound(id))?;

        let target = Position::new(x, y);
        validate_position(target)?;
        if current.position == target {
            return Err(DroneError::NoMovement);
        }
        if inner.store.is_occupied(target, Some(id)) {
            warn!(drone = %id, x, y, "move rejected, destination occupied");
            return Err(DroneError::DestinationOccupied);
        }

        let plan = plan_move(current, target);
        let state = plan.final_state();
        let details = plan.details();
        debug!(drone = %id, events = plan.trace.len(), "move planned");

        inner
            .history
            .append(id, HistoryEntry::new(id, state, details.clone()))?;
        inner.store.update(id, state)?;

        info!(
            drone = %id,
            from = %current.position,
            to = %state.position,
            facing = %state.facing,
            "drone moved"
        );
        Ok(MoveOutcome { id, state, details })
    }

    pub fn get(&self, id: Uuid) -> Result<DroneRecord, DroneError> {
        let inner = self.lock();
        let state = inner.store.get(id).ok_or(DroneError::NotFound(id))?;
        Ok(DroneRecord { id, state })
    }

    pub fn history(&self, id: Uuid) -> Result<Vec<HistoryEntry>, DroneError> {
        self.lock().history.load(id)
    }

    pub fn list(&self) -> Vec<DroneRecord> {
        self.lock().store.list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistory;
    use crate::registry::Registry;

    fn service() -> DroneService<Registry, MemoryHistory> {
        DroneService::new(Registry::new(), MemoryHistory::new())
    }

    #[test]
    fn register_normalises_direction() {
        let svc = service();
        let record = svc.register(5, 5, "North").unwrap();
        assert_eq!(record.state, DroneState::new(5, 5, Direction::North));
        assert_eq!(svc.get(record.id).unwrap(), record);
    }

    #[test]
    fn register_rejects_taken_cell() {
        let svc = service();
        svc.register(5, 5, "NORTH").unwrap();
        let err = svc.register(5, 5, "EAST").unwrap_err();
        assert!(matches!(err, DroneError::PositionTaken));
        assert_eq!(err.to_string(), "Another drone already exists in this position");
        assert_eq!(svc.list().len(), 1);
    }

    #[test]
    fn register_rejects_bad_input() {
        let svc = service();
        assert!(matches!(
            svc.register(10, 0, "NORTH"),
            Err(DroneError::OutOfBounds(_))
        ));
        assert!(matches!(
            svc.register(0, 0, "UP"),
            Err(DroneError::InvalidDirection(_))
        ));
        assert!(svc.list().is_empty());
    }

    #[test]
    fn register_checks_direction_before_bounds() {
        let svc = service();
        let err = svc.register(10, 0, "UP").unwrap_err();
        assert!(matches!(err, DroneError::InvalidDirection(_)));
        assert_eq!(err.title(), "Validation Failed");
    }

    #[test]
    fn move_updates_state_and_history() {
        let svc = service();
        let id = svc.register(5, 5, "SOUTH").unwrap().id;

        let outcome = svc.move_drone(id, 5, 7).unwrap();
        assert_eq!(outcome.state, DroneState::new(5, 7, Direction::North));
        assert_eq!(outcome.details.len(), 3);

        assert_eq!(svc.get(id).unwrap().state, outcome.state);
        let history = svc.history(id).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].details.is_empty());
        assert_eq!(history[1].details, outcome.details);
    }

    #[test]
    fn move_to_same_cell_is_rejected_before_planning() {
        let svc = service();
        let id = svc.register(5, 5, "NORTH").unwrap().id;
        let err = svc.move_drone(id, 5, 5).unwrap_err();
        assert!(matches!(err, DroneError::NoMovement));
        assert_eq!(svc.history(id).unwrap().len(), 1);
    }

    #[test]
    fn move_off_the_field_is_rejected() {
        let svc = service();
        let id = svc.register(0, 0, "NORTH").unwrap().id;
        assert!(matches!(
            svc.move_drone(id, -1, 0),
            Err(DroneError::OutOfBounds(_))
        ));
        assert_eq!(svc.get(id).unwrap().state, DroneState::new(0, 0, Direction::North));
    }

    #[test]
    fn move_onto_another_drone_is_rejected() {
        let svc = service();
        let id = svc.register(5, 5, "NORTH").unwrap().id;
        svc.register(7, 7, "WEST").unwrap();
        let err = svc.move_drone(id, 7, 7).unwrap_err();
        assert!(matches!(err, DroneError::DestinationOccupied));
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn unknown_drone_is_not_found() {
        let svc = service();
        let id = Uuid::new_v4();
        assert!(matches!(svc.move_drone(id, 1, 1), Err(DroneError::NotFound(_))));
        assert!(matches!(svc.get(id), Err(DroneError::NotFound(_))));
        assert!(matches!(svc.history(id), Err(DroneError::HistoryNotFound(_))));
    }
}
