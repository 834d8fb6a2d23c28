use crate::error::DroneError;
use crate::types::{DroneState, Position};
use uuid::Uuid;

/// A registered drone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DroneRecord {
    pub id: Uuid,
    pub state: DroneState,
}

/// Lookup and occupancy queries the service needs from drone storage.
pub trait DroneStore {
    fn get(&self, id: Uuid) -> Option<DroneState>;

    /// True if a drone other than `except` sits on `position`.
    fn is_occupied(&self, position: Position, except: Option<Uuid>) -> bool;

    fn insert(&mut self, id: Uuid, state: DroneState);

    fn update(&mut self, id: Uuid, state: DroneState) -> Result<(), DroneError>;

    /// All drones in registration order.
    fn list(&self) -> Vec<DroneRecord>;
}

/// In-memory drone storage, keeps registration order.
#[derive(Default)]
pub struct Registry {
    drones: Vec<DroneRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self { drones: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.drones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drones.is_empty()
    }

    fn find(&self, id: Uuid) -> Option<&DroneRecord> {
        self.drones.iter().find(|d| d.id == id)
    }
}

impl DroneStore for Registry {
    fn get(&self, id: Uuid) -> Option<DroneState> {
        self.find(id).map(|d| d.state)
    }

    fn is_occupied(&self, position: Position, except: Option<Uuid>) -> bool {
        self.drones
            .iter()
            .any(|d| d.state.position == position && Some(d.id) != except)
    }

    fn insert(&mut self, id: Uuid, state: DroneState) {
        self.drones.push(DroneRecord { id, state });
    }

    fn update(&mut self, id: Uuid, state: DroneState) -> Result<(), DroneError> {
        let record = self
            .drones
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(DroneError::NotFound(id))?;
        record.state = state;
        Ok(())
    }

    fn list(&self) -> Vec<DroneRecord> {
        self.drones.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    #[test]
    fn occupancy_ignores_the_moving_drone() {
        let mut registry = Registry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        registry.insert(a, DroneState::new(1, 1, Direction::North));
        registry.insert(b, DroneState::new(2, 2, Direction::East));

        assert!(registry.is_occupied(Position::new(1, 1), None));
        assert!(registry.is_occupied(Position::new(1, 1), Some(b)));
        assert!(!registry.is_occupied(Position::new(1, 1), Some(a)));
        assert!(!registry.is_occupied(Position::new(3, 3), None));
    }

    #[test]
    fn update_replaces_state_in_place() {
        let mut registry = Registry::new();
        let id = Uuid::new_v4();
        registry.insert(id, DroneState::new(0, 0, Direction::South));
        registry
            .update(id, DroneState::new(4, 0, Direction::East))
            .unwrap();

        assert_eq!(registry.get(id), Some(DroneState::new(4, 0, Direction::East)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn update_of_unknown_drone_fails() {
        let mut registry = Registry::new();
        let id = Uuid::new_v4();
        let err = registry
            .update(id, DroneState::new(0, 0, Direction::North))
            .unwrap_err();
        assert!(matches!(err, DroneError::NotFound(missing) if missing == id));
    }

    #[test]
    fn list_keeps_registration_order() {
        let mut registry = Registry::new();
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        for (i, id) in ids.iter().enumerate() {
            registry.insert(*id, DroneState::new(i as i32, 0, Direction::North));
        }
        let listed: Vec<Uuid> = registry.list().iter().map(|d| d.id).collect();
        assert_eq!(listed, ids);
    }
}
