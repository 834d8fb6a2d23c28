//! Error types for the fleet service.

use thiserror::Error;
use uuid::Uuid;

/// Coordinates outside the `[0, 9] x [0, 9]` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Out of field values for Coordinates")]
pub struct OutOfBoundsError {
    pub x: i32,
    pub y: i32,
}

/// Everything the drone service can reject a request with.
#[derive(Debug, Error)]
pub enum DroneError {
    #[error(transparent)]
    OutOfBounds(#[from] OutOfBoundsError),

    #[error("Drone is already at the specified position, no movement detected")]
    NoMovement,

    #[error("Another drone already exists in this position")]
    PositionTaken,

    #[error("Another drone already exists at the new position")]
    DestinationOccupied,

    #[error("Direction must be one of North, East, West, South")]
    InvalidDirection(String),

    #[error("Drone not found")]
    NotFound(Uuid),

    #[error("Drone history not found for ID: {0}")]
    HistoryNotFound(Uuid),

    #[error("Error reading drone history for ID: {id}")]
    HistoryRead {
        id: Uuid,
        #[source]
        source: std::io::Error,
    },

    #[error("Error writing drone history for ID: {id}")]
    HistoryWrite {
        id: Uuid,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Protocol(String),
}

impl DroneError {
    /// HTTP-style status code reported to clients.
    pub fn status(&self) -> u16 {
        match self {
            DroneError::OutOfBounds(_)
            | DroneError::NoMovement
            | DroneError::PositionTaken
            | DroneError::DestinationOccupied
            | DroneError::InvalidDirection(_)
            | DroneError::Protocol(_) => 400,
            DroneError::NotFound(_) | DroneError::HistoryNotFound(_) => 404,
            DroneError::HistoryRead { .. } | DroneError::HistoryWrite { .. } => 500,
        }
    }

    /// Short summary shown above the details.
    pub fn title(&self) -> &'static str {
        match self {
            DroneError::OutOfBounds(_) => "Invalid values",
            DroneError::NoMovement
            | DroneError::PositionTaken
            | DroneError::DestinationOccupied => "Invalid Input",
            DroneError::InvalidDirection(_) | DroneError::Protocol(_) => "Validation Failed",
            DroneError::NotFound(_) | DroneError::HistoryNotFound(_) => "Invalid droneId",
            DroneError::HistoryRead { .. } | DroneError::HistoryWrite { .. } => "History unavailable",
        }
    }
}
