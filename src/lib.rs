// Bibliothèque de gestion de flotte de drones
// Expose tous les modules pour utilisation externe (par les binaires)

pub mod types;          // Types de base (Direction, Position, DroneState)
pub mod error;          // Erreurs du service
pub mod field;          // Limites du terrain et affichage
pub mod planner;        // Planification des déplacements
pub mod registry;       // Registre des drones
pub mod history;        // Historique des déplacements
pub mod service;        // Couche applicative
pub mod network;        // Protocole réseau et serveur
pub mod config;         // Configuration des binaires

// Ré-exportation des types principaux pour faciliter l'importation
pub use types::*;
pub use error::{DroneError, OutOfBoundsError};
pub use field::validate_bounds;
pub use planner::{MovePlan, TraceEvent, plan_move};
pub use registry::{DroneRecord, DroneStore, Registry};
pub use history::{HistoryEntry, HistorySink, JsonFileHistory, MemoryHistory};
pub use service::{DroneService, MoveOutcome};
