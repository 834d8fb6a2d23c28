//! # Movement Planner
//!
//! Computes how a drone gets from its current `(position, facing)` to a target
//! cell. Movement is resolved one axis at a time, and the drone may never swing
//! straight round to the opposite facing: such a reversal is split into two
//! quarter turns through a fixed intermediate facing.
//!
//! The planner is a pure function. Bounds, occupancy and same-cell checks belong
//! to the caller and must pass before [`plan_move`] is invoked.

use std::fmt;

use crate::types::{Axis, Direction, DroneState, Position};

/// One step of a plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceEvent {
    /// Orientation change with no position change.
    Turn { from: Direction, to: Direction },
    /// Translation along one axis while facing `via`.
    Advance { to: Position, via: Direction },
    /// Quarter turn inserted so that a reversal is never applied directly.
    ForcedIntermediateTurn { from: Direction, to: Direction },
}

impl TraceEvent {
    /// Applies this event to `state`.
    pub fn apply(self, state: DroneState) -> DroneState {
        match self {
            TraceEvent::Turn { to, .. } | TraceEvent::ForcedIntermediateTurn { to, .. } => {
                DroneState { facing: to, ..state }
            }
            TraceEvent::Advance { to, via } => DroneState {
                position: to,
                facing: via,
            },
        }
    }

    pub fn is_turn(self) -> bool {
        !matches!(self, TraceEvent::Advance { .. })
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Turn { from, to } => write!(f, "Pointed from {} to {}", from, to),
            TraceEvent::ForcedIntermediateTurn { from, to } => write!(
                f,
                "Could not directly travel from {} to {}, pointed towards {} first.",
                from,
                from.opposite(),
                to
            ),
            TraceEvent::Advance { to, via } => write!(f, "Moved to {} towards {}", to, via),
        }
    }
}

/// Result of planning a single move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovePlan {
    pub final_position: Position,
    pub final_facing: Direction,
    pub trace: Vec<TraceEvent>,
}

impl MovePlan {
    pub fn final_state(&self) -> DroneState {
        DroneState {
            position: self.final_position,
            facing: self.final_facing,
        }
    }

    /// Replays the trace from `initial`.
    pub fn replay(&self, initial: DroneState) -> DroneState {
        self.trace.iter().fold(initial, |state, event| event.apply(state))
    }

    /// Human-readable trace lines, in order.
    ///
    /// An advance names its heading only when the move spans both axes; a
    /// single-axis move reads `Moved to (x, y)`.
    pub fn details(&self) -> Vec<String> {
        let two_axis = self.trace.iter().filter(|e| !e.is_turn()).count() > 1;
        self.trace
            .iter()
            .map(|event| match event {
                TraceEvent::Advance { to, .. } if !two_axis => format!("Moved to {}", to),
                _ => event.to_string(),
            })
            .collect()
    }
}

/// Intermediate facing used when a reversal has to be split.
///
/// NORTH/SOUTH reversals go through EAST, EAST/WEST reversals through NORTH.
pub fn reversal_pivot(required: Direction) -> Direction {
    match required.axis() {
        Axis::Y => Direction::East,
        Axis::X => Direction::North,
    }
}

/// Sequential state machine over `(position, facing)`.
struct Walk {
    state: DroneState,
    trace: Vec<TraceEvent>,
}

impl Walk {
    fn start(state: DroneState) -> Self {
        Self {
            state,
            trace: Vec::with_capacity(6),
        }
    }

    fn push(&mut self, event: TraceEvent) {
        self.state = event.apply(self.state);
        self.trace.push(event);
    }

    fn reorient(&mut self, required: Direction) {
        let current = self.state.facing;
        if current == required {
            return;
        }

        if current.is_opposite(required) {
            let pivot = reversal_pivot(required);
            self.push(TraceEvent::ForcedIntermediateTurn {
                from: current,
                to: pivot,
            });
        }

        self.push(TraceEvent::Turn {
            from: self.state.facing,
            to: required,
        });
    }

    fn resolve(&mut self, axis: Axis, target: Position) {
        let delta = target.coord(axis) - self.state.position.coord(axis);
        if delta == 0 {
            return;
        }

        let required = Direction::toward(axis, delta);
        self.reorient(required);
        self.push(TraceEvent::Advance {
            to: self.state.position.with_coord(axis, target.coord(axis)),
            via: required,
        });
    }

    fn finish(self) -> MovePlan {
        MovePlan {
            final_position: self.state.position,
            final_facing: self.state.facing,
            trace: self.trace,
        }
    }
}

/// Axis order for a move: the axis the drone is not facing along goes first.
pub fn axis_order(facing: Direction) -> [Axis; 2] {
    match facing.axis() {
        Axis::Y => [Axis::X, Axis::Y],
        Axis::X => [Axis::Y, Axis::X],
    }
}

/// Plans the move of a drone in `current` to `target`.
///
/// `target` must differ from `current.position`; a zero-length move yields an
/// empty plan in release builds and trips an assertion in debug builds.
pub fn plan_move(current: DroneState, target: Position) -> MovePlan {
    debug_assert_ne!(
        current.position, target,
        "plan_move called without any movement"
    );

    let mut walk = Walk::start(current);
    for axis in axis_order(current.facing) {
        walk.resolve(axis, target);
    }
    walk.finish()
}
