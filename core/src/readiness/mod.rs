//! Readiness state machine
//!
//! Merges independent host completions (surface mounted, content size
//! known, media ready, payload fetched) into explicit transitions. The
//! prepare gate is one pure function evaluated from every transition that
//! could open it, so the overlay index is built exactly once regardless of
//! completion order.

mod state;

pub use state::{ReadinessAction, ReadinessEvent, ReadinessState, prepare_gate};
