//! Deterministic decision/economy kernel for the conveyor-belt moderation game.
//!
//! Paired posts travel a fixed-length belt toward an exit boundary. The player
//! promotes, suppresses, or verifies the selected post before its pair exits;
//! anything left unresolved is settled by the engagement-maximizing policy.
//! The kernel is single-threaded and frame-driven: one `step(delta_ms)` call
//! per rendered frame owns every state mutation. Presentation layers consume
//! the event log and `display_state()`; input layers enqueue commands.

pub mod economy;
pub mod generator;
pub mod world;

pub use world::ModerationWorld;
