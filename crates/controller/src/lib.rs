//! Synchronization controller for the studio map.
//!
//! Consumes provider and list events through a single entry point, runs the
//! visibility → card/dot → label → marker-state pipeline, and writes the
//! result to a [`MapProvider`] sink.

pub mod config;
pub mod controller;
pub mod events;
pub mod geocoding;
pub mod provider;
pub mod scroll;

#[cfg(test)]
mod fake;

pub use config::*;
pub use controller::*;
pub use events::*;
pub use geocoding::*;
pub use provider::*;
pub use scroll::*;
