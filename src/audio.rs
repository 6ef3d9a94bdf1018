//! The media engine: the `Player` capability the session drives and its
//! `rodio` implementation.

mod clock;
mod engine;
mod player;
mod queue;
mod sink;
mod state;
mod types;

#[cfg(test)]
pub(crate) mod scripted;

pub use engine::{Player, PlayerError};
pub use player::RodioPlayer;
pub use types::*;

#[cfg(test)]
mod tests;
