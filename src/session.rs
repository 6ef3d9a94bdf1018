//! The playback session: one coordinator thread owning the player and the
//! resume point, and the host that starts it and hands out connections.

mod command;
mod coordinator;
mod host;
mod hub;
mod load;
mod ticker;

pub use command::*;
pub use host::{PendingConnect, PlayerFactory, SessionConnection, SessionError, SessionHost};
pub use hub::{PlayerSnapshot, SessionEvent};
pub use load::{clamp_index, clamp_position};
