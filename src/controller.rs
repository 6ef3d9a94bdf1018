//! The UI side of a session: one connection, the intents raised before it
//! exists, and the views rendered from it.

mod client;
mod progress;

pub use client::{ControllerClient, PendingIntents};
pub use progress::{Progress, ProgressSampler, format_time};
