//! Keypad navigation
//!
//! - [`navigator`]: routes keys to statechart events by active screen
//! - [`context`]: the [`Operations`](crate::statechart::Operations) adapter and its outbox
//! - [`input`]: typed-key echo buffer

pub mod context;
pub mod input;
pub mod navigator;

pub use context::{NavContext, Outbox};
pub use input::InputBuffer;
pub use navigator::{KeyOutcome, Navigator};
