//! Temperature probe implementations

pub mod remote;

pub use remote::{decode_celsius, RemoteProbe};
