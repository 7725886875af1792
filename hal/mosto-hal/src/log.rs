//! Record log abstraction
//!
//! The brewing log is a bounded FIFO of text records in its own flash
//! partition. When the partition is full the oldest records are dropped to
//! make room.

use core::future::Future;

use crate::flash::FlashError;

/// Largest record the log accepts
pub const MAX_RECORD_LEN: usize = 64;

/// Bounded append-only log
pub trait LogStorage {
    /// Append one record, overwriting the oldest ones if the log is full
    fn append(&mut self, record: &[u8]) -> impl Future<Output = Result<(), FlashError>>;

    /// Visit every stored record, oldest first
    ///
    /// Returns the number of records visited.
    fn for_each<F: FnMut(&[u8])>(&mut self, f: F) -> impl Future<Output = Result<usize, FlashError>>;

    /// Drop every record
    fn clear(&mut self) -> impl Future<Output = Result<(), FlashError>>;
}
