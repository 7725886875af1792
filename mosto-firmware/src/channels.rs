//! Firmware channel context
//!
//! The queues themselves are defined in `mosto_core::channels`; this module
//! pins the mutex type and holds the counters the tasks report through.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use mosto_core::channels::Channels;
use portable_atomic::{AtomicU32, Ordering};
use static_cell::StaticCell;

/// Channel set shared by every task
pub type FwChannels = Channels<CriticalSectionRawMutex>;

static CHANNELS: StaticCell<FwChannels> = StaticCell::new();

/// Status updates the control task dropped on a full display queue
pub static DISPLAY_DROPS: AtomicU32 = AtomicU32::new(0);

/// Log rows the control task dropped on a full log queue
pub static LOG_DROPS: AtomicU32 = AtomicU32::new(0);

/// Allocate the channel set
///
/// Returns `None` if called more than once.
pub fn init() -> Option<&'static FwChannels> {
    CHANNELS.try_init(Channels::new()).map(|c| &*c)
}

/// Count a dropped message, returning the new total
pub fn count_drop(counter: &AtomicU32) -> u32 {
    counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
}
