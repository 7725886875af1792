//! Navigation statechart
//!
//! ```text
//! Init -> Idle --'1'--> Menu --1..5--> RecipeDetail --'1'--> StartProcess
//!          |             ^                 |                     |
//!         '2'            +------'2'--------+               StartFirstStep
//!          v             |                                       v
//!       Shutdown         +-------- Menu (abort) ----------- ControlLoop <-+
//!                                                             |   |       |
//!                                          no more steps -----+   +-------+
//!                                                 v             more steps
//!                                          FinishProcess -> FinishedMessage -> Idle
//! ```

pub mod events;
pub mod machine;
pub mod operations;

pub use events::{FsmEvent, Level, PinMode, Screen, StatusLight};
pub use machine::Statechart;
pub use operations::{EventQueue, Operations};
