//! Value Objects
//!
//! Small immutable types validated at construction.

mod money;
mod schedule;

pub use money::Amount;
pub use schedule::{CalendarDate, TimeOfDay};
