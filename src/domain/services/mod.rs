//! Domain Services
//!
//! Pure business logic with no I/O.

pub mod slot_grid;

pub use slot_grid::{GridSlot, SlotGrid, SlotStatus, SLOT_MINUTES};
