//! tripflow-domain
//!
//! Pure booking-flow models (BookingSnapshot, BookingState, GuestRecord, WizardProgress, etc.).
//! No I/O, no network, no storage. Only data types and core enums.

pub mod booking;
pub mod changes;
pub mod common;
pub mod events;
pub mod guest;
pub mod pricing;
pub mod status;
pub mod wizard;

pub use booking::*;
pub use changes::*;
pub use common::*;
pub use events::*;
pub use guest::*;
pub use pricing::*;
pub use status::*;
pub use wizard::*;
