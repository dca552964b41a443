//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod booking;
pub mod event;
pub mod schedule;
pub mod validation;

pub use booking::{Booking, BookingEmail};
pub use event::{Event, EventDraft, EventMode, NewEvent};
pub use validation::ValidationError;
