//! Repository implementations for database access
//!
//! Repositories borrow a pool and issue plain sqlx queries. Callers obtain
//! the pool from the connection cache first.

pub mod bookings;
pub mod events;

pub use bookings::BookingRepo;
pub use events::EventRepo;
