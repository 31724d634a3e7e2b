//! Repository implementations.
//!
//! Repositories cover the read side and intake writes. The checkout
//! transaction (sale inserts and conditional lot decrements) lives in
//! [`crate::checkout`], not here, so that the single mutation point of the
//! engine stays in one place.

pub mod lot;
pub mod sale;
