//! Workflows that span more than one collection.
//!
//! Each feature owns the hooks it needs, validates input before anything
//! reaches a backend, and exposes joined or filtered views over the hooks'
//! items.

mod goals;
mod studio;
mod vault;

pub use goals::{CreateGoal, Goals};
pub use studio::Studio;
pub use vault::{Vault, MASKED_PASSWORD};
