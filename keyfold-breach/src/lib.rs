//! K-anonymity breach-corpus lookup for Keyfold.
//!
//! Independent of all key material: the only secrets it touches are
//! candidate passwords, and only a 20-bit hash prefix of those ever
//! reaches the network. Failures are advisory — a password whose status
//! could not be checked is unknown, never clean.

mod client;
mod config;
mod error;

pub use client::{BreachClient, BreachReport};
pub use config::BreachConfig;
pub use error::{BreachError, BreachResult};
