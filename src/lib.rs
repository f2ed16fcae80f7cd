//! Looks up a public GitHub profile and its repositories, and drives a display surface with the outcome.
//!
//! The [`LookupOrchestrator`] fetches both resources concurrently, caches them per key and
//! cancels superseded lookups. The [`LookupController`] maps user events to lookups and
//! [`LookupPresenter`] calls.

mod infrastructure;
mod interface;
mod model;

pub use infrastructure::*;
pub use interface::*;
pub use model::*;
