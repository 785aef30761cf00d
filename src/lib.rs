//! Core logic for the care-coordination scheduling panel: status
//! transition rules, scheduling form payloads, debounced autocomplete,
//! the token-injecting API proxy, and a local appointment store.

pub mod client;
pub mod config;
pub mod dates;
pub mod debounce;
pub mod edit;
pub mod error;
pub mod filters;
pub mod models;
pub mod proxy;
pub mod reason;
pub mod schedule;
pub mod status;
pub mod store;
