// src/lib.rs

//! Nectar Core - client-side state engine for a grocery storefront
//!
//! The crate hosts the catalog, cart, and account stores behind async
//! managers with a shared event bus and snapshot persistence, so a UI
//! layer can stay a thin projection of the state held here.

#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::result_large_err)]

pub mod account;
pub mod app;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod manager;
pub mod storage;
pub mod types;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use error::{Error, ErrorKind, Result, ResultExt};
pub use manager::{Manager, ManagerState, ManagerStatus};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
