//! Tillhouse Core - Shared types and the cart pricing engine.
//!
//! This crate provides the common types used across all Tillhouse components:
//! - `pos` - The point-of-sale web client
//! - `cli` - Command-line tools for seeding and health checks
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no async. This keeps it lightweight and allows it to be used
//! anywhere, including in synchronous unit tests.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, `Money`, and the domain records shared with the
//!   backend wire format
//! - [`cart`] - The cart pricing and validation engine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use types::*;
