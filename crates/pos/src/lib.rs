//! Tillhouse POS library.
//!
//! This crate provides the point-of-sale web client as a library, allowing
//! it to be booted in-process by the integration tests and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
