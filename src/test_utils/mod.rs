//! Test utilities for integration testing.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - In-memory implementations of the storage, rate-limit and CRM ports
//! - Client-side stubs for the form controller
//! - Hand-built driver errors for storage error mapping
//! - `TestAppStateBuilder` for HTTP-level tests

mod app_state_builder;
mod client_mocks;
mod db_errors;
mod factories;
mod waitlist_mocks;

pub use app_state_builder::*;
pub use client_mocks::*;
pub use db_errors::*;
pub use factories::*;
pub use waitlist_mocks::*;
