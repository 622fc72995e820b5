//! Orchard Core - Shared types library.
//!
//! This crate provides common types used across all Orchard components:
//! - `storefront` - Public-facing e-commerce site
//! - `integration-tests` - In-process router tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and emails,
//!   plus the product and user entity types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
