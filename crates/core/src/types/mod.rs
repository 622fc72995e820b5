//! Core types for Orchard.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use product::{
    NewProduct, OrderDirection, OrderField, Product, ProductOrder, ProductPatch, SortOption,
};
pub use user::{Account, UserProfile};
