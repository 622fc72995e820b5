//! Request-scoped models shared across routes and middleware.

pub mod session;

pub use session::{CurrentUser, session_keys};
