//! # Database Module
//!
//! User account models and the storage seam the authentication flow reads from.
//! The bundled store keeps accounts in memory for the lifetime of the process.

pub mod models;
pub mod store;

pub use models::{CreateUserRequest, User, UserDto};
pub use store::{InMemoryUserStore, NewUser, StoreError, UserStore};
