//! Persistence for user accounts

pub mod user;

pub use user::{UserRepository, UserStore};
