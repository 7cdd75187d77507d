//! tasklist-core - Core library for tasklist
//!
//! This crate contains the shared models, the hosted backend gateways, and the
//! screen state (session guard, todo list store, item and auth views) used by
//! every tasklist interface.

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod notify;
pub mod screens;
pub mod store;
pub mod util;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{Error, Result};
pub use models::{NewTodo, Todo, TodoId, TodoPatch};
pub use store::TodoListStore;
