#![doc = "The `taskvault` library crate."]
#![doc = ""]
#![doc = "A multi-tenant task tracker. The authentication core issues and verifies"]
#![doc = "stateless bearer tokens, binds the verified identity to each request, and"]
#![doc = "scopes every task operation to that identity. The binary (`main.rs`) wires"]
#![doc = "these pieces into an actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod tasks;

pub use crate::error::AppError;
pub use crate::state::Services;
