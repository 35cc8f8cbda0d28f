//! Movie catalog API service
//!
//! Routes, models, repositories, and the JWT/auth plumbing for the
//! movie catalog. The binary in `main.rs` wires these together with the
//! connection pool from the `common` crate.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;
