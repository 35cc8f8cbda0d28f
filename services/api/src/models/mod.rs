//! Request and response models for the API service

pub mod movie;
pub mod user;

// Re-export for convenience
pub use movie::{ListMeta, Movie, MovieInput, MovieListResponse, MovieQuery};
pub use user::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, User};
