//! Repositories for database operations

pub mod movie;
pub mod user;

pub use movie::MovieRepository;
pub use user::UserRepository;
