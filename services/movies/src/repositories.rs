//! Repositories for database operations

pub mod movie;

pub use movie::MovieRepository;
