pub mod error;
pub mod fields;
pub mod repo;
pub mod seed;
pub mod service;
