pub mod authentication;
pub mod config;
pub mod crud_ops;
pub mod database;
pub mod entities;
pub mod error;
pub mod extract;
pub mod password;
pub mod repository;
pub mod seed;
pub mod server;
pub mod service;

pub use error::{Error, Result};
