//! # Taskboard Shared Library
//!
//! This crate contains the domain model, persistence and access-control logic
//! used by the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models (projects, employees, positions, tasks, ...)
//! - `auth`: Authentication (JWT, passwords) and project-scoped authorization
//! - `db`: Connection pool and embedded migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
