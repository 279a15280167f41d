//! # Taskboard API Server Library
//!
//! HTTP surface for project management: projects, positions, task types,
//! employees with their chief hierarchy, tasks with doers, and task files.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Request extractors
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
