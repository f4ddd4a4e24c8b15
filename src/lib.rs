//! TeamForge API Library
//!
//! In-memory store for teams of agents and their ordered workflows, with
//! repository adapters for persistence, project configuration, and the
//! HTTP adapter that exposes the store to the UI.

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod store;
