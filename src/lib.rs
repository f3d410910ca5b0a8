//! Replicated User Directory Library
//!
//! This library crate defines the modules behind the two node roles. It serves
//! as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! - **`directory`**: The primary node. Owns the canonical user collection behind a single
//!   lock and exposes CRUD over HTTP.
//! - **`replica`**: The secondary node. Holds a mirror of the collection, served read-only,
//!   and a background `SyncAgent` that pulls snapshots from the primary and reconciles them
//!   into the mirror.
//! - **`config`**: Role selection and tuning (bind address, primary URL, sync interval,
//!   retry delay, fetch timeout, id policy).

pub mod config;
pub mod directory;
pub mod replica;
