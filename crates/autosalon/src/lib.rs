//! # Autosalon Architecture
//!
//! Autosalon is the **data-access layer** of a dealership website: the car inventory
//! shown on the public pages and edited from the admin panel, plus the contact-message
//! inbox. It is a library first; the `autosalon` binary is one possible client.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Client (CLI, web handler, ...)                             │
//! │  - Renders cars, collects form input                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Repository Facade (repository.rs)                          │
//! │  - In-memory collection + loading flag                      │
//! │  - Confirm-then-apply mutations                             │
//! └─────────────────────────────────────────────────────────────┘
//!                 │                            │
//!                 ▼                            ▼
//! ┌───────────────────────────────┐ ┌───────────────────────────┐
//! │  Provider Adapters (provider/)│ │  Local Fallback (store/)  │
//! │  - Firestore, Supabase, memory│ │  - JSON array in a slot   │
//! └───────────────────────────────┘ └───────────────────────────┘
//! ```
//!
//! Which side is authoritative is decided once, by the [`config::Gate`], when the
//! facade is built. Nothing below the facade knows about the other side.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! The library never writes to stdout/stderr and never exits the process. Diagnostics
//! go through `tracing`; the client decides whether and how to print them.
//!
//! ## Testing Strategy
//!
//! - **Store** (`store/`): `MemSlots` for logic, `FsSlots` against a temp dir.
//! - **Providers** (`provider/`): wire translation is tested without a network;
//!   `MemProvider` stands in for a remote backend.
//! - **Facade** (`repository.rs`): both modes, driven by the in-memory doubles.
//!
//! ## Module Overview
//!
//! - [`repository`]: The facade, entry point for car operations
//! - [`provider`]: Remote persistence adapters
//! - [`store`]: Local fallback store and its slot backends
//! - [`config`]: Configuration loading and the provider gate
//! - [`model`]: `Car`, `NewCar`, `CarPatch` and derived views
//! - [`seed`]: Demo dataset
//! - [`messages`]: Contact-message inbox
//! - [`error`]: Error types

pub mod config;
pub mod error;
pub mod messages;
pub mod model;
pub mod provider;
pub mod repository;
pub mod seed;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
