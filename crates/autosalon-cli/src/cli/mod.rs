//! # CLI Layer
//!
//! This module is **one possible UI client** for autosalon, not the application
//! itself. It is the only place that knows about stdout/stderr, exit codes and
//! colors.
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: clap derive types in `setup.rs`
//! 2. **Context Setup**: load config, build the facade for the resolved gate
//! 3. **Dispatch**: call the facade, await the result
//! 4. **Output Formatting**: `render.rs` turns cars and messages into lines
//!
//! Running `autosalon` with no subcommand lists the inventory.

mod commands;
mod render;
mod setup;

pub use commands::run;
