//! # Autosalon CLI
//!
//! A terminal admin for the dealership inventory. The binary is thin: everything
//! lives in `src/cli/`, and this file only invokes `cli::run()` and handles process
//! termination.
//!
//! ## Workspace Structure
//!
//! - `crates/autosalon/`: the data-access library (facade, providers, local store)
//! - `crates/autosalon-cli/`: this tool, one possible client of the library
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (src/cli/)                                       │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Facade wiring + dispatch (commands.rs)                   │
//! │  - Terminal rendering (render.rs)                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Repository / Inbox facades (autosalon crate)               │
//! │  - Gate decides remote provider vs local fallback           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logging goes to stderr through `tracing-subscriber`. `RUST_LOG` wins; otherwise
//! `-v` turns on debug output for the library.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
