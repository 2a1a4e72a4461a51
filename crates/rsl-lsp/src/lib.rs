//! RSL Language Server
//!
//! Editor surface for the RSL build pipeline: publishes build diagnostics,
//! serves `color(r, g, b)` document colors, and exposes the build as the
//! `rsl.compileScene` workspace command.

pub mod colors;
pub mod convert;
pub mod document;
pub mod server;

pub use server::RslLspServer;
