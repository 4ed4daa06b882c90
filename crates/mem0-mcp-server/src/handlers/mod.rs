//! MCP request handlers.
//!
//! # Module Organization
//!
//! - `core`: the `Handlers` struct and method dispatch
//! - `lifecycle`: initialize, initialized notification, shutdown
//! - `tools`: tools/list and tools/call dispatch
//! - `memory`: the three coding-preference tool implementations

mod core;
mod lifecycle;
mod memory;
mod tools;


pub use core::Handlers;
