//! # Communications interface crate.
//!
//! Provides the message schemas exchanged between the planner and the rest of the navigation
//! stack.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Reference route (road definition data file) messages
pub mod route;

/// Vehicle geometry configuration
pub mod veh;
