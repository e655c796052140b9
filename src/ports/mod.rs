// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the traits (ports) at the seams of the merge engine:
//! the host environment it reads profiles and properties from, and the parsers
//! it uses to flatten structured documents. Adapters implement them.

pub mod environment;
pub mod parser;

// Re-export commonly used types
pub use environment::EnvironmentOracle;
pub use parser::ConfigParser;
