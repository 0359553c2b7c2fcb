//! Screen components.

pub mod roster;
