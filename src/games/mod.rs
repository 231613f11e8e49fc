//! Game implementations.

pub mod cricket;
