// library crate for radial
// the binary is a thin wrapper around `cli`

pub mod cli;
pub mod conditions;
pub mod config;
pub mod registry;
