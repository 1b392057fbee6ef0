//! Cross-process scenarios.

pub mod network;

mod commands;
mod convergence;
mod enforcement;
mod hiding;
