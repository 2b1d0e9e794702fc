// Library exports for the motion engine CLI
// This allows testing of internal modules

pub mod commands;
pub mod config;
