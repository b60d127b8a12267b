pub mod agent;
pub mod boundary;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod food;
pub mod ghost;
pub mod log;
pub mod maze;
pub mod pieces;
pub mod rng;
pub mod tiles;
pub mod types;
