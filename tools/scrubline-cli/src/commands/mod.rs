pub mod check;
pub mod config;
pub mod frames;
pub mod map;
pub mod simulate;
