#![allow(dead_code)]

pub mod doubles;
pub mod strategies;

pub use doubles::*;
pub use strategies::*;
