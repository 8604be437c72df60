#![allow(non_snake_case)]

mod block_concatenate;
mod core;
mod matrix_math;
mod utils;
pub use self::core::*;
