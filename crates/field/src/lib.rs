// Copyright 2023-2024 Irreducible Inc.

//! Prime field arithmetic for the wizard protocol compiler.
//!
//! The compiler only needs a small-characteristic prime field with a large power-of-two
//! multiplicative subgroup, so that columns can be read as evaluations of univariate
//! polynomials over roots of unity. [`KoalaBear`] ($p = 2^{31} - 2^{24} + 1$) is the field used
//! throughout the workspace.

pub mod arithmetic_traits;
pub mod error;
pub mod field;
pub mod koala_bear;
#[cfg(test)]
mod tests;
pub mod util;

pub use error::*;
pub use field::{Field, PrimeField, TwoAdicField};
pub use koala_bear::KoalaBear;
