// Copyright 2024-2025 Irreducible Inc.

//! Mathematical primitives built atop the `wizard_field` crate.
//!
//! This crate provides:
//!
//! * Arithmetic expressions and evaluators
//! * Univariate polynomials in monomial and Lagrange form

mod arith_expr;
mod error;
mod univariate;

pub use arith_expr::*;
pub use error::*;
pub use univariate::*;
