// Copyright 2024 Ulvetanna Inc.

//! Radix-2 number-theoretic transforms over two-adic prime fields.
//!
//! Columns of a protocol are read as evaluations of a univariate polynomial over the subgroup of
//! $2^k$-th roots of unity, in natural order: row $i$ holds $P(\omega^i)$. The transforms in
//! this crate move between those evaluations and the monomial coefficients of $P$.

mod error;
mod multithreaded;
mod ntt;
#[cfg(test)]
mod reference;
mod single_threaded;
pub mod twiddle;

pub use error::Error;
pub use multithreaded::MultithreadedNTT;
pub use ntt::NTT;
pub use single_threaded::SingleThreadedNTT;
