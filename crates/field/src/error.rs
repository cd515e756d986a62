// Copyright 2023-2024 Irreducible Inc.

/// Error thrown when a field operation fails.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
	/// Thrown when trying to initialize a field element from a value that is not canonical.
	#[error("value {value} is not in the field")]
	NotInField { value: u64 },
	#[error("cannot invert zero element at index {index}")]
	ZeroInBatchInversion { index: usize },
	#[error("the field has no multiplicative subgroup of size 2^{log_n}, two-adicity is {two_adicity}")]
	TwoAdicityExceeded { log_n: usize, two_adicity: usize },
}
