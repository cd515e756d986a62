// Copyright 2024-2025 Irreducible Inc.

use crate::{coin::CoinId, column::ColumnId, query::QueryId};

/// Errors raised while declaring a protocol or rewriting it in a compiler pass.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("a {kind} named {name} is already registered")]
	DuplicateName { kind: &'static str, name: String },

	#[error("no column exists with id {0}")]
	UnknownColumn(ColumnId),

	#[error("no coin exists with id {0}")]
	UnknownCoin(CoinId),

	#[error("no query exists with id {0}")]
	UnknownQuery(QueryId),

	#[error("{name} at round {round} depends on {dependency} from the later round {dependency_round}")]
	RoundViolation {
		name: String,
		round: usize,
		dependency: String,
		dependency_round: usize,
	},

	#[error("{name} mixes columns of sizes {first} and {second}")]
	HeterogeneousDomain {
		name: String,
		first: usize,
		second: usize,
	},

	#[error("{name} does not read any column")]
	EmptyDomain { name: String },

	#[error("{name} lists polynomial {column} more than once")]
	DuplicatePolynomial { name: String, column: String },

	#[error("size of {name} must be a power of two, got {size}")]
	NonPowerOfTwoSize { name: String, size: usize },

	#[error("coin {name} cannot be sampled at round zero")]
	CoinAtRoundZero { name: String },

	#[error("{name} has a zero length or modulus")]
	ZeroSize { name: String },

	#[error("{name} reads coin {coin} which is not a single field element")]
	NonScalarCoin { name: String, coin: String },

	#[error("{name} reads parameters of {query} through an accessor of the wrong kind")]
	AccessorKindMismatch { name: String, query: String },

	#[error(
		"{name} samples rows with period {period} and offset {offset}, incompatible with domain size {domain_size}"
	)]
	InvalidPeriodicSample {
		name: String,
		period: usize,
		offset: usize,
		domain_size: usize,
	},

	#[error("{name} has fragments of width {expected} and {actual}")]
	FragmentWidthMismatch {
		name: String,
		expected: usize,
		actual: usize,
	},

	#[error("{name} has nothing to check")]
	EmptyQuery { name: String },

	#[error("{name} lists expressions of size {actual} under size {size}")]
	GrandProductSizeMismatch {
		name: String,
		size: usize,
		actual: usize,
	},
}
