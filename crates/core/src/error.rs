// Copyright 2024-2025 Irreducible Inc.

use crate::registry;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("declaration error: {0}")]
	Registry(#[from] registry::Error),

	#[error("column {name} expects {expected} values, got {actual}")]
	ColumnLengthMismatch {
		name: String,
		expected: usize,
		actual: usize,
	},

	#[error("column {name} belongs to round {column_round} but the prover is at round {current_round}")]
	ColumnRoundMismatch {
		name: String,
		column_round: usize,
		current_round: usize,
	},

	#[error("column {name} is already assigned")]
	ColumnAlreadyAssigned { name: String },

	#[error("column {name} holds fixed values and cannot be assigned")]
	AssignPrecomputed { name: String },

	#[error("column {name} was freed")]
	ColumnFreed { name: String },

	#[error("column {name} was not assigned by the end of round {round}")]
	MissingAssignment { name: String, round: usize },

	#[error("parameters of {query} were not assigned by the end of round {round}")]
	MissingParams { query: String, round: usize },

	#[error("parameters of {query} are already assigned")]
	ParamsAlreadyAssigned { query: String },

	#[error("parameters of {query} do not match a {kind}")]
	ParamsKindMismatch { query: String, kind: &'static str },

	#[error("denominator of {query} vanishes at row {row}")]
	ZeroDenominator { query: String, row: usize },

	#[error("{pass}: {reason}")]
	Compilation { pass: &'static str, reason: String },

	#[error("field error: {0}")]
	Field(#[from] wizard_field::Error),

	#[error("math error: {0}")]
	Math(#[from] wizard_math::Error),

	#[error("NTT error: {0}")]
	Ntt(#[from] wizard_ntt::Error),

	#[error("verification error: {0}")]
	Verification(#[from] VerificationError),
}

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
	#[error("global constraint {query} does not vanish at row {row}")]
	ConstraintViolated { query: String, row: usize },

	#[error("local constraint {query} does not vanish")]
	LocalConstraintViolated { query: String },

	#[error("local opening {query} claims {claimed} but the column holds {actual}")]
	OpeningMismatch {
		query: String,
		claimed: String,
		actual: String,
	},

	#[error("univariate evaluation {query} is wrong for polynomial {index}")]
	UnivariateEvalMismatch { query: String, index: usize },

	#[error("the fragments of permutation {query} are not permutations of one another")]
	PermutationMismatch { query: String },

	#[error("grand product {query} evaluates to {computed}, expected {expected}")]
	GrandProductMismatch {
		query: String,
		computed: String,
		expected: String,
	},

	#[error("denominator of grand product {query} vanishes")]
	ZeroDenominator { query: String },

	#[error("batched evaluation {query} does not match the quotient: {left} != {right}")]
	QuotientMismatch {
		query: String,
		left: String,
		right: String,
	},

	#[error("evaluation point of {query} does not match the random coin")]
	WrongEvaluationPoint { query: String },

	#[error("evaluation point of {query} is shared with {other}")]
	DuplicateEvaluationPoint { query: String, other: String },

	#[error("column {name} is missing")]
	MissingColumn { name: String },

	#[error("coin {name} is missing or not a field element")]
	MissingCoin { name: String },

	#[error("parameters of {query} are missing or of the wrong kind")]
	MissingParams { query: String },

	#[error("proof holds values for column {name} which is not sent in the clear")]
	UnexpectedColumn { name: String },

	#[error("proof holds parameters for {query} out of order")]
	UnexpectedParams { query: String },

	#[error("math error: {0}")]
	Math(#[from] wizard_math::Error),
}
