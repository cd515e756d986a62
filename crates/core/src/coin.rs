// Copyright 2024-2025 Irreducible Inc.

use std::fmt;

use getset::{CopyGetters, Getters};

/// Identifier of a random coin in a [`crate::registry::Registry`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoinId(pub(crate) usize);

impl CoinId {
	pub const fn index(self) -> usize {
		self.0
	}
}

impl fmt::Display for CoinId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "coin#{}", self.0)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoinKind {
	/// A single field element.
	Field,
	/// A vector of independent field elements.
	FieldVec(usize),
	/// `count` integers in `[0, modulus)`.
	IntegerVec { count: usize, modulus: usize },
	/// A field element derived from the transcript state and the coin name, without advancing
	/// the transcript.
	FieldFromSeed,
}

impl CoinKind {
	/// Whether the coin can appear as a scalar in an expression.
	pub const fn is_scalar(self) -> bool {
		matches!(self, Self::Field | Self::FieldFromSeed)
	}
}

#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct CoinInfo {
	#[get_copy = "pub"]
	pub(crate) id: CoinId,
	#[get = "pub"]
	pub(crate) name: String,
	/// Coins are sampled at the start of their round, never at round zero.
	#[get_copy = "pub"]
	pub(crate) round: usize,
	#[get_copy = "pub"]
	pub(crate) kind: CoinKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoinValue<F> {
	Field(F),
	FieldVec(Vec<F>),
	IntegerVec(Vec<usize>),
}

impl<F: Copy> CoinValue<F> {
	pub fn as_field(&self) -> Option<F> {
		match self {
			Self::Field(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_field_vec(&self) -> Option<&[F]> {
		match self {
			Self::FieldVec(values) => Some(values),
			_ => None,
		}
	}

	pub fn as_integers(&self) -> Option<&[usize]> {
		match self {
			Self::IntegerVec(values) => Some(values),
			_ => None,
		}
	}
}
