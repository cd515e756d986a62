// Copyright 2024-2025 Irreducible Inc.

mod check;

use std::{collections::BTreeMap, fmt};

use getset::{CopyGetters, Getters};
use wizard_field::Field;

use crate::{column::Column, expression::Expression};

/// Identifier of a query in a [`crate::registry::Registry`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryId(pub(crate) usize);

impl QueryId {
	pub const fn index(self) -> usize {
		self.0
	}
}

impl fmt::Display for QueryId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "query#{}", self.0)
	}
}

/// An expression vanishing on every row of its domain.
#[derive(Debug, Clone)]
pub struct GlobalConstraint<F: Field> {
	pub expr: Expression<F>,
	pub domain_size: usize,
	/// Also check the rows where a shifted read wraps around the column.
	pub no_bound_cancel: bool,
}

/// An expression vanishing on the first row, reads wrap cyclically.
#[derive(Debug, Clone)]
pub struct LocalConstraint<F: Field> {
	pub expr: Expression<F>,
	pub domain_size: usize,
}

/// Claims the first row of `column` equals the parameter `y`.
#[derive(Debug, Clone)]
pub struct LocalOpening {
	pub column: Column,
}

/// Claims the evaluations of several columns, read as polynomials over the roots of unity, at a
/// common point `x`.
#[derive(Debug, Clone)]
pub struct UnivariateEval {
	pub columns: Vec<Column>,
}

/// Claims the rows of the `a` fragments are a permutation of the rows of the `b` fragments.
///
/// Every fragment lists the columns of a table, all fragments share the same width.
#[derive(Debug, Clone)]
pub struct Permutation {
	pub a: Vec<Vec<Column>>,
	pub b: Vec<Vec<Column>>,
}

/// Numerator and denominator factors of a grand product over one column size.
#[derive(Debug, Clone)]
pub struct GrandProductInput<F: Field> {
	pub numerators: Vec<Expression<F>>,
	pub denominators: Vec<Expression<F>>,
}

/// Claims the product over every row and size of `Π numerators / Π denominators` equals the
/// parameter `y`.
#[derive(Debug, Clone)]
pub struct GrandProduct<F: Field> {
	pub inputs: BTreeMap<usize, GrandProductInput<F>>,
}

#[derive(Debug, Clone)]
pub enum Query<F: Field> {
	GlobalConstraint(GlobalConstraint<F>),
	LocalConstraint(LocalConstraint<F>),
	LocalOpening(LocalOpening),
	UnivariateEval(UnivariateEval),
	Permutation(Permutation),
	GrandProduct(GrandProduct<F>),
}

impl<F: Field> Query<F> {
	/// Whether the prover assigns [`QueryParams`] for this query.
	pub const fn is_parametrized(&self) -> bool {
		matches!(self, Self::LocalOpening(_) | Self::UnivariateEval(_) | Self::GrandProduct(_))
	}

	pub const fn kind(&self) -> &'static str {
		match self {
			Self::GlobalConstraint(_) => "global constraint",
			Self::LocalConstraint(_) => "local constraint",
			Self::LocalOpening(_) => "local opening",
			Self::UnivariateEval(_) => "univariate evaluation",
			Self::Permutation(_) => "permutation",
			Self::GrandProduct(_) => "grand product",
		}
	}

	/// Every column the query reads, shifted views included.
	pub fn columns(&self) -> Vec<Column> {
		match self {
			Self::GlobalConstraint(GlobalConstraint { expr, .. })
			| Self::LocalConstraint(LocalConstraint { expr, .. }) => expr.columns().collect(),
			Self::LocalOpening(LocalOpening { column }) => vec![*column],
			Self::UnivariateEval(UnivariateEval { columns }) => columns.clone(),
			Self::Permutation(Permutation { a, b }) => a.iter().chain(b).flatten().copied().collect(),
			Self::GrandProduct(GrandProduct { inputs }) => inputs
				.values()
				.flat_map(|input| input.numerators.iter().chain(&input.denominators))
				.flat_map(|expr| expr.columns())
				.collect(),
		}
	}
}

/// Runtime parameters of a parametrized query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParams<F> {
	LocalOpening { y: F },
	UnivariateEval { x: F, ys: Vec<F> },
	GrandProduct { y: F },
}

impl<F: Field> QueryParams<F> {
	/// The field elements absorbed by the transcript.
	pub fn transcript_elements(&self) -> Vec<F> {
		match self {
			Self::LocalOpening { y } | Self::GrandProduct { y } => vec![*y],
			Self::UnivariateEval { x, ys } => std::iter::once(*x).chain(ys.iter().copied()).collect(),
		}
	}
}

#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct QueryInfo<F: Field> {
	#[get_copy = "pub"]
	pub(crate) id: QueryId,
	#[get = "pub"]
	pub(crate) name: String,
	#[get_copy = "pub"]
	pub(crate) round: usize,
	#[get = "pub"]
	pub(crate) query: Query<F>,
	/// Set once a compiler pass has rewritten the query into lower-level ones.
	#[get_copy = "pub"]
	pub(crate) ignored: bool,
}
