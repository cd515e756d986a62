// Copyright 2024-2025 Irreducible Inc.

//! Symbolic expressions over columns, coins and query parameters.

use std::ops::{Add, Mul, Neg, Sub};

use wizard_field::Field;
use wizard_math::ArithExpr;

use crate::{coin::CoinId, column::Column, query::QueryId};

/// A query parameter read inside an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessor {
	/// The `Y` of a local opening.
	LocalOpening(QueryId),
	/// The `index`-th claimed evaluation of a univariate evaluation query.
	UnivariateEval { query: QueryId, index: usize },
	/// The claimed product of a grand product query.
	GrandProduct(QueryId),
}

impl Accessor {
	pub const fn query(self) -> QueryId {
		match self {
			Self::LocalOpening(query) | Self::GrandProduct(query) => query,
			Self::UnivariateEval { query, .. } => query,
		}
	}
}

/// A leaf of an [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
	/// The current row of a (possibly shifted) column.
	Column(Column),
	/// A scalar random coin.
	Coin(CoinId),
	Accessor(Accessor),
	/// One on rows `i` with `i % period == offset`, zero elsewhere.
	PeriodicSample { period: usize, offset: usize },
}

/// Replacement for a variable, see [`Expression::substitute`].
#[derive(Debug, Clone, Copy)]
pub enum Substitute<F> {
	Variable(Variable),
	Constant(F),
}

/// An arithmetic expression together with the table of variables it reads.
///
/// `ArithExpr::Var(i)` refers to `vars[i]`. The table never holds duplicates, combining two
/// expressions merges their tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression<F: Field> {
	expr: ArithExpr<F>,
	vars: Vec<Variable>,
}

impl<F: Field> Expression<F> {
	pub fn variable(var: Variable) -> Self {
		Self {
			expr: ArithExpr::Var(0),
			vars: vec![var],
		}
	}

	pub fn column(column: impl Into<Column>) -> Self {
		Self::variable(Variable::Column(column.into()))
	}

	pub fn coin(coin: CoinId) -> Self {
		Self::variable(Variable::Coin(coin))
	}

	pub fn accessor(accessor: Accessor) -> Self {
		Self::variable(Variable::Accessor(accessor))
	}

	pub fn periodic_sample(period: usize, offset: usize) -> Self {
		Self::variable(Variable::PeriodicSample { period, offset })
	}

	pub fn constant(value: F) -> Self {
		Self {
			expr: ArithExpr::Const(value),
			vars: Vec::new(),
		}
	}

	pub fn one() -> Self {
		Self::constant(F::ONE)
	}

	#[must_use]
	pub fn pow(self, exp: u64) -> Self {
		Self {
			expr: self.expr.pow(exp),
			vars: self.vars,
		}
	}

	pub fn vars(&self) -> &[Variable] {
		&self.vars
	}

	pub fn degree(&self) -> usize {
		self.expr.degree()
	}

	pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
		self.vars.iter().filter_map(|var| match var {
			Variable::Column(column) => Some(*column),
			_ => None,
		})
	}

	/// Smallest and largest shift among the columns read, `None` without columns.
	pub fn shift_range(&self) -> Option<(isize, isize)> {
		self.columns().fold(None, |range, column| {
			let shift = column.shift();
			Some(match range {
				None => (shift, shift),
				Some((min, max)) => (min.min(shift), max.max(shift)),
			})
		})
	}

	/// Evaluates the expression given one value per variable, in table order.
	pub fn evaluate(&self, values: &[F]) -> F {
		self.expr.evaluate(values)
	}

	/// Rewrites every variable, replacing some of them by constants.
	///
	/// Variables mapped to the same replacement are merged in the new table.
	pub fn substitute(&self, mut f: impl FnMut(&Variable) -> Substitute<F>) -> Self {
		let mut expr = self.expr.clone();
		let mut vars = Vec::with_capacity(self.vars.len());
		let mut indices = Vec::with_capacity(self.vars.len());
		for (index, var) in self.vars.iter().enumerate() {
			match f(var) {
				Substitute::Variable(new_var) => indices.push(intern(&mut vars, new_var)),
				Substitute::Constant(value) => {
					expr = expr.const_subst(index, value);
					// no occurrence is left, any index does
					indices.push(0);
				}
			}
		}
		let expr = expr
			.remap_vars(&indices)
			.expect("indices cover every variable of the table");
		Self { expr, vars }
	}

	fn combine(self, rhs: Self, op: impl FnOnce(ArithExpr<F>, ArithExpr<F>) -> ArithExpr<F>) -> Self {
		let mut vars = self.vars;
		let indices = rhs
			.vars
			.into_iter()
			.map(|var| intern(&mut vars, var))
			.collect::<Vec<_>>();
		let rhs_expr = rhs
			.expr
			.remap_vars(&indices)
			.expect("indices cover every variable of the table");
		Self {
			expr: op(self.expr, rhs_expr),
			vars,
		}
	}
}

fn intern(vars: &mut Vec<Variable>, var: Variable) -> usize {
	match vars.iter().position(|existing| *existing == var) {
		Some(index) => index,
		None => {
			vars.push(var);
			vars.len() - 1
		}
	}
}

impl<F: Field> From<Column> for Expression<F> {
	fn from(column: Column) -> Self {
		Self::column(column)
	}
}

impl<F: Field> Add for Expression<F> {
	type Output = Self;

	fn add(self, rhs: Self) -> Self {
		self.combine(rhs, |lhs, rhs| lhs + rhs)
	}
}

impl<F: Field> Sub for Expression<F> {
	type Output = Self;

	fn sub(self, rhs: Self) -> Self {
		self.combine(rhs, |lhs, rhs| lhs - rhs)
	}
}

impl<F: Field> Mul for Expression<F> {
	type Output = Self;

	fn mul(self, rhs: Self) -> Self {
		self.combine(rhs, |lhs, rhs| lhs * rhs)
	}
}

impl<F: Field> Mul<F> for Expression<F> {
	type Output = Self;

	fn mul(self, rhs: F) -> Self {
		self * Self::constant(rhs)
	}
}

impl<F: Field> Neg for Expression<F> {
	type Output = Self;

	fn neg(self) -> Self {
		Self {
			expr: -self.expr,
			vars: self.vars,
		}
	}
}

impl<F: Field> std::iter::Sum for Expression<F> {
	fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
		iter.reduce(|acc, item| acc + item)
			.unwrap_or_else(|| Self::constant(F::ZERO))
	}
}

impl<F: Field> std::iter::Product for Expression<F> {
	fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
		iter.reduce(|acc, item| acc * item).unwrap_or_else(Self::one)
	}
}
