// Copyright 2024-2025 Irreducible Inc.

use std::{
	convert::Infallible,
	ops::{Add, Mul, Neg, Sub},
};

use wizard_field::Field;

use super::error::Error;

/// Arithmetic expression over a prime field.
///
/// Leaves are constants or variables `Var(i)` standing for the `i`-th entry of the assignment
/// passed to [`Self::evaluate`]. Subtraction is encoded as addition of the product by `-1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArithExpr<F: Field> {
	Const(F),
	Var(usize),
	Add(Box<ArithExpr<F>>, Box<ArithExpr<F>>),
	Mul(Box<ArithExpr<F>>, Box<ArithExpr<F>>),
	Pow(Box<ArithExpr<F>>, u64),
}

impl<F: Field> ArithExpr<F> {
	/// The total degree of the polynomial the expression represents.
	pub fn degree(&self) -> usize {
		match self {
			Self::Const(_) => 0,
			Self::Var(_) => 1,
			Self::Add(left, right) => left.degree().max(right.degree()),
			Self::Mul(left, right) => left.degree() + right.degree(),
			Self::Pow(base, exp) => base.degree() * *exp as usize,
		}
	}

	pub fn pow(self, exp: u64) -> Self {
		Self::Pow(Box::new(self), exp)
	}

	/// Renames every variable `Var(i)` to `Var(indices[i])`.
	///
	/// ## Throws
	///
	/// * [`Error::IncorrectArgumentLength`] if some variable has no entry in `indices`
	pub fn remap_vars(self, indices: &[usize]) -> Result<Self, Error> {
		self.try_map_vars(&mut |index| {
			indices
				.get(index)
				.map(|&new_index| Self::Var(new_index))
				.ok_or_else(|| Error::IncorrectArgumentLength {
					arg: "indices".to_string(),
					expected: index + 1,
				})
		})
	}

	/// Replaces every occurrence of `Var(var)` with the constant `value`.
	pub fn const_subst(self, var: usize, value: F) -> Self {
		let substituted = self.try_map_vars(&mut |index| {
			Ok::<_, Infallible>(if index == var {
				Self::Const(value)
			} else {
				Self::Var(index)
			})
		});
		match substituted {
			Ok(expr) => expr,
			Err(never) => match never {},
		}
	}

	/// Rebuilds the tree with every variable leaf replaced by `f(index)`.
	fn try_map_vars<E>(self, f: &mut impl FnMut(usize) -> Result<Self, E>) -> Result<Self, E> {
		Ok(match self {
			Self::Const(_) => self,
			Self::Var(index) => f(index)?,
			Self::Add(left, right) => {
				Self::Add(Box::new(left.try_map_vars(f)?), Box::new(right.try_map_vars(f)?))
			}
			Self::Mul(left, right) => {
				Self::Mul(Box::new(left.try_map_vars(f)?), Box::new(right.try_map_vars(f)?))
			}
			Self::Pow(base, exp) => Self::Pow(Box::new(base.try_map_vars(f)?), exp),
		})
	}

	/// Evaluates the expression on an assignment of its variables.
	///
	/// Panics if some variable index is out of range of `vars`.
	pub fn evaluate(&self, vars: &[F]) -> F {
		match self {
			Self::Const(val) => *val,
			Self::Var(index) => vars[*index],
			Self::Add(left, right) => left.evaluate(vars) + right.evaluate(vars),
			Self::Mul(left, right) => left.evaluate(vars) * right.evaluate(vars),
			Self::Pow(base, exp) => base.evaluate(vars).pow(*exp),
		}
	}
}

impl<F: Field> Add for ArithExpr<F> {
	type Output = Self;

	fn add(self, rhs: Self) -> Self {
		Self::Add(Box::new(self), Box::new(rhs))
	}
}

impl<F: Field> Sub for ArithExpr<F> {
	type Output = Self;

	fn sub(self, rhs: Self) -> Self {
		self + (-rhs)
	}
}

impl<F: Field> Neg for ArithExpr<F> {
	type Output = Self;

	fn neg(self) -> Self {
		Self::Mul(Box::new(Self::Const(-F::ONE)), Box::new(self))
	}
}

impl<F: Field> Mul for ArithExpr<F> {
	type Output = Self;

	fn mul(self, rhs: Self) -> Self {
		Self::Mul(Box::new(self), Box::new(rhs))
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;
	use wizard_field::KoalaBear;

	use super::*;

	type F = KoalaBear;

	#[test]
	fn test_degree_with_pow() {
		let expr = ArithExpr::Const(F::new(6)).pow(7);
		assert_eq!(expr.degree(), 0);

		let expr: ArithExpr<F> = ArithExpr::Var(0).pow(7);
		assert_eq!(expr.degree(), 7);

		let expr: ArithExpr<F> = (ArithExpr::Var(0) * ArithExpr::Var(1)).pow(7);
		assert_eq!(expr.degree(), 14);
	}

	#[test]
	fn test_sub_evaluates_in_prime_field() {
		let expr = ArithExpr::<F>::Var(0) - ArithExpr::Var(1) * ArithExpr::Const(F::new(3));
		assert_eq!(expr.evaluate(&[F::new(10), F::new(2)]), F::new(4));
		assert_eq!(expr.evaluate(&[F::new(1), F::new(1)]), -F::new(2));
		assert_eq!(expr.degree(), 1);
	}

	#[test]
	fn test_remap_vars_with_too_few_indices() {
		let expr = ((ArithExpr::Var(0) + ArithExpr::Const(F::ONE)) * ArithExpr::Var(1)).pow(3);
		assert_matches!(
			expr.remap_vars(&[5]),
			Err(Error::IncorrectArgumentLength { expected: 2, .. })
		);
	}

	#[test]
	fn test_remap_vars_can_merge_variables() {
		let expr = (ArithExpr::Var(0) + ArithExpr::Const(F::ONE)) * ArithExpr::Var(1);
		let merged = expr.remap_vars(&[0, 0]).unwrap();
		assert_eq!(
			merged,
			(ArithExpr::Var(0) + ArithExpr::Const(F::ONE)) * ArithExpr::Var(0)
		);
		// (4 + 1) * 4
		assert_eq!(merged.evaluate(&[F::new(4)]), F::new(20));
	}

	#[test]
	fn test_const_subst_keeps_other_variables() {
		let expr = ArithExpr::Var(0) * ArithExpr::Var(1) + ArithExpr::Var(1).pow(2);
		let substituted = expr.const_subst(1, F::new(3));
		assert_eq!(substituted.degree(), 1);
		// 5 * 3 + 3^2
		assert_eq!(substituted.evaluate(&[F::new(5)]), F::new(24));
	}
}
