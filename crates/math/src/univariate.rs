// Copyright 2023-2024 Irreducible Inc.
// Copyright (c) 2022 The Plonky2 Authors

use rayon::prelude::*;
use wizard_field::{util::batch_invert, Field, TwoAdicField};
use wizard_utils::bail;

use super::error::Error;

/// A domain that univariate polynomials may be evaluated on.
///
/// An evaluation domain of size d + 1 along with polynomial values on that domain are sufficient
/// to reconstruct a degree <= d. This struct computes the Lagrange basis
/// both pointwise and in monomial form.
#[derive(Debug, Clone)]
pub struct EvaluationDomain<F: Field> {
	points: Vec<F>,
	weights: Vec<F>,
}

impl<F: Field> EvaluationDomain<F> {
	/// ## Throws
	///
	/// * [`Error::DuplicateDomainPoint`] if two points coincide
	pub fn from_points(points: Vec<F>) -> Result<Self, Error> {
		let weights = compute_barycentric_weights(&points)?;
		Ok(Self { points, weights })
	}

	pub fn size(&self) -> usize {
		self.points.len()
	}

	/// Compute a vector of Lagrange polynomial evaluations in $O(N)$ at a given point `x`.
	///
	/// For an evaluation domain consisting of points $\pi_i$ Lagrange polynomials $L_i(x)$
	/// are defined by
	/// $$L_i(x) = \prod_{j \neq i}\frac{x - \pi_j}{\pi_i - \pi_j}$$
	pub fn lagrange_evals(&self, x: F) -> Vec<F> {
		let num_evals = self.size();

		let mut result: Vec<F> = vec![F::ONE; num_evals];

		// Multiply the product suffixes
		for i in (1..num_evals).rev() {
			result[i - 1] = result[i] * (x - self.points[i]);
		}

		let mut prefix = F::ONE;

		// Multiply the product prefixes and weights
		for ((r, &point), &weight) in result.iter_mut().zip(&self.points).zip(&self.weights) {
			*r *= prefix * weight;
			prefix *= x - point;
		}

		result
	}

	/// Monomial coefficients of every Lagrange polynomial of the domain, in domain order.
	///
	/// Each basis polynomial has degree `size - 1` and is computed in $O(N)$ by dividing the
	/// vanishing polynomial of the domain by $(X - \pi_i)$.
	pub fn lagrange_polys(&self) -> Vec<Vec<F>> {
		let vanishing = vanishing_poly(&self.points);
		self.points
			.iter()
			.zip(&self.weights)
			.map(|(&point, &weight)| {
				let (mut quotient, _) = ruffini_div(&vanishing, point);
				scale_poly(&mut quotient, weight);
				quotient
			})
			.collect()
	}
}

/// Evaluates at `x` the polynomial whose values on the $n$-th roots of unity are `evals`.
///
/// Row $i$ of `evals` is read as $P(\omega^i)$ with $\omega$ the canonical primitive $n$-th root of
/// unity. Uses the barycentric formula
/// $$P(x) = \frac{x^n - 1}{n} \sum_i \frac{\omega^i y_i}{x - \omega^i},$$
/// falling back to a table lookup when `x` is itself in the domain.
///
/// ## Throws
///
/// * [`Error::PowerOfTwoDomainRequired`] if `evals` is not a power of two in length
pub fn interpolate_on_roots_of_unity<F: TwoAdicField>(evals: &[F], x: F) -> Result<F, Error> {
	let n = evals.len();
	if !n.is_power_of_two() {
		bail!(Error::PowerOfTwoDomainRequired { size: n });
	}
	let log_n = n.trailing_zeros() as usize;
	let omega = F::two_adic_generator(log_n)?;

	let domain = roots_of_unity(omega, n);
	if let Some(i) = domain.iter().position(|&point| point == x) {
		return Ok(evals[i]);
	}

	let denominators = domain.iter().map(|&point| x - point).collect::<Vec<_>>();
	let inverses = batch_invert(&denominators)?;
	let sum = domain
		.par_iter()
		.zip(evals.par_iter())
		.zip(inverses.par_iter())
		.map(|((&point, &y), &inv)| point * y * inv)
		.sum::<F>();

	let n_inv = F::from(n as u32)
		.invert()
		.expect("domain size is below the characteristic");
	Ok((x.pow(n as u64) - F::ONE) * n_inv * sum)
}

/// The first `n` powers of `omega`, starting from one.
pub fn roots_of_unity<F: Field>(omega: F, n: usize) -> Vec<F> {
	std::iter::successors(Some(F::ONE), |&power| Some(power * omega))
		.take(n)
		.collect()
}

/// Monomial coefficients of $\prod_i (X - \pi_i)$.
pub fn vanishing_poly<F: Field>(points: &[F]) -> Vec<F> {
	let mut coeffs = Vec::with_capacity(points.len() + 1);
	coeffs.push(F::ONE);
	for &point in points {
		// multiply by (X - point) in place
		coeffs.push(F::ZERO);
		for i in (1..coeffs.len()).rev() {
			let lower = coeffs[i - 1];
			coeffs[i] = lower - point * coeffs[i];
		}
		coeffs[0] = -point * coeffs[0];
	}
	coeffs
}

/// Divides a polynomial by $(X - root)$ with Ruffini's rule.
///
/// Returns the quotient, one coefficient shorter than `coeffs`, and the remainder, which equals
/// the evaluation of the dividend at `root`.
pub fn ruffini_div<F: Field>(coeffs: &[F], root: F) -> (Vec<F>, F) {
	let Some((&leading, rest)) = coeffs.split_last() else {
		return (Vec::new(), F::ZERO);
	};

	let mut quotient = vec![F::ZERO; rest.len()];
	let mut carry = leading;
	for (i, &coeff) in rest.iter().enumerate().rev() {
		quotient[i] = carry;
		carry = coeff + carry * root;
	}
	(quotient, carry)
}

/// Adds `scalar * rhs` into `lhs`, growing `lhs` as needed.
pub fn add_scaled_poly<F: Field>(lhs: &mut Vec<F>, rhs: &[F], scalar: F) {
	if lhs.len() < rhs.len() {
		lhs.resize(rhs.len(), F::ZERO);
	}
	for (l, &r) in lhs.iter_mut().zip(rhs) {
		*l += scalar * r;
	}
}

pub fn scale_poly<F: Field>(coeffs: &mut [F], scalar: F) {
	for coeff in coeffs.iter_mut() {
		*coeff *= scalar;
	}
}

fn compute_barycentric_weights<F: Field>(points: &[F]) -> Result<Vec<F>, Error> {
	let n = points.len();
	(0..n)
		.map(|i| {
			let product = (0..n)
				.filter(|&j| j != i)
				.map(|j| points[i] - points[j])
				.product::<F>();
			product.invert().ok_or(Error::DuplicateDomainPoint)
		})
		.collect()
}
