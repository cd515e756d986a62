// Copyright 2024 Irreducible Inc.

use wizard_field::{Field, TwoAdicField};

use crate::Error;

/// A trait for accessing the twiddle factors of a radix-2 transform.
///
/// The twiddle factors of a domain of size $2^\ell$ are the powers $\omega^i$ for
/// $i < 2^{\ell - 1}$, where $\omega$ is a primitive $2^\ell$-th root of unity (or its inverse,
/// for the inverse transform). A transform on a smaller buffer of size $2^k$ reads them with a
/// stride of $2^{\ell - k}$.
pub trait TwiddleAccess<F: Field> {
	/// Base-2 logarithm of the domain the twiddles were generated for.
	fn log_n(&self) -> usize;

	/// Get the twiddle factor $\omega^{index}$.
	///
	/// Panics if `index` is not in the range 0 to `1 << (self.log_n() - 1)`.
	fn get(&self, index: usize) -> F;
}

/// Twiddle access method that does on-the-fly computation to reduce its memory footprint.
#[derive(Debug, Clone)]
pub struct OnTheFlyTwiddleAccess<F> {
	log_n: usize,
	root: F,
}

impl<F: TwoAdicField> OnTheFlyTwiddleAccess<F> {
	/// Twiddles of the forward and inverse transforms over a domain of size `2^log_n`.
	pub fn generate(log_n: usize) -> Result<(Self, Self), Error> {
		let root = F::two_adic_generator(log_n)?;
		let inv_root = root.invert().expect("roots of unity are non-zero");
		Ok((Self { log_n, root }, Self { log_n, root: inv_root }))
	}
}

impl<F: Field> TwiddleAccess<F> for OnTheFlyTwiddleAccess<F> {
	#[inline]
	fn log_n(&self) -> usize {
		self.log_n
	}

	#[inline]
	fn get(&self, index: usize) -> F {
		self.root.pow(index as u64)
	}
}

/// Twiddle access method using a precomputed table of all powers.
#[derive(Debug, Clone)]
pub struct PrecomputedTwiddleAccess<F> {
	log_n: usize,
	powers: Vec<F>,
}

impl<F: Field> PrecomputedTwiddleAccess<F> {
	pub fn from_on_the_fly(twiddles: &OnTheFlyTwiddleAccess<F>) -> Self {
		let half = (1usize << twiddles.log_n) >> 1;
		let powers = std::iter::successors(Some(F::ONE), |&power| Some(power * twiddles.root))
			.take(half)
			.collect();
		Self {
			log_n: twiddles.log_n,
			powers,
		}
	}
}

impl<F: Field> TwiddleAccess<F> for PrecomputedTwiddleAccess<F> {
	#[inline]
	fn log_n(&self) -> usize {
		self.log_n
	}

	#[inline]
	fn get(&self, index: usize) -> F {
		self.powers[index]
	}
}
