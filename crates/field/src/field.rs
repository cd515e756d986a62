// Copyright 2024-2025 Irreducible Inc.

use std::{
	fmt::{Debug, Display},
	hash::Hash,
	iter::{Product, Sum},
	ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign},
};

use rand::RngCore;

use crate::{
	arithmetic_traits::{InvertOrZero, Square},
	Error,
};

/// This trait is based on `ff::Field` with some unused functionality removed.
pub trait Field:
	Sized
	+ Eq
	+ Copy
	+ Clone
	+ Default
	+ Send
	+ Sync
	+ Debug
	+ Display
	+ Hash
	+ 'static
	+ Neg<Output = Self>
	+ Add<Output = Self>
	+ Sub<Output = Self>
	+ Mul<Output = Self>
	+ Sum
	+ Product
	+ for<'a> Sum<&'a Self>
	+ for<'a> Product<&'a Self>
	+ AddAssign
	+ SubAssign
	+ MulAssign
	+ Square
	+ InvertOrZero
{
	/// The zero element of the field, the additive identity.
	const ZERO: Self;

	/// The one element of the field, the multiplicative identity.
	const ONE: Self;

	/// The characteristic of the field.
	const CHARACTERISTIC: u64;

	/// Returns an element chosen uniformly at random using a user-provided RNG.
	fn random(rng: impl RngCore) -> Self;

	/// Returns true iff this element is zero.
	fn is_zero(&self) -> bool {
		*self == Self::ZERO
	}

	/// Doubles this element.
	#[must_use]
	fn double(&self) -> Self {
		*self + *self
	}

	/// Computes the multiplicative inverse of this element,
	/// failing if the element is zero.
	fn invert(&self) -> Option<Self> {
		let inv = self.invert_or_zero();
		(!inv.is_zero()).then_some(inv)
	}

	/// Exponentiates `self` by `exp`.
	///
	/// Square-and-multiply, variable time in the exponent.
	fn pow(&self, exp: u64) -> Self {
		let mut res = Self::ONE;
		for i in (0..u64::BITS - exp.leading_zeros()).rev() {
			res = res.square();
			if (exp >> i) & 1 == 1 {
				res *= *self;
			}
		}
		res
	}
}

/// A prime field whose elements fit in a `u64`.
pub trait PrimeField: Field + From<u32> {
	/// The prime modulus.
	const MODULUS: u64;

	/// Creates an element from a canonical representative.
	///
	/// ## Throws
	///
	/// * [`Error::NotInField`] if `value >= Self::MODULUS`
	fn from_canonical_u64(value: u64) -> Result<Self, Error>;

	/// Creates an element by reducing `value` modulo the field characteristic.
	fn from_u64_reduced(value: u64) -> Self;

	/// The canonical representative in `[0, MODULUS)`.
	fn as_canonical_u64(&self) -> u64;

	/// Maps a uniformly random byte string into the field.
	///
	/// The first eight bytes are read in little-endian order and reduced. The modular bias is
	/// below `2^-32` for fields smaller than 32 bits.
	///
	/// ## Panics
	///
	/// Panics if `bytes` holds fewer than eight bytes. Hash digests are always long enough, a
	/// shorter input means the caller passed the wrong buffer.
	fn from_uniform_bytes(bytes: &[u8]) -> Self {
		assert!(bytes.len() >= 8, "need at least 8 bytes to sample a field element, got {}", bytes.len());
		let mut limb = [0u8; 8];
		limb.copy_from_slice(&bytes[..8]);
		Self::from_u64_reduced(u64::from_le_bytes(limb))
	}
}

/// A field with a multiplicative subgroup of order $2^k$ for every $k$ up to the two-adicity.
pub trait TwoAdicField: PrimeField {
	/// The largest $k$ such that $2^k$ divides $p - 1$.
	const TWO_ADICITY: usize;

	/// A generator of the full multiplicative group.
	const MULTIPLICATIVE_GENERATOR: Self;

	/// Returns a primitive $2^{log\_n}$-th root of unity.
	///
	/// ## Throws
	///
	/// * [`Error::TwoAdicityExceeded`] if `log_n` exceeds the two-adicity
	fn two_adic_generator(log_n: usize) -> Result<Self, Error> {
		if log_n > Self::TWO_ADICITY {
			return Err(Error::TwoAdicityExceeded {
				log_n,
				two_adicity: Self::TWO_ADICITY,
			});
		}
		Ok(Self::MULTIPLICATIVE_GENERATOR.pow((Self::MODULUS - 1) >> log_n))
	}
}
