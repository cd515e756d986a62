// Copyright 2024-2025 Irreducible Inc.

use std::{
	fmt::{self, Debug, Display},
	iter::{Product, Sum},
	ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign},
};

use rand::{Rng, RngCore};

use crate::{
	arithmetic_traits::{InvertOrZero, Square},
	field::{Field, PrimeField, TwoAdicField},
	Error,
};

const P: u32 = 0x7f00_0001;

/// An element of the KoalaBear prime field, $p = 2^{31} - 2^{24} + 1$.
///
/// Elements are stored in canonical form, so the derived `Eq` and `Hash` are sound.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct KoalaBear(u32);

impl KoalaBear {
	/// Creates an element, reducing `value` modulo $p$.
	pub const fn new(value: u32) -> Self {
		Self(value % P)
	}

	pub const fn val(self) -> u32 {
		self.0
	}
}

impl Debug for KoalaBear {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "KoalaBear({})", self.0)
	}
}

impl Display for KoalaBear {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<u32> for KoalaBear {
	fn from(value: u32) -> Self {
		Self::new(value)
	}
}

impl Add for KoalaBear {
	type Output = Self;

	#[inline]
	fn add(self, rhs: Self) -> Self {
		// both operands are below 2^31, the sum cannot overflow
		let sum = self.0 + rhs.0;
		Self(if sum >= P { sum - P } else { sum })
	}
}

impl Sub for KoalaBear {
	type Output = Self;

	#[inline]
	fn sub(self, rhs: Self) -> Self {
		Self(if self.0 >= rhs.0 {
			self.0 - rhs.0
		} else {
			self.0 + P - rhs.0
		})
	}
}

impl Mul for KoalaBear {
	type Output = Self;

	#[inline]
	fn mul(self, rhs: Self) -> Self {
		Self(((self.0 as u64 * rhs.0 as u64) % P as u64) as u32)
	}
}

impl Neg for KoalaBear {
	type Output = Self;

	#[inline]
	fn neg(self) -> Self {
		Self(if self.0 == 0 { 0 } else { P - self.0 })
	}
}

impl AddAssign for KoalaBear {
	fn add_assign(&mut self, rhs: Self) {
		*self = *self + rhs;
	}
}

impl SubAssign for KoalaBear {
	fn sub_assign(&mut self, rhs: Self) {
		*self = *self - rhs;
	}
}

impl MulAssign for KoalaBear {
	fn mul_assign(&mut self, rhs: Self) {
		*self = *self * rhs;
	}
}

impl Sum for KoalaBear {
	fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
		iter.fold(Self::ZERO, |acc, x| acc + x)
	}
}

impl<'a> Sum<&'a KoalaBear> for KoalaBear {
	fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
		iter.copied().sum()
	}
}

impl Product for KoalaBear {
	fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
		iter.fold(Self::ONE, |acc, x| acc * x)
	}
}

impl<'a> Product<&'a KoalaBear> for KoalaBear {
	fn product<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
		iter.copied().product()
	}
}

impl Square for KoalaBear {
	fn square(self) -> Self {
		self * self
	}
}

impl InvertOrZero for KoalaBear {
	fn invert_or_zero(self) -> Self {
		// Fermat, maps zero to zero
		self.pow((P - 2) as u64)
	}
}

impl Field for KoalaBear {
	const ZERO: Self = Self(0);
	const ONE: Self = Self(1);
	const CHARACTERISTIC: u64 = P as u64;

	fn random(mut rng: impl RngCore) -> Self {
		Self(rng.gen_range(0..P))
	}
}

impl PrimeField for KoalaBear {
	const MODULUS: u64 = P as u64;

	fn from_canonical_u64(value: u64) -> Result<Self, Error> {
		if value >= Self::MODULUS {
			return Err(Error::NotInField { value });
		}
		Ok(Self(value as u32))
	}

	fn from_u64_reduced(value: u64) -> Self {
		Self((value % Self::MODULUS) as u32)
	}

	fn as_canonical_u64(&self) -> u64 {
		self.0 as u64
	}
}

impl TwoAdicField for KoalaBear {
	// p - 1 = 2^24 * 127
	const TWO_ADICITY: usize = 24;
	const MULTIPLICATIVE_GENERATOR: Self = Self(3);
}
