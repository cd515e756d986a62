// Copyright 2024 Irreducible Inc.

//! Fiat-Shamir transcript deriving verifier randomness from prover-committed data.
//!
//! The transcript keeps a single running digest. Absorbing data hashes it together with the
//! current state, and every draw re-hashes the state before reading from it, so consecutive
//! draws never repeat.


use std::fmt;

use digest::{Digest, Output};
use groestl_crypto::Groestl256;
use wizard_field::PrimeField;

/// Keyed running hash state over a [`Digest`].
pub struct Transcript<H: Digest = Groestl256> {
	state: Output<H>,
}

impl<H: Digest> Default for Transcript<H> {
	fn default() -> Self {
		Self {
			state: Output::<H>::default(),
		}
	}
}

impl<H: Digest> Clone for Transcript<H> {
	fn clone(&self) -> Self {
		Self {
			state: self.state.clone(),
		}
	}
}

impl<H: Digest> fmt::Debug for Transcript<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Transcript(")?;
		for byte in self.state.iter() {
			write!(f, "{byte:02x}")?;
		}
		write!(f, ")")
	}
}

impl<H: Digest> Transcript<H> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Absorbs field elements by their canonical little-endian encoding.
	///
	/// An empty slice leaves the state untouched.
	pub fn update<F: PrimeField>(&mut self, elems: &[F]) {
		if elems.is_empty() {
			return;
		}

		let mut hasher = H::new();
		Digest::update(&mut hasher, &self.state);
		for elem in elems {
			Digest::update(&mut hasher, elem.as_canonical_u64().to_le_bytes());
		}
		self.state = hasher.finalize();
	}

	/// Advances the state and decodes it into a field element.
	pub fn random_field<F: PrimeField>(&mut self) -> F {
		self.advance();
		F::from_uniform_bytes(&self.state)
	}

	pub fn random_field_vec<F: PrimeField>(&mut self, len: usize) -> Vec<F> {
		(0..len).map(|_| self.random_field()).collect()
	}

	/// Draws `count` integers in `[0, modulus)`.
	///
	/// Each re-hash of the state yields one integer per 8-byte limb of the digest. A zero `count`
	/// returns without advancing the state.
	///
	/// ## Panics
	///
	/// Panics if `modulus` is zero or the digest is shorter than 8 bytes.
	pub fn random_integers(&mut self, count: usize, modulus: usize) -> Vec<usize> {
		if count == 0 {
			return Vec::new();
		}
		assert!(modulus > 0, "cannot sample integers below a zero modulus");
		assert!(<H as Digest>::output_size() >= 8, "digest is too short to sample integers");

		let mut integers = Vec::with_capacity(count);
		while integers.len() < count {
			self.advance();
			let limbs = self.state.chunks_exact(8).map(|limb| {
				let mut bytes = [0u8; 8];
				bytes.copy_from_slice(limb);
				(u64::from_le_bytes(bytes) % modulus as u64) as usize
			});
			integers.extend(limbs.take(count - integers.len()));
		}
		integers
	}

	/// Derives a field element from `(seed, name)` alone.
	///
	/// Does not read or write any transcript state, two calls with the same inputs agree.
	pub fn random_field_from_seed<F: PrimeField>(seed: &[u8], name: &str) -> F {
		let digest = H::new()
			.chain_update(seed)
			.chain_update(name.as_bytes())
			.finalize();
		F::from_uniform_bytes(&digest)
	}

	pub fn state(&self) -> &Output<H> {
		&self.state
	}

	pub fn set_state(&mut self, state: Output<H>) {
		self.state = state;
	}

	fn advance(&mut self) {
		self.state = H::digest(&self.state);
	}
}
