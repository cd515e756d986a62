// Copyright 2024 Ulvetanna Inc.

use std::iter;

use rayon::prelude::*;

use crate::{Error, Field};

/// Computes the inner product of two vectors without checking that the lengths are equal
pub fn inner_product_unchecked<F: Field>(a: impl Iterator<Item = F>, b: impl Iterator<Item = F>) -> F {
	a.zip(b).map(|(a_i, b_i)| a_i * b_i).sum::<F>()
}

/// Iterate the powers of a given value, beginning with 1 (the 0'th power).
pub fn powers<F: Field>(val: F) -> impl Iterator<Item = F> {
	iter::successors(Some(F::ONE), move |&power| Some(power * val))
}

/// Inverts every element of `values` with a single field inversion.
///
/// Montgomery's trick: accumulate prefix products, invert the total, then walk back. Costs one
/// inversion and `3(n - 1)` multiplications.
///
/// ## Throws
///
/// * [`Error::ZeroInBatchInversion`] with the index of the first zero element
pub fn batch_invert<F: Field>(values: &[F]) -> Result<Vec<F>, Error> {
	let mut prefix = Vec::with_capacity(values.len());
	let mut acc = F::ONE;
	for (index, &value) in values.iter().enumerate() {
		if value.is_zero() {
			return Err(Error::ZeroInBatchInversion { index });
		}
		prefix.push(acc);
		acc *= value;
	}

	let mut inv_acc = acc
		.invert()
		.expect("product of non-zero elements is non-zero");
	let mut result = vec![F::ZERO; values.len()];
	for i in (0..values.len()).rev() {
		result[i] = inv_acc * prefix[i];
		inv_acc *= values[i];
	}
	Ok(result)
}

/// Parallel version of [`batch_invert`], inverting independent chunks on the rayon pool.
pub fn batch_invert_par<F: Field>(values: &[F]) -> Result<Vec<F>, Error> {
	const CHUNK_SIZE: usize = 1 << 12;
	if values.len() <= CHUNK_SIZE {
		return batch_invert(values);
	}

	let chunks = values
		.par_chunks(CHUNK_SIZE)
		.enumerate()
		.map(|(i, chunk)| {
			batch_invert(chunk).map_err(|err| match err {
				Error::ZeroInBatchInversion { index } => Error::ZeroInBatchInversion {
					index: i * CHUNK_SIZE + index,
				},
				other => other,
			})
		})
		.collect::<Result<Vec<_>, _>>()?;
	Ok(chunks.into_iter().flatten().collect())
}
