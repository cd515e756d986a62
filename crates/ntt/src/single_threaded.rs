// Copyright 2024-2025 Irreducible Inc.

use std::marker::PhantomData;

use wizard_field::TwoAdicField;
use wizard_utils::bail;

use super::{error::Error, ntt::NTT, twiddle::TwiddleAccess};
use crate::twiddle::{OnTheFlyTwiddleAccess, PrecomputedTwiddleAccess};

/// Implementation of `NTT` that performs the computation on the calling thread.
#[derive(Debug, Clone)]
pub struct SingleThreadedNTT<F: TwoAdicField, TA: TwiddleAccess<F> = OnTheFlyTwiddleAccess<F>> {
	pub(crate) forward: TA,
	pub(crate) inverse: TA,
	_marker: PhantomData<F>,
}

impl<F: TwoAdicField> SingleThreadedNTT<F> {
	/// Default constructor, computing twiddles on the fly.
	pub fn new(log_domain_size: usize) -> Result<Self, Error> {
		let (forward, inverse) = OnTheFlyTwiddleAccess::generate(log_domain_size)?;
		Ok(Self::with_twiddles(forward, inverse))
	}

	/// Precomputes the full twiddle tables, trading memory for speed.
	pub fn precompute_twiddles(&self) -> SingleThreadedNTT<F, PrecomputedTwiddleAccess<F>> {
		SingleThreadedNTT::with_twiddles(
			PrecomputedTwiddleAccess::from_on_the_fly(&self.forward),
			PrecomputedTwiddleAccess::from_on_the_fly(&self.inverse),
		)
	}
}

impl<F: TwoAdicField, TA: TwiddleAccess<F>> SingleThreadedNTT<F, TA> {
	pub(crate) fn with_twiddles(forward: TA, inverse: TA) -> Self {
		Self {
			forward,
			inverse,
			_marker: PhantomData,
		}
	}
}

impl<F, TA> NTT<F> for SingleThreadedNTT<F, TA>
where
	F: TwoAdicField,
	TA: TwiddleAccess<F>,
{
	fn log_domain_size(&self) -> usize {
		self.forward.log_n()
	}

	fn forward_transform(&self, data: &mut [F]) -> Result<(), Error> {
		let log_n = check_transform_inputs(self.log_domain_size(), data)?;
		transform(data, log_n, &self.forward);
		Ok(())
	}

	fn inverse_transform(&self, data: &mut [F]) -> Result<(), Error> {
		let log_n = check_transform_inputs(self.log_domain_size(), data)?;
		transform(data, log_n, &self.inverse);
		scale_by_inverse_size(data);
		Ok(())
	}
}

pub(crate) fn check_transform_inputs<F>(log_domain_size: usize, data: &[F]) -> Result<usize, Error> {
	if !data.len().is_power_of_two() {
		bail!(Error::PowerOfTwoLengthRequired);
	}
	let log_n = data.len().trailing_zeros() as usize;
	if log_n > log_domain_size {
		bail!(Error::DomainTooSmall {
			log_required_domain_size: log_n,
		});
	}
	Ok(log_n)
}

pub(crate) fn bit_reverse_permute<F>(data: &mut [F]) {
	let n = data.len();
	if n <= 2 {
		return;
	}
	let shift = usize::BITS - n.trailing_zeros();
	for i in 0..n {
		let j = i.reverse_bits() >> shift;
		if i < j {
			data.swap(i, j);
		}
	}
}

/// One radix-2 layer on a block of `2 * half` elements.
///
/// `stride` maps the block-local twiddle index onto the full twiddle table.
#[inline]
pub(crate) fn butterfly_block<F: TwoAdicField>(
	block: &mut [F],
	twiddles: &impl TwiddleAccess<F>,
	stride: usize,
) {
	let half = block.len() / 2;
	let (lo, hi) = block.split_at_mut(half);
	for (k, (u, v)) in lo.iter_mut().zip(hi.iter_mut()).enumerate() {
		let t = *v * twiddles.get(k * stride);
		*v = *u - t;
		*u += t;
	}
}

/// Decimation-in-time transform: bit-reversed input, natural-order output.
pub(crate) fn transform<F: TwoAdicField>(
	data: &mut [F],
	log_n: usize,
	twiddles: &impl TwiddleAccess<F>,
) {
	bit_reverse_permute(data);
	for layer in 0..log_n {
		let block_len = 2 << layer;
		let stride = 1 << (twiddles.log_n() - layer - 1);
		for block in data.chunks_exact_mut(block_len) {
			butterfly_block(block, twiddles, stride);
		}
	}
}

pub(crate) fn scale_by_inverse_size<F: TwoAdicField>(data: &mut [F]) {
	let n_inv = F::from(data.len() as u32)
		.invert()
		.expect("domain size is below the characteristic");
	for x in data.iter_mut() {
		*x *= n_inv;
	}
}
