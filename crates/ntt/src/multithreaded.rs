// Copyright 2024-2025 Irreducible Inc.

use rayon::prelude::*;
use wizard_field::TwoAdicField;

use super::{
	error::Error,
	ntt::NTT,
	single_threaded::{
		bit_reverse_permute, butterfly_block, check_transform_inputs, scale_by_inverse_size,
		transform, SingleThreadedNTT,
	},
	twiddle::TwiddleAccess,
};
use crate::twiddle::OnTheFlyTwiddleAccess;

/// Below this size the transform runs on the calling thread.
const LOG_PARALLEL_THRESHOLD: usize = 10;

/// Implementation of `NTT` that spreads the butterfly layers over the rayon pool.
#[derive(Debug, Clone)]
pub struct MultithreadedNTT<F: TwoAdicField, TA: TwiddleAccess<F> = OnTheFlyTwiddleAccess<F>> {
	single_threaded: SingleThreadedNTT<F, TA>,
}

impl<F: TwoAdicField, TA: TwiddleAccess<F> + Sync> SingleThreadedNTT<F, TA> {
	/// Returns multithreaded NTT implementation which uses the global rayon pool.
	pub fn multithreaded(self) -> MultithreadedNTT<F, TA> {
		MultithreadedNTT {
			single_threaded: self,
		}
	}
}

impl<F, TA> NTT<F> for MultithreadedNTT<F, TA>
where
	F: TwoAdicField,
	TA: TwiddleAccess<F> + Sync,
{
	fn log_domain_size(&self) -> usize {
		self.single_threaded.log_domain_size()
	}

	fn forward_transform(&self, data: &mut [F]) -> Result<(), Error> {
		let log_n = check_transform_inputs(self.log_domain_size(), data)?;
		transform_par(data, log_n, &self.single_threaded.forward);
		Ok(())
	}

	fn inverse_transform(&self, data: &mut [F]) -> Result<(), Error> {
		let log_n = check_transform_inputs(self.log_domain_size(), data)?;
		transform_par(data, log_n, &self.single_threaded.inverse);
		scale_by_inverse_size(data);
		Ok(())
	}
}

fn transform_par<F, TA>(data: &mut [F], log_n: usize, twiddles: &TA)
where
	F: TwoAdicField,
	TA: TwiddleAccess<F> + Sync,
{
	if log_n < LOG_PARALLEL_THRESHOLD {
		return transform(data, log_n, twiddles);
	}

	bit_reverse_permute(data);
	for layer in 0..log_n {
		let block_len = 2 << layer;
		let stride = 1 << (twiddles.log_n() - layer - 1);
		if data.len() / block_len >= rayon::current_num_threads() {
			data.par_chunks_exact_mut(block_len)
				.for_each(|block| butterfly_block(block, twiddles, stride));
		} else {
			// few wide blocks: split each block's butterflies instead
			for block in data.chunks_exact_mut(block_len) {
				let (lo, hi) = block.split_at_mut(block_len / 2);
				lo.par_iter_mut()
					.zip(hi.par_iter_mut())
					.enumerate()
					.for_each(|(k, (u, v))| {
						let t = *v * twiddles.get(k * stride);
						*v = *u - t;
						*u += t;
					});
			}
		}
	}
}
