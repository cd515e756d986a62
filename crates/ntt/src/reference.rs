// Copyright 2024 Ulvetanna Inc.

//! Quadratic-time reference transform on field elements, for testing.

use wizard_field::TwoAdicField;

pub fn forward_transform_simple<F: TwoAdicField>(coeffs: &[F]) -> Vec<F> {
	let n = coeffs.len();
	assert!(n.is_power_of_two());
	let omega = F::two_adic_generator(n.trailing_zeros() as usize).unwrap();

	let mut point = F::ONE;
	(0..n)
		.map(|_| {
			let eval = coeffs.iter().rev().fold(F::ZERO, |acc, &c| acc * point + c);
			point *= omega;
			eval
		})
		.collect()
}
