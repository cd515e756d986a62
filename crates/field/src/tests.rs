// Copyright 2024 Irreducible Inc.

use std::iter::repeat_with;

use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
	util::{batch_invert, batch_invert_par, inner_product_unchecked, powers},
	Error, Field, KoalaBear, PrimeField, TwoAdicField,
};

type F = KoalaBear;

#[test]
fn test_wraparound() {
	let minus_one = -F::ONE;
	assert_eq!(minus_one.val(), 0x7f00_0000);
	assert_eq!(minus_one + F::ONE, F::ZERO);
	assert_eq!(minus_one * minus_one, F::ONE);
	assert_eq!(F::ZERO - F::ONE, minus_one);
}

#[test]
fn test_invert_zero() {
	assert_eq!(F::ZERO.invert(), None);
	assert_eq!(F::new(2).invert(), Some(F::new(0x3f80_0001)));
}

#[test]
fn test_from_canonical() {
	assert_eq!(F::from_canonical_u64(5), Ok(F::new(5)));
	assert_eq!(
		F::from_canonical_u64(F::MODULUS),
		Err(Error::NotInField { value: F::MODULUS })
	);
	assert_eq!(F::from_u64_reduced(F::MODULUS + 3), F::new(3));
}

#[test]
fn test_from_uniform_bytes() {
	let bytes = [1, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff];
	assert_eq!(F::from_uniform_bytes(&bytes), F::ONE);
}

#[test]
#[should_panic]
fn test_from_uniform_bytes_too_short() {
	let _ = F::from_uniform_bytes(&[1, 2, 3]);
}

#[test]
fn test_two_adic_generators() {
	for log_n in 0..=F::TWO_ADICITY {
		let omega = F::two_adic_generator(log_n).unwrap();
		assert_eq!(omega.pow(1 << log_n), F::ONE);
		if log_n > 0 {
			assert_ne!(omega.pow(1 << (log_n - 1)), F::ONE);
		}
	}
	assert_eq!(F::two_adic_generator(1).unwrap(), -F::ONE);
	assert_eq!(
		F::two_adic_generator(25),
		Err(Error::TwoAdicityExceeded {
			log_n: 25,
			two_adicity: 24
		})
	);
}

#[test]
fn test_batch_invert() {
	let mut rng = StdRng::seed_from_u64(0);
	let values = repeat_with(|| F::random(&mut rng))
		.filter(|x| !x.is_zero())
		.take(100)
		.collect::<Vec<_>>();
	let inverses = batch_invert(&values).unwrap();
	for (value, inverse) in values.iter().zip(&inverses) {
		assert_eq!(*value * *inverse, F::ONE);
	}
}

#[test]
fn test_batch_invert_reports_zero() {
	let values = [F::new(3), F::new(4), F::ZERO, F::new(5)];
	assert_eq!(batch_invert(&values), Err(Error::ZeroInBatchInversion { index: 2 }));
	assert_eq!(batch_invert::<F>(&[]), Ok(vec![]));
}

#[test]
fn test_batch_invert_par_matches_sequential() {
	let values = (1..20_000u32).map(F::new).collect::<Vec<_>>();
	assert_eq!(batch_invert_par(&values).unwrap(), batch_invert(&values).unwrap());

	let mut with_zero = values.clone();
	with_zero[12_345] = F::ZERO;
	assert_eq!(batch_invert_par(&with_zero), Err(Error::ZeroInBatchInversion { index: 12_345 }));
}

#[test]
fn test_powers_and_inner_product() {
	let x = F::new(7);
	let pows = powers(x).take(4).collect::<Vec<_>>();
	assert_eq!(pows, vec![F::new(1), F::new(7), F::new(49), F::new(343)]);
	let ones = std::iter::repeat(F::ONE);
	assert_eq!(inner_product_unchecked(pows.into_iter(), ones), F::new(400));
}

proptest! {
	#[test]
	fn test_field_axioms(a in 0u32.., b in 0u32.., c in 0u32..) {
		let (a, b, c) = (F::new(a), F::new(b), F::new(c));
		prop_assert_eq!(a + b, b + a);
		prop_assert_eq!(a * b, b * a);
		prop_assert_eq!((a + b) * c, a * c + b * c);
		prop_assert_eq!(a - b + b, a);
		prop_assert_eq!(a.double(), a + a);
	}

	#[test]
	fn test_invert(a in 1u32..0x7f00_0001) {
		let a = F::new(a);
		prop_assert_eq!(a * a.invert().unwrap(), F::ONE);
	}

	#[test]
	fn test_pow_matches_repeated_mul(a in 0u32.., e in 0u64..64) {
		let a = F::new(a);
		let expected = (0..e).fold(F::ONE, |acc, _| acc * a);
		prop_assert_eq!(a.pow(e), expected);
	}
}
