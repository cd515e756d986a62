// Copyright 2024-2025 Irreducible Inc.

use wizard_field::TwoAdicField;

use super::error::Error;

/// A multiplicative number-theoretic transform.
///
/// An `NTT` with maximum domain dimension $\ell$ can transform any buffer of length $2^k$ with
/// $k \le \ell$. The evaluation domain for a buffer of length $2^k$ is the subgroup generated by
/// the primitive $2^k$-th root of unity $\omega_k$, taken in natural order.
pub trait NTT<F: TwoAdicField> {
	/// Base-2 logarithm of the maximum size of the NTT domain, $\ell$.
	fn log_domain_size(&self) -> usize;

	/// Transforms monomial coefficients into evaluations over the subgroup, in place.
	///
	/// After the call `data[i]` holds $\sum_j c_j \omega_k^{ij}$.
	fn forward_transform(&self, data: &mut [F]) -> Result<(), Error>;

	/// Transforms evaluations over the subgroup into monomial coefficients, in place.
	fn inverse_transform(&self, data: &mut [F]) -> Result<(), Error>;
}
