// Copyright 2024 Irreducible Inc.

/// Non-negative remainder of `a` modulo `n`.
///
/// Row offsets are signed while column sizes are not, this brings a signed offset back into
/// `[0, n)`. Panics if `n` is zero.
pub const fn posmod(a: isize, n: usize) -> usize {
	assert!(n != 0);
	a.rem_euclid(n as isize) as usize
}
