// Copyright 2024 Irreducible Inc.

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("argument {arg} does not have expected length {expected}")]
	IncorrectArgumentLength { arg: String, expected: usize },
	#[error("duplicate point in domain")]
	DuplicateDomainPoint,
	#[error("evaluations over the roots of unity need a power-of-two domain, got {size}")]
	PowerOfTwoDomainRequired { size: usize },
	#[error("{0}")]
	FieldError(#[from] wizard_field::Error),
}
