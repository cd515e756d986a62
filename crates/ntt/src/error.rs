// Copyright 2024 Irreducible Inc.

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("domain size is less than 2**{log_required_domain_size}")]
	DomainTooSmall { log_required_domain_size: usize },
	#[error("the input length must be a power of two")]
	PowerOfTwoLengthRequired,
	#[error("field error: {0}")]
	FieldError(#[from] wizard_field::Error),
}
