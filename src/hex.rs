/// Hexadecimal input as typed by a user: no prefix, no sign, 0-9 a-f A-F

use crate::at28c256::ADDRESS_LIMIT;

const MAX_DIGITS: usize = 8;

#[derive(Clone, PartialEq, Eq, Debug, Fail)]
pub enum HexError {
	#[fail(display = "empty input")]
	Empty,
	#[fail(display = "invalid hex digit {:?}", _0)]
	InvalidDigit(char),
	#[fail(display = "more than 8 hex digits")]
	TooLong,
}

#[derive(Clone, PartialEq, Eq, Debug, Fail)]
pub enum AddressError {
	#[fail(display = "{:?} is not a valid address: {}", input, error)]
	Malformed {
		input: String,
		error: HexError,
	},
	#[fail(display = "address 0x{:x} out of range (max 0x7fff)", _0)]
	OutOfRange(u32),
}

pub fn parse_hex(input: &str) -> Result<u32, HexError> {
	let input = input.trim();
	if input.is_empty() {
		return Err(HexError::Empty);
	}

	let mut value = 0u32;
	for (i, c) in input.chars().enumerate() {
		let digit = match c.to_digit(16) {
			Some(d) => d,
			None => return Err(HexError::InvalidDigit(c)),
		};
		if i >= MAX_DIGITS {
			return Err(HexError::TooLong);
		}
		value = (value << 4) | digit;
	}
	Ok(value)
}

/// Parses a chip address; malformed input and well-formed values above
/// `ADDRESS_LIMIT` are reported separately.
pub fn parse_address(input: &str) -> Result<u16, AddressError> {
	let value = parse_hex(input).map_err(|error| AddressError::Malformed {
		input: input.trim().to_string(),
		error,
	})?;
	if value > u32::from(ADDRESS_LIMIT) {
		return Err(AddressError::OutOfRange(value));
	}
	Ok(value as u16)
}
