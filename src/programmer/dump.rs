use std::fmt;

pub const ROW_SIZE: usize = 16;

/// One hex dump line: base address and up to 16 bytes
///
/// Renders like `hexdump -C` without the ASCII column:
/// `0000  ea 4c 00 80 ff ff ff ff  ff ff ff ff ff ff ff ff`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Row {
	base: u16,
	data: [u8; ROW_SIZE],
	len: usize,
}

impl Row {
	pub fn new(base: u16) -> Self {
		Row {
			base,
			data: [0u8; ROW_SIZE],
			len: 0,
		}
	}

	pub fn push(&mut self, value: u8) {
		assert!(self.len < ROW_SIZE);
		self.data[self.len] = value;
		self.len += 1;
	}

	pub fn data(&self) -> &[u8] {
		&self.data[..self.len]
	}
}

impl fmt::Display for Row {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{:04x} ", self.base)?;
		for (i, value) in self.data().iter().enumerate() {
			write!(f, " {:02x}", value)?;
			if i == 7 { write!(f, " ")?; }
		}
		Ok(())
	}
}
