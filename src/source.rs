use std::io::{
	self,
	BufRead,
};

/// Forward-only byte stream feeding the programmer
pub trait ByteSource {
	/// whether another byte can be read
	fn available(&mut self) -> io::Result<bool>;
	/// next byte, `None` once exhausted
	fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

impl<'a> ByteSource for &'a [u8] {
	fn available(&mut self) -> io::Result<bool> {
		Ok(!self.is_empty())
	}

	fn read_byte(&mut self) -> io::Result<Option<u8>> {
		let data: &'a [u8] = *self;
		match data.split_first() {
			None => Ok(None),
			Some((&first, rest)) => {
				*self = rest;
				Ok(Some(first))
			},
		}
	}
}

impl<'a, S: ?Sized + ByteSource> ByteSource for &'a mut S {
	fn available(&mut self) -> io::Result<bool> {
		S::available(*self)
	}

	fn read_byte(&mut self) -> io::Result<Option<u8>> {
		S::read_byte(*self)
	}
}

/// Adapts a buffered reader (e.g. a `BufReader<File>`)
pub struct StreamSource<R: BufRead> {
	reader: R,
}

impl<R: BufRead> StreamSource<R> {
	pub fn new(reader: R) -> Self {
		StreamSource { reader }
	}
}

impl<R: BufRead> ByteSource for StreamSource<R> {
	fn available(&mut self) -> io::Result<bool> {
		Ok(!self.reader.fill_buf()?.is_empty())
	}

	fn read_byte(&mut self) -> io::Result<Option<u8>> {
		let byte = match self.reader.fill_buf()?.first() {
			None => return Ok(None),
			Some(&b) => b,
		};
		self.reader.consume(1);
		Ok(Some(byte))
	}
}
