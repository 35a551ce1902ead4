use std::fmt;
use std::io;

/// Where status messages and hex dumps go
///
/// An unavailable console swallows everything; the programmer also skips
/// reads entirely without one.
pub trait Console {
	fn is_available(&self) -> bool;
	fn print(&mut self, args: fmt::Arguments);

	fn println(&mut self, args: fmt::Arguments) {
		self.print(args);
		self.print(format_args!("\n"));
	}
}

impl<'a, C: ?Sized + Console> Console for &'a mut C {
	fn is_available(&self) -> bool {
		C::is_available(*self)
	}
	fn print(&mut self, args: fmt::Arguments) {
		C::print(*self, args)
	}
	fn println(&mut self, args: fmt::Arguments) {
		C::println(*self, args)
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct NoConsole;

impl Console for NoConsole {
	fn is_available(&self) -> bool {
		false
	}

	fn print(&mut self, _args: fmt::Arguments) {
	}
}

pub struct WriterConsole<W: io::Write> {
	writer: W,
	failed: bool,
}

impl<W: io::Write> WriterConsole<W> {
	pub fn new(writer: W) -> Self {
		WriterConsole {
			writer,
			failed: false,
		}
	}

	pub fn get_ref(&self) -> &W {
		&self.writer
	}

	pub fn into_inner(self) -> W {
		self.writer
	}
}

impl<W: io::Write> Console for WriterConsole<W> {
	// a writer that failed once (closed pipe, detached terminal) counts as gone
	fn is_available(&self) -> bool {
		!self.failed
	}

	fn print(&mut self, args: fmt::Arguments) {
		if self.failed {
			return;
		}
		if let Err(e) = self.writer.write_fmt(args).and_then(|()| self.writer.flush()) {
			warn!("console output failed, disabling it: {}", e);
			self.failed = true;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Broken;

	impl io::Write for Broken {
		fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
			Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
		}
		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	#[test]
	fn writer_console_collects_output() {
		let mut console = WriterConsole::new(Vec::new());
		assert!(console.is_available());
		console.print(format_args!("{:04x}", 0x7ff0));
		console.println(format_args!(" {}", "done"));
		assert_eq!(console.into_inner(), b"7ff0 done\n");
	}

	#[test]
	fn failing_writer_becomes_unavailable() {
		let mut console = WriterConsole::new(Broken);
		console.print(format_args!("hello"));
		assert!(!console.is_available());
	}

	#[test]
	fn no_console_is_unavailable() {
		let mut console = NoConsole;
		console.println(format_args!("ignored"));
		assert!(!console.is_available());
	}
}
