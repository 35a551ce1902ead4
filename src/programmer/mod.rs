/// Sequences bus operations over address ranges
///
/// `program` streams bytes into the chip, `dump` renders its contents as hex
/// rows on the console. Neither verifies anything: check a `program` run with
/// a subsequent `dump`.

mod dump;

pub use self::dump::{
	ROW_SIZE,
	Row,
};

use std::cmp;

use crate::at28c256::{
	ADDRESS_LIMIT,
	BusDriver,
	BusMode,
};
use crate::console::Console;
use crate::gpio::Pins;
use crate::source::ByteSource;

/// last address `program` writes to
pub const PROGRAM_LIMIT: u16 = ADDRESS_LIMIT - 1;

pub struct Programmer<P: Pins, C: Console> {
	bus: BusDriver<P>,
	console: C,
}

impl<P: Pins, C: Console> Programmer<P, C> {
	pub fn new(bus: BusDriver<P>, console: C) -> Self {
		Programmer {
			bus,
			console,
		}
	}

	pub fn bus(&self) -> &BusDriver<P> {
		&self.bus
	}

	pub fn console(&self) -> &C {
		&self.console
	}

	pub fn console_mut(&mut self) -> &mut C {
		&mut self.console
	}

	pub fn into_parts(self) -> (BusDriver<P>, C) {
		(self.bus, self.console)
	}

	/// Writes bytes from `source` to `start..=last`, stopping early once the
	/// source runs dry. `last` is clamped to `PROGRAM_LIMIT`.
	///
	/// Returns the number of bytes written.
	pub fn program<S>(&mut self, mut source: S, start: u16, last: u16) -> crate::AResult<usize>
	where
		S: ByteSource,
	{
		if self.bus.mode() != BusMode::WriteConfigured {
			self.bus.enter_write_mode();
			self.console.println(format_args!("Beginning write:"));
		}

		let last = cmp::min(last, PROGRAM_LIMIT);
		if start > last {
			debug!("nothing to program in 0x{:04x}..=0x{:04x}", start, last);
			return Ok(0);
		}
		info!("programming 0x{:04x}..=0x{:04x}", start, last);

		let mut written = 0usize;
		for address in start..=last {
			if !source.available()? {
				break;
			}
			let value = match source.read_byte()? {
				Some(value) => value,
				None => break,
			};
			self.bus.write_byte(value, address);
			self.console.println(format_args!("{:08b}  written to 0x{:04x}", value, address));
			written += 1;
		}

		if written < (last - start) as usize + 1 {
			debug!("source exhausted after {} bytes", written);
		}
		info!("programmed {} bytes", written);
		Ok(written)
	}

	/// Reads a single byte; without an available console the bus is left
	/// alone and `None` returned.
	pub fn read_byte(&mut self, address: u16) -> Option<u8> {
		if !self.console.is_available() {
			return None;
		}
		Some(self.bus.read_byte(address))
	}

	/// Prints `lines` rows of 16 bytes starting at the row containing `start`.
	///
	/// Stops before reading `ADDRESS_LIMIT`; the row at 0x7ff0 therefore
	/// ends at 0x7ffe. Returns the number of rows printed, which is zero
	/// (with the bus untouched) when the console is unavailable. Reading
	/// stops as soon as the console fails.
	pub fn dump(&mut self, start: u16, lines: u32) -> usize {
		if !self.console.is_available() {
			debug!("no console available, skipping dump");
			return 0;
		}
		if self.bus.mode() != BusMode::ReadConfigured {
			self.bus.enter_read_mode();
		}

		let first = start & !(ROW_SIZE as u16 - 1);
		let end = cmp::min(
			u64::from(first) + u64::from(lines) * ROW_SIZE as u64,
			u64::from(ADDRESS_LIMIT),
		) as u16;

		let mut rows = 0usize;
		let mut base = first;
		while base < end {
			// a console failing mid-dump stops the reads as well
			if !self.console.is_available() {
				debug!("console went away, stopping dump at 0x{:04x}", base);
				break;
			}
			let mut row = Row::new(base);
			let row_end = cmp::min(u32::from(base) + ROW_SIZE as u32, u32::from(ADDRESS_LIMIT)) as u16;
			for address in base..row_end {
				row.push(self.bus.read_byte(address));
			}
			self.console.println(format_args!("{}", row));
			if self.console.is_available() {
				rows += 1;
			}
			base += ROW_SIZE as u16;
		}
		rows
	}
}
