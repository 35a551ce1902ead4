/* Chip documentation: AT28C256 datasheet, "Byte Write" and "Read" timing */

/// Bus protocol for the 28C256, a 256-kbit parallel EEPROM (32K x 8)
///
/// - A0..A14 select the byte; always driven by the controller
/// - D0..D7 are outputs while writing and inputs while reading
/// - /WE (write enable): a low pulse latches address and data on the falling
///   edge; the chip commits the byte on or after the rising edge
/// - /OE (output enable): while low the chip drives the data lines
///
/// /CE is expected to be tied low.

mod config;

pub use self::config::{
	ADDRESS_WIDTH,
	BusConfig,
	DATA_WIDTH,
	PinAssignment,
	parse_pin_list,
};

use crate::gpio::{
	Direction,
	Pins,
};

/// highest address the chip decodes
pub const ADDRESS_LIMIT: u16 = 0x7fff;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum BusMode {
	Uninitialized,
	ReadConfigured,
	WriteConfigured,
}

pub struct BusDriver<P: Pins> {
	pins: P,
	config: BusConfig,
	mode: BusMode,
}

impl<P: Pins> BusDriver<P> {
	/// Takes ownership of the lines and puts them into an idle state:
	/// control lines high (inactive), address lines low. The data lines
	/// stay untouched until a mode gets entered.
	pub fn new(pins: P, config: BusConfig) -> Self {
		let mut driver = BusDriver {
			pins,
			config,
			mode: BusMode::Uninitialized,
		};
		driver.setup();
		driver
	}

	fn setup(&mut self) {
		let assignment = self.config.pins;
		self.pins.set_direction(assignment.write_enable, Direction::Output);
		self.pins.set_direction(assignment.output_enable, Direction::Output);
		self.pins.set_level(assignment.write_enable, true);
		self.pins.set_level(assignment.output_enable, true);

		for &pin in assignment.address.iter() {
			self.pins.set_direction(pin, Direction::Output);
			self.pins.set_level(pin, false);
		}
		debug!("bus idle (clock {:?})", self.config.clock);
	}

	pub fn mode(&self) -> BusMode {
		self.mode
	}

	pub fn config(&self) -> &BusConfig {
		&self.config
	}

	pub fn pins(&self) -> &P {
		&self.pins
	}

	pub fn into_pins(self) -> P {
		self.pins
	}

	/// Drives A0..A14 from the low 15 bits of `address`, lowest bit first.
	///
	/// Bit 15 has no line and gets dropped silently: 0x8123 asserts 0x0123.
	/// Callers wanting strict range checks must validate beforehand.
	pub fn set_address(&mut self, address: u16) {
		for (bit, &pin) in self.config.pins.address.iter().enumerate() {
			self.pins.set_level(pin, 0 != (address >> bit) & 1);
		}
	}

	pub fn enter_write_mode(&mut self) {
		if self.mode == BusMode::WriteConfigured {
			return;
		}
		// release the data lines (/OE high) before driving them ourselves
		self.pins.set_level(self.config.pins.output_enable, true);
		for &pin in self.config.pins.data.iter() {
			self.pins.set_direction(pin, Direction::Output);
			self.pins.set_level(pin, false);
		}
		self.mode = BusMode::WriteConfigured;
		debug!("bus configured for writing");
	}

	pub fn enter_read_mode(&mut self) {
		if self.mode == BusMode::ReadConfigured {
			return;
		}
		for &pin in self.config.pins.data.iter() {
			self.pins.set_direction(pin, Direction::Input);
		}
		self.pins.set_level(self.config.pins.output_enable, false);
		// the chip needs a moment to drive the bus; without this the first
		// few reads return garbage
		self.pins.delay(self.config.read_enable_settle);
		self.mode = BusMode::ReadConfigured;
		debug!("bus configured for reading");
	}

	/// Latches `value` at `address` with a single /WE pulse.
	///
	/// Data lines are driven one at a time, D7 first, each followed by a
	/// clock delay; the accumulated delay doubles as data setup time.
	pub fn write_byte(&mut self, value: u8, address: u16) {
		self.enter_write_mode();

		let clock = self.config.clock;
		for (i, &pin) in self.config.pins.data.iter().enumerate() {
			self.pins.set_level(pin, 0 != (value >> (7 - i)) & 1);
			self.pins.delay(clock);
		}

		let write_enable = self.config.pins.write_enable;
		self.pins.set_level(write_enable, true);
		self.set_address(address);
		self.pins.set_level(write_enable, false);
		self.pins.delay(clock);
		self.pins.set_level(write_enable, true);
		trace!("wrote 0x{:02x} to 0x{:04x}", value, address);
	}

	/// Reads the byte at `address`, most significant bit first.
	///
	/// The address gets asserted again (and the settle delay paid) for each
	/// of the eight bits.
	pub fn read_byte(&mut self, address: u16) -> u8 {
		self.enter_read_mode();

		let mut value = 0u8;
		for i in 0..DATA_WIDTH {
			self.set_address(address);
			self.pins.delay(self.config.read_bit_settle);
			let bit = self.pins.read_level(self.config.pins.data[i]);
			value = (value << 1) | (bit as u8);
		}
		trace!("read 0x{:02x} from 0x{:04x}", value, address);
		value
	}
}
