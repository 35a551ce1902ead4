/// Simulated 28C256 wired to the default pin assignment
///
/// Records every pin operation, latches bytes on /WE pulses and drives the
/// data lines from its memory while /OE is low.

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use crate::at28c256::{
	BusConfig,
	PinAssignment,
};
use crate::gpio::{
	Direction,
	Pin,
	Pins,
};
use crate::source::ByteSource;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Event {
	Direction(Pin, Direction),
	Level(Pin, bool),
	Sample(Pin),
	Delay(Duration),
}

pub struct SimulatedChip {
	assignment: PinAssignment,
	directions: HashMap<Pin, Direction>,
	levels: HashMap<Pin, bool>,
	memory: Vec<u8>,
	pending: Option<(u16, u8)>,
	latched: Vec<(u16, u8)>,
	sampled: Vec<u16>,
	events: Vec<Event>,
}

impl SimulatedChip {
	pub fn new() -> Self {
		SimulatedChip {
			assignment: PinAssignment::default(),
			directions: HashMap::new(),
			levels: HashMap::new(),
			memory: vec![0xff; 0x8000],
			pending: None,
			latched: Vec::new(),
			sampled: Vec::new(),
			events: Vec::new(),
		}
	}

	pub fn config() -> BusConfig {
		BusConfig::default()
	}

	pub fn events(&self) -> &[Event] {
		&self.events
	}

	pub fn memory(&self) -> &[u8] {
		&self.memory
	}

	pub fn memory_mut(&mut self) -> &mut [u8] {
		&mut self.memory
	}

	/// committed writes in order
	pub fn latched(&self) -> &[(u16, u8)] {
		&self.latched
	}

	/// address asserted for every sampled data line
	pub fn sampled(&self) -> &[u16] {
		&self.sampled
	}

	fn level(&self, pin: Pin) -> Option<bool> {
		self.levels.get(&pin).cloned()
	}

	pub fn write_enable_high(&self) -> bool {
		self.level(self.assignment.write_enable) == Some(true)
	}

	pub fn output_enable_high(&self) -> bool {
		self.level(self.assignment.output_enable) == Some(true)
	}

	pub fn asserted_address(&self) -> Option<u16> {
		let mut address = 0u16;
		for (bit, pin) in self.assignment.address.iter().enumerate() {
			if self.level(*pin)? {
				address |= 1 << bit;
			}
		}
		Some(address)
	}

	pub fn data_driven_by_controller(&self) -> bool {
		self.assignment.data.iter().all(|pin| self.directions.get(pin) == Some(&Direction::Output))
	}

	pub fn controller_data(&self) -> Option<u8> {
		if !self.data_driven_by_controller() {
			return None;
		}
		let mut value = 0u8;
		for pin in self.assignment.data.iter() {
			value = (value << 1) | (self.level(*pin)? as u8);
		}
		Some(value)
	}

	fn chip_drives_data(&self) -> bool {
		self.level(self.assignment.output_enable) == Some(false)
			&& self.write_enable_high()
	}
}

impl Pins for SimulatedChip {
	fn set_direction(&mut self, pin: Pin, direction: Direction) {
		self.events.push(Event::Direction(pin, direction));
		self.directions.insert(pin, direction);
	}

	fn set_level(&mut self, pin: Pin, high: bool) {
		self.events.push(Event::Level(pin, high));
		let previous = self.level(pin);
		self.levels.insert(pin, high);

		if pin != self.assignment.write_enable || !self.output_enable_high() {
			return;
		}
		match (previous, high) {
			(Some(true), false) => {
				// falling edge: address and data get sampled
				if let (Some(address), Some(data)) = (self.asserted_address(), self.controller_data()) {
					self.pending = Some((address, data));
				}
			},
			(Some(false), true) => {
				if let Some((address, data)) = self.pending.take() {
					self.memory[address as usize] = data;
					self.latched.push((address, data));
				}
			},
			_ => (),
		}
	}

	fn read_level(&mut self, pin: Pin) -> bool {
		self.events.push(Event::Sample(pin));
		if let Some(index) = self.assignment.data.iter().position(|p| *p == pin) {
			if self.chip_drives_data() && self.directions.get(&pin) == Some(&Direction::Input) {
				let address = self.asserted_address().unwrap_or(0);
				self.sampled.push(address);
				return 0 != (self.memory[address as usize] >> (7 - index)) & 1;
			}
		}
		self.level(pin).unwrap_or(false)
	}

	fn delay(&mut self, duration: Duration) {
		self.events.push(Event::Delay(duration));
	}
}

/// Yields `data`, then fails like a storage medium going bad
pub struct FailingSource {
	data: Vec<u8>,
	position: usize,
}

impl FailingSource {
	pub fn new(data: &[u8]) -> Self {
		FailingSource {
			data: data.to_vec(),
			position: 0,
		}
	}
}

impl ByteSource for FailingSource {
	fn available(&mut self) -> io::Result<bool> {
		Ok(true)
	}

	fn read_byte(&mut self) -> io::Result<Option<u8>> {
		match self.data.get(self.position) {
			Some(&value) => {
				self.position += 1;
				Ok(Some(value))
			},
			None => Err(io::Error::new(io::ErrorKind::Other, "read error on medium")),
		}
	}
}
