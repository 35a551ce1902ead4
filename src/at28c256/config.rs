use std::time::Duration;

use crate::gpio::Pin;

pub const ADDRESS_WIDTH: usize = 15;
pub const DATA_WIDTH: usize = 8;

/// Wiring between controller and chip
///
/// `address[i]` carries address bit `i` (A0 first). `data[0]` carries the
/// most significant data bit D7, `data[7]` carries D0.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PinAssignment {
	pub address: [Pin; ADDRESS_WIDTH],
	pub data: [Pin; DATA_WIDTH],
	pub write_enable: Pin,
	pub output_enable: Pin,
}

impl PinAssignment {
	pub fn all(&self) -> impl Iterator<Item = Pin> + '_ {
		self.address.iter()
			.chain(self.data.iter())
			.chain(Some(&self.write_enable))
			.chain(Some(&self.output_enable))
			.cloned()
	}

	pub fn ensure_distinct(&self) -> crate::AResult<()> {
		let mut seen = Vec::with_capacity(ADDRESS_WIDTH + DATA_WIDTH + 2);
		for pin in self.all() {
			ensure!(!seen.contains(&pin), "GPIO {} assigned more than once", pin);
			seen.push(pin);
		}
		Ok(())
	}
}

impl Default for PinAssignment {
	// BCM numbering; GPIO 0/1 are reserved for the HAT ID EEPROM
	fn default() -> Self {
		let mut address = [Pin(0); ADDRESS_WIDTH];
		for (i, pin) in address.iter_mut().enumerate() {
			*pin = Pin(2 + i as u32);
		}
		let mut data = [Pin(0); DATA_WIDTH];
		for (i, pin) in data.iter_mut().enumerate() {
			*pin = Pin(17 + i as u32);
		}
		PinAssignment {
			address,
			data,
			write_enable: Pin(25),
			output_enable: Pin(26),
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BusConfig {
	pub pins: PinAssignment,
	/// held after every data bit and as write-enable low time
	pub clock: Duration,
	/// wait after asserting output-enable before trusting the data lines
	pub read_enable_settle: Duration,
	/// wait between asserting the address and sampling a data line
	pub read_bit_settle: Duration,
}

impl Default for BusConfig {
	fn default() -> Self {
		BusConfig {
			pins: PinAssignment::default(),
			clock: Duration::from_micros(1000),
			read_enable_settle: Duration::from_micros(100),
			read_bit_settle: Duration::from_micros(50),
		}
	}
}

/// parse a comma separated list of exactly `N` GPIO numbers
pub fn parse_pin_list(list: &str, target: &mut [Pin]) -> crate::AResult<()> {
	let mut count = 0;
	for item in list.split(',') {
		let item = item.trim();
		ensure!(count < target.len(), "too many pins (expected {})", target.len());
		let pin = item.parse::<u32>().map_err(|e| format_err!("invalid GPIO number {:?}: {}", item, e))?;
		target[count] = Pin(pin);
		count += 1;
	}
	ensure!(count == target.len(), "expected {} pins, got {}", target.len(), count);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_pins_are_distinct() {
		let pins = PinAssignment::default();
		assert!(pins.ensure_distinct().is_ok());
		assert_eq!(pins.all().count(), ADDRESS_WIDTH + DATA_WIDTH + 2);
		assert_eq!(pins.data[0], Pin(17));
		assert_eq!(pins.address[14], Pin(16));
	}

	#[test]
	fn detects_shared_pins() {
		let mut pins = PinAssignment::default();
		pins.output_enable = pins.data[3];
		assert!(pins.ensure_distinct().is_err());
	}

	#[test]
	fn parses_pin_lists() {
		let mut data = [Pin(0); DATA_WIDTH];
		parse_pin_list("7, 6,5,4,3,2,1,0", &mut data).unwrap();
		assert_eq!(data[0], Pin(7));
		assert_eq!(data[7], Pin(0));

		assert!(parse_pin_list("1,2,3", &mut data).is_err());
		assert!(parse_pin_list("1,2,3,4,5,6,7,8,9", &mut data).is_err());
		assert!(parse_pin_list("1,2,3,4,5,6,7,x", &mut data).is_err());
	}
}
