/* BCM2835 peripheral manual, chapter 6 "General Purpose I/O" */

use std::ffi::CString;
use std::fs;
use std::io;
use std::os::unix::io::{
	FromRawFd,
};
use std::ptr;

use libc::{
	MAP_SHARED,
	O_CLOEXEC,
	O_RDWR,
	O_SYNC,
	PROT_READ,
	PROT_WRITE,
	c_void,
	mmap,
	munmap,
	open,
};

use crate::gpio::{
	Direction,
	Pin,
	Pins,
};

const BLOCK_SIZE: usize = 4096;
const PIN_COUNT: u32 = 54;

// register offsets (bytes)
const GPFSEL0: usize = 0x00;
const GPSET0: usize = 0x1c;
const GPCLR0: usize = 0x28;
const GPLEV0: usize = 0x34;

const FSEL_INPUT: u32 = 0b000;
const FSEL_OUTPUT: u32 = 0b001;
const FSEL_MASK: u32 = 0b111;

#[derive(Debug)]
pub struct Mapped {
	ptr: ptr::NonNull<u8>, // u8 instead of void for easier offset operations
}

impl Drop for Mapped {
	fn drop(&mut self) {
		unsafe {
			let res = munmap(
				self.ptr.as_ptr() as *mut c_void,
				BLOCK_SIZE,
			);
			if 0 != res {
				panic!("munmap failed: {}", io::Error::last_os_error());
			}
		}
	}
}

impl Mapped {
	fn read_register(&self, offset: usize) -> u32 {
		assert!(offset & 3 == 0);
		assert!(offset + 3 < BLOCK_SIZE);
		unsafe { ptr::read_volatile(self.ptr.as_ptr().add(offset) as *const u32) }
	}

	fn write_register(&mut self, offset: usize, data: u32) {
		assert!(offset & 3 == 0);
		assert!(offset + 3 < BLOCK_SIZE);
		unsafe { ptr::write_volatile(self.ptr.as_ptr().add(offset) as *mut u32, data) }
	}
}

// register offset of the bank containing `pin` and the bit mask within it
fn bank(base: usize, pin: Pin) -> (usize, u32) {
	assert!(pin.0 < PIN_COUNT, "GPIO {} out of range", pin);
	(base + 4 * (pin.0 / 32) as usize, 1u32 << (pin.0 % 32))
}

impl Pins for Mapped {
	fn set_direction(&mut self, pin: Pin, direction: Direction) {
		assert!(pin.0 < PIN_COUNT, "GPIO {} out of range", pin);
		// ten pins per function select register, three bits each
		let offset = GPFSEL0 + 4 * (pin.0 / 10) as usize;
		let shift = 3 * (pin.0 % 10);
		let function = match direction {
			Direction::Input => FSEL_INPUT,
			Direction::Output => FSEL_OUTPUT,
		};
		let fsel = self.read_register(offset);
		self.write_register(offset, (fsel & !(FSEL_MASK << shift)) | (function << shift));
	}

	fn set_level(&mut self, pin: Pin, high: bool) {
		// separate set/clear registers: writing zero bits has no effect
		let (offset, mask) = bank(if high { GPSET0 } else { GPCLR0 }, pin);
		self.write_register(offset, mask);
	}

	fn read_level(&mut self, pin: Pin) -> bool {
		let (offset, mask) = bank(GPLEV0, pin);
		0 != self.read_register(offset) & mask
	}
}

pub fn inner_open<I>(path: &str, pins: I) -> crate::AResult<Mapped>
where
	I: IntoIterator<Item = Pin>,
{
	for pin in pins {
		ensure!(pin.0 < PIN_COUNT, "GPIO {} out of range (BCM2835 has GPIO 0..{})", pin, PIN_COUNT);
	}

	with_context!(("map GPIO registers from {}", path), {
		let c_path = CString::new(path)?;

		let fd = unsafe { open(c_path.as_ptr(), O_RDWR | O_CLOEXEC | O_SYNC) };
		if -1 == fd {
			return Err(io::Error::last_os_error().into());
		}
		// now get fd managed to prevent resource leak; mapping stays valid after close
		let _f = unsafe { fs::File::from_raw_fd(fd) };

		let area = unsafe {
			mmap(
				ptr::null_mut(),
				BLOCK_SIZE,
				PROT_READ | PROT_WRITE,
				MAP_SHARED,
				fd,
				0,
			)
		};

		if area as usize == !0usize {
			return Err(io::Error::last_os_error().into());
		}
		match ptr::NonNull::new(area as *mut u8) {
			None => panic!("mmap shouldn't return NULL ever"),
			Some(area) => Ok(Mapped {
				ptr: area,
			}),
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bank_selects_register_and_bit() {
		assert_eq!(bank(GPSET0, Pin(2)), (GPSET0, 1 << 2));
		assert_eq!(bank(GPLEV0, Pin(31)), (GPLEV0, 1 << 31));
		assert_eq!(bank(GPCLR0, Pin(40)), (GPCLR0 + 4, 1 << 8));
	}

	#[test]
	fn rejects_pins_beyond_the_chip_before_mapping() {
		let err = inner_open("/nonexistent/gpiomem", vec![Pin(25), Pin(60)]).err().unwrap();
		let msg = err.to_string();
		assert!(msg.contains("GPIO 60 out of range"), "{}", msg);

		// valid pins get as far as opening the device
		let err = inner_open("/nonexistent/gpiomem", vec![Pin(53)]).err().unwrap();
		assert!(err.to_string().contains("map GPIO registers"));
	}
}
