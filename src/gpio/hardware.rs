use std::fmt;
use std::thread;
use std::time::{
	Duration,
	Instant,
};

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

/// GPIO line number as the platform counts them (BCM numbering on a pi)
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Pin(pub u32);

impl fmt::Display for Pin {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Direction {
	Input,
	Output,
}

pub trait Pins {
	fn set_direction(&mut self, pin: Pin, direction: Direction);
	fn set_level(&mut self, pin: Pin, high: bool);
	fn read_level(&mut self, pin: Pin) -> bool;

	// wait for (at least) `duration`
	fn delay(&mut self, duration: Duration) {
		reliable_sleep(duration);
	}
}

impl<'a, P: ?Sized + Pins> Pins for &'a mut P {
	fn set_direction(&mut self, pin: Pin, direction: Direction) {
		P::set_direction(*self, pin, direction);
	}
	fn set_level(&mut self, pin: Pin, high: bool) {
		P::set_level(*self, pin, high);
	}
	fn read_level(&mut self, pin: Pin) -> bool {
		P::read_level(*self, pin)
	}
	fn delay(&mut self, duration: Duration) {
		P::delay(*self, duration);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reliable_sleep_waits_at_least_duration() {
		let duration = Duration::from_micros(300);
		let now = Instant::now();
		reliable_sleep(duration);
		assert!(now.elapsed() >= duration);
	}

	#[test]
	fn pin_displays_line_number() {
		assert_eq!(Pin(17).to_string(), "17");
	}
}
