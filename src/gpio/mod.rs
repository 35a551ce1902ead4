/// Raw digital I/O lines
///
/// The programmer only needs four primitives: switch a line between input and
/// output, drive an output, sample an input and wait. Everything board
/// specific lives behind the `Pins` trait; the linux backends below talk to
/// either the sysfs GPIO interface or the memory mapped BCM2835 registers.

mod hardware;
mod linux;

pub use self::hardware::{
	Direction,
	Pin,
	Pins,
	reliable_sleep,
};

// OS-specific. for now linux only.
pub use self::linux::{
	open_gpiomem,
	open_sysfs,
};
