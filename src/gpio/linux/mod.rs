mod mapped;
mod sysfs;

use crate::gpio::{
	Pin,
	Pins,
};

/// export and open the given lines through `/sys/class/gpio`
pub fn open_sysfs<I>(pins: I) -> crate::AResult<impl Pins>
where
	I: IntoIterator<Item = Pin>,
{
	sysfs::inner_open("/sys/class/gpio", pins)
}

/// map the BCM2835 GPIO register block through `/dev/gpiomem`; all `pins`
/// must exist on the chip
pub fn open_gpiomem<I>(pins: I) -> crate::AResult<impl Pins>
where
	I: IntoIterator<Item = Pin>,
{
	mapped::inner_open("/dev/gpiomem", pins)
}
