use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::os::unix::fs::FileExt;
use std::path::{
	Path,
	PathBuf,
};
use std::time::Duration;

use crate::gpio::{
	Direction,
	Pin,
	Pins,
	reliable_sleep,
};

// udev needs a moment to fix permissions of freshly exported lines
const EXPORT_RETRIES: usize = 20;
const EXPORT_RETRY_DELAY: Duration = Duration::from_millis(50);

struct Line {
	direction: fs::File,
	value: fs::File,
	exported_by_us: bool,
}

pub struct Sysfs {
	root: PathBuf,
	lines: HashMap<Pin, Line>,
}

impl Sysfs {
	fn line(&self, pin: Pin) -> &Line {
		match self.lines.get(&pin) {
			Some(line) => line,
			None => panic!("GPIO {} was not opened", pin),
		}
	}
}

fn write_control(path: &Path, pin: Pin) -> crate::AResult<()> {
	// need to write in one syscall for export/unexport
	fs::OpenOptions::new().write(true).open(path)?.write_all(pin.to_string().as_bytes())?;
	Ok(())
}

fn open_line(root: &Path, pin: Pin) -> crate::AResult<Line> {
	let dir = root.join(format!("gpio{}", pin));
	let exported_by_us = !dir.exists();
	if exported_by_us {
		with_context!(("export GPIO {}", pin), {
			write_control(&root.join("export"), pin)
		})?;
		debug!("GPIO {}: exported", pin);
	}

	let mut attempt = 0;
	loop {
		let opened = (|| -> crate::AResult<Line> {
			let direction = fs::OpenOptions::new().read(true).write(true).open(dir.join("direction"))?;
			let value = fs::OpenOptions::new().read(true).write(true).open(dir.join("value"))?;
			Ok(Line {
				direction,
				value,
				exported_by_us,
			})
		})();
		match opened {
			Ok(line) => return Ok(line),
			Err(e) => {
				attempt += 1;
				if attempt >= EXPORT_RETRIES {
					let msg = format!("open GPIO {}: {}", pin, e);
					return Err(e.context(msg).into());
				}
				trace!("GPIO {}: not accessible yet ({}), retrying", pin, e);
				reliable_sleep(EXPORT_RETRY_DELAY);
			},
		}
	}
}

impl Pins for Sysfs {
	fn set_direction(&mut self, pin: Pin, direction: Direction) {
		let data: &[u8] = match direction {
			Direction::Input => b"in",
			Direction::Output => b"out",
		};
		self.line(pin).direction.write_at(data, 0).expect("writing GPIO direction must not fail");
	}

	fn set_level(&mut self, pin: Pin, high: bool) {
		let data: &[u8] = if high { b"1" } else { b"0" };
		self.line(pin).value.write_at(data, 0).expect("writing GPIO value must not fail");
	}

	fn read_level(&mut self, pin: Pin) -> bool {
		let mut buf = [0u8];
		self.line(pin).value.read_at(&mut buf, 0).expect("reading GPIO value must not fail");
		buf[0] == b'1'
	}
}

impl Drop for Sysfs {
	fn drop(&mut self) {
		let unexport = self.root.join("unexport");
		for (pin, line) in self.lines.drain() {
			if !line.exported_by_us {
				continue;
			}
			drop(line);
			if let Err(e) = write_control(&unexport, pin) {
				warn!("GPIO {}: failed to unexport: {}", pin, e);
			}
		}
	}
}

pub fn inner_open<P, I>(root: P, pins: I) -> crate::AResult<Sysfs>
where
	P: AsRef<Path>,
	I: IntoIterator<Item = Pin>,
{
	let mut sysfs = Sysfs {
		root: root.as_ref().to_path_buf(),
		lines: HashMap::new(),
	};
	for pin in pins {
		if sysfs.lines.contains_key(&pin) {
			bail!("GPIO {} assigned more than once", pin);
		}
		// on error `sysfs` gets dropped and unexports what we exported so far
		let line = open_line(&sysfs.root, pin)?;
		sysfs.lines.insert(pin, line);
	}
	Ok(sysfs)
}
