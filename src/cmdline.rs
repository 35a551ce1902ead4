/// Interactive menu: pick read or write, then a file and addresses
///
/// Reads whole lines from `input` (blocking) and prints prompts on the
/// programmer's console. End of input ends the session.

use std::fs;
use std::io::{
	BufRead,
	BufReader,
};
use std::path::PathBuf;

use crate::console::Console;
use crate::gpio::Pins;
use crate::hex::{
	AddressError,
	parse_address,
};
use crate::programmer::{
	PROGRAM_LIMIT,
	Programmer,
};
use crate::source::{
	ByteSource,
	StreamSource,
};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum MenuState {
	ModeSelect,
	FileSelect,
	Read,
	Write,
	Done,
}

pub struct Session<P: Pins, C: Console, I: BufRead> {
	programmer: Programmer<P, C>,
	input: I,
	root: PathBuf,
	state: MenuState,
	file: Option<(String, fs::File)>,
}

impl<P: Pins, C: Console, I: BufRead> Session<P, C, I> {
	/// files offered for writing are looked up in `root`
	pub fn new(programmer: Programmer<P, C>, input: I, root: PathBuf) -> Self {
		Session {
			programmer,
			input,
			root,
			state: MenuState::ModeSelect,
			file: None,
		}
	}

	pub fn state(&self) -> MenuState {
		self.state
	}

	pub fn into_programmer(self) -> Programmer<P, C> {
		self.programmer
	}

	pub fn run(&mut self) -> crate::AResult<()> {
		while self.state != MenuState::Done {
			self.step()?;
		}
		Ok(())
	}

	pub fn step(&mut self) -> crate::AResult<()> {
		match self.state {
			MenuState::ModeSelect => self.mode_select(),
			MenuState::FileSelect => self.file_select(),
			MenuState::Read => self.read(),
			MenuState::Write => self.write(),
			MenuState::Done => Ok(()),
		}
	}

	fn say(&mut self, args: std::fmt::Arguments) {
		self.programmer.console_mut().println(args);
	}

	// prompt and wait for a line; `None` (and state `Done`) on end of input
	fn ask(&mut self, request: &str) -> crate::AResult<Option<String>> {
		self.programmer.console_mut().print(format_args!("{}", request));
		let mut line = String::new();
		if 0 == self.input.read_line(&mut line)? {
			debug!("end of input, leaving menu");
			self.state = MenuState::Done;
			self.file = None;
			return Ok(None);
		}
		self.say(format_args!(""));
		Ok(Some(line.trim().to_string()))
	}

	// parse an address or report it and fall back to mode selection
	fn ask_address(&mut self, request: &str, clamp: bool) -> crate::AResult<Option<u16>> {
		let input = match self.ask(request)? {
			None => return Ok(None),
			Some(input) => input,
		};
		match parse_address(&input) {
			Ok(address) => Ok(Some(address)),
			Err(AddressError::OutOfRange(value)) if clamp => {
				warn!("address 0x{:x} clamped to 0x{:04x}", value, PROGRAM_LIMIT);
				Ok(Some(PROGRAM_LIMIT))
			},
			Err(e) => {
				self.say(format_args!("{}", e));
				self.state = MenuState::ModeSelect;
				self.file = None;
				Ok(None)
			},
		}
	}

	fn mode_select(&mut self) -> crate::AResult<()> {
		let input = match self.ask("(r)ead, (w)rite or (q)uit?: ")? {
			None => return Ok(()),
			Some(input) => input,
		};
		match input.as_str() {
			"r" | "R" => self.state = MenuState::Read,
			"w" | "W" => self.state = MenuState::FileSelect,
			"q" | "Q" => self.state = MenuState::Done,
			_ => self.say(format_args!("Invalid option provided.")),
		}
		Ok(())
	}

	fn file_select(&mut self) -> crate::AResult<()> {
		let mut names = Vec::new();
		for entry in fs::read_dir(&self.root)? {
			let entry = entry?;
			if entry.file_type()?.is_file() {
				names.push(entry.file_name().to_string_lossy().into_owned());
			}
		}
		names.sort();
		self.say(format_args!("Available files:"));
		for name in &names {
			self.say(format_args!("\t{}", name));
		}

		let input = match self.ask("Enter file name to use (empty to go back): ")? {
			None => return Ok(()),
			Some(input) => input,
		};
		if input.is_empty() {
			self.state = MenuState::ModeSelect;
			return Ok(());
		}

		let opened = fs::File::open(self.root.join(&input)).and_then(|file| {
			let is_file = file.metadata()?.is_file();
			Ok((file, is_file))
		});
		match opened {
			Ok((file, true)) => {
				debug!("selected {}", input);
				self.file = Some((input, file));
				self.state = MenuState::Write;
			},
			_ => self.say(format_args!("{} is not a valid file.", input)),
		}
		Ok(())
	}

	fn read(&mut self) -> crate::AResult<()> {
		let start = match self.ask_address("Enter starting address: ", false)? {
			None => return Ok(()),
			Some(start) => start,
		};
		let input = match self.ask("Enter number of lines to read (16 bytes per line): ")? {
			None => return Ok(()),
			Some(input) => input,
		};
		match input.parse::<u32>() {
			Ok(lines) => {
				self.programmer.dump(start, lines);
			},
			Err(_) => self.say(format_args!("{} is not a valid number of lines", input)),
		}
		self.state = MenuState::ModeSelect;
		Ok(())
	}

	fn write(&mut self) -> crate::AResult<()> {
		let start = match self.ask_address("Enter the address of the first byte to flash: ", false)? {
			None => return Ok(()),
			Some(start) => start,
		};
		let last = match self.ask_address("Enter the address of the last byte to flash: ", true)? {
			None => return Ok(()),
			Some(last) => last,
		};

		let (name, file) = match self.file.take() {
			None => {
				self.state = MenuState::ModeSelect;
				bail!("no file selected");
			},
			Some(f) => f,
		};
		self.flash(&name, StreamSource::new(BufReader::new(file)), start, last);
		Ok(())
	}

	// program and report the outcome; always back to mode selection
	fn flash<S: ByteSource>(&mut self, name: &str, source: S, start: u16, last: u16) {
		self.state = MenuState::ModeSelect;
		self.file = None;
		match self.programmer.program(source, start, last) {
			Ok(written) => self.say(format_args!("Wrote {} bytes from {}", written, name)),
			Err(e) => {
				error!("programming from {} failed: {}", name, e);
				self.say(format_args!("Programming from {} failed: {}", name, e));
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;

	use crate::at28c256::BusDriver;
	use crate::console::WriterConsole;
	use crate::sim::{
		FailingSource,
		SimulatedChip,
	};

	fn temp_root(name: &str) -> PathBuf {
		let root = std::env::temp_dir().join(format!("at28c256-menu-{}-{}", name, std::process::id()));
		let _ = fs::remove_dir_all(&root);
		fs::create_dir_all(&root).unwrap();
		root
	}

	fn run(chip: &mut SimulatedChip, root: PathBuf, script: &str) -> String {
		let bus = BusDriver::new(chip, SimulatedChip::config());
		let programmer = Programmer::new(bus, WriterConsole::new(Vec::new()));
		let mut session = Session::new(programmer, Cursor::new(script.as_bytes().to_vec()), root);
		session.run().unwrap();
		assert_eq!(session.state(), MenuState::Done);
		let (_, console) = session.into_programmer().into_parts();
		String::from_utf8(console.into_inner()).unwrap()
	}

	#[test]
	fn write_then_read() {
		let root = temp_root("write");
		fs::write(root.join("rom.bin"), &[0xea, 0x4c, 0x00, 0x80, 0x01]).unwrap();
		let mut chip = SimulatedChip::new();
		let text = run(&mut chip, root.clone(), "w\nrom.bin\n0010\n13\nr\n0012\n1\nq\n");

		assert!(text.contains("\trom.bin"));
		assert!(text.contains("Wrote 4 bytes from rom.bin"));
		assert!(text.contains("0010  ea 4c 00 80 ff"));
		assert_eq!(chip.latched(), &[(0x10, 0xea), (0x11, 0x4c), (0x12, 0x00), (0x13, 0x80)]);
		fs::remove_dir_all(&root).unwrap();
	}

	#[test]
	fn malformed_address_returns_to_mode_select() {
		let root = temp_root("malformed");
		let mut chip = SimulatedChip::new();
		let text = run(&mut chip, root.clone(), "r\n12x4\nx\n");

		assert!(text.contains("\"12x4\" is not a valid address"));
		assert!(text.contains("Invalid option provided."));
		assert!(chip.sampled().is_empty());
		fs::remove_dir_all(&root).unwrap();
	}

	#[test]
	fn out_of_range_start_is_reported() {
		let root = temp_root("range");
		let mut chip = SimulatedChip::new();
		let text = run(&mut chip, root.clone(), "r\n8000\n");
		assert!(text.contains("out of range"));
		assert!(chip.sampled().is_empty());
		fs::remove_dir_all(&root).unwrap();
	}

	#[test]
	fn unknown_file_stays_in_file_select() {
		let root = temp_root("file");
		let mut chip = SimulatedChip::new();
		let text = run(&mut chip, root.clone(), "W\nmissing.bin\n\nq\n");
		assert!(text.contains("missing.bin is not a valid file."));
		assert!(chip.latched().is_empty());
		fs::remove_dir_all(&root).unwrap();
	}

	#[test]
	fn source_error_is_reported_and_returns_to_mode_select() {
		let root = temp_root("broken");
		fs::write(root.join("rom.bin"), &[0x01]).unwrap();
		let mut chip = SimulatedChip::new();
		let text = {
			let bus = BusDriver::new(&mut chip, SimulatedChip::config());
			let programmer = Programmer::new(bus, WriterConsole::new(Vec::new()));
			let mut session = Session::new(programmer, Cursor::new(b"w\nrom.bin\n".to_vec()), root.clone());
			session.step().unwrap();
			session.step().unwrap();
			assert_eq!(session.state(), MenuState::Write);

			session.flash("rom.bin", FailingSource::new(&[0xaa, 0xbb]), 0x0000, 0x00ff);
			assert_eq!(session.state(), MenuState::ModeSelect);
			let (_, console) = session.into_programmer().into_parts();
			String::from_utf8(console.into_inner()).unwrap()
		};
		assert!(text.contains("Programming from rom.bin failed: read error on medium"));
		assert_eq!(chip.latched(), &[(0x0000, 0xaa), (0x0001, 0xbb)]);
		fs::remove_dir_all(&root).unwrap();
	}
}
