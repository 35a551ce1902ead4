#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate at28c256_flash;
use at28c256_flash::*;

use std::fs;
use std::io::{
	self,
	BufReader,
};
use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;

use at28c256_flash::at28c256::{
	BusConfig,
	BusDriver,
	parse_pin_list,
};
use at28c256_flash::cmdline::Session;
use at28c256_flash::console::{
	Console,
	NoConsole,
	WriterConsole,
};
use at28c256_flash::gpio::{
	Pin,
	Pins,
};
use at28c256_flash::hex::{
	AddressError,
	parse_address,
};
use at28c256_flash::programmer::{
	PROGRAM_LIMIT,
	Programmer,
};
use at28c256_flash::source::StreamSource;

fn get_param<T>(matches: &clap::ArgMatches, name: &str, default: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = matches.value_of(name).unwrap_or(default);
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn get_address(matches: &clap::ArgMatches, name: &str, default: &str) -> AResult<u16> {
	let param = matches.value_of(name).unwrap_or(default);
	match parse_address(param) {
		Ok(address) => Ok(address),
		Err(e) => bail!("invalid parameter {}: {}", name, e),
	}
}

fn bus_config(matches: &clap::ArgMatches) -> AResult<BusConfig> {
	let mut config = BusConfig::default();
	config.clock = Duration::from_micros(get_param(matches, "clock_us", "1000")?);
	config.read_enable_settle = Duration::from_micros(get_param(matches, "read_settle_us", "100")?);
	if let Some(list) = matches.value_of("address_pins") {
		with_pins_context("address_pins", parse_pin_list(list, &mut config.pins.address))?;
	}
	if let Some(list) = matches.value_of("data_pins") {
		with_pins_context("data_pins", parse_pin_list(list, &mut config.pins.data))?;
	}
	if matches.is_present("we_pin") {
		config.pins.write_enable = Pin(get_param(matches, "we_pin", "")?);
	}
	if matches.is_present("oe_pin") {
		config.pins.output_enable = Pin(get_param(matches, "oe_pin", "")?);
	}
	config.pins.ensure_distinct()?;
	debug!("bus configuration: {:?}", config);
	Ok(config)
}

fn with_pins_context(name: &str, res: AResult<()>) -> AResult<()> {
	res.map_err(|e| {
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn program<P: Pins, C: Console>(programmer: &mut Programmer<P, C>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let path = match sub_m.value_of("FILE") {
		Some(p) => p,
		None => bail!("missing parameter FILE"),
	};
	let start = get_address(sub_m, "start", "0")?;
	let last = match parse_address(sub_m.value_of("end").unwrap_or("7ffe")) {
		Ok(last) => last,
		Err(AddressError::OutOfRange(value)) => {
			warn!("last address 0x{:x} clamped to 0x{:04x}", value, PROGRAM_LIMIT);
			PROGRAM_LIMIT
		},
		Err(e) => bail!("invalid parameter end: {}", e),
	};

	let file = fs::File::open(path).map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("open {}: {}", path, e);
		failure::Error::from(e.context(msg))
	})?;
	let written = programmer.program(StreamSource::new(BufReader::new(file)), start, last)?;
	info!("wrote {} bytes from {} starting at 0x{:04x}", written, path, start);
	Ok(())
}

fn dump<P: Pins, C: Console>(programmer: &mut Programmer<P, C>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let start = get_address(sub_m, "start", "0")?;
	let lines: u32 = get_param(sub_m, "lines", "1")?;

	if !programmer.console().is_available() {
		warn!("dump needs console output, not reading anything");
	}
	programmer.dump(start, lines);
	Ok(())
}

fn interactive<P: Pins, C: Console>(programmer: Programmer<P, C>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let root = PathBuf::from(sub_m.value_of("dir").unwrap_or("."));
	let stdin = io::stdin();
	let mut session = Session::new(programmer, stdin.lock(), root);
	session.run()
}

fn run<P: Pins, C: Console>(mut programmer: Programmer<P, C>, matches: &clap::ArgMatches) -> AResult<()> {
	match matches.subcommand() {
		("program", Some(sub_m)) => {
			program(&mut programmer, sub_m)
		},
		("dump", Some(sub_m)) => {
			dump(&mut programmer, sub_m)
		},
		("interactive", Some(sub_m)) => {
			interactive(programmer, sub_m)
		},
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn with_console<P: Pins>(pins: P, config: BusConfig, matches: &clap::ArgMatches) -> AResult<()> {
	let bus = BusDriver::new(pins, config);
	if matches.is_present("quiet") {
		run(Programmer::new(bus, NoConsole), matches)
	} else {
		run(Programmer::new(bus, WriterConsole::new(io::stdout())), matches)
	}
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg backend: -b --backend +takes_value "GPIO access: sysfs or gpiomem (default: sysfs)")
		(@arg clock_us: --("clock-us") +takes_value "bit and write pulse delay in microseconds (default: 1000)")
		(@arg read_settle_us: --("read-settle-us") +takes_value "delay after enabling output in microseconds (default: 100)")
		(@arg address_pins: --("address-pins") +takes_value "15 comma separated GPIO numbers, A0 first")
		(@arg data_pins: --("data-pins") +takes_value "8 comma separated GPIO numbers, D7 first")
		(@arg we_pin: --("we-pin") +takes_value "GPIO number of /WE")
		(@arg oe_pin: --("oe-pin") +takes_value "GPIO number of /OE")
		(@arg quiet: -q --quiet "no status output (also disables reading)")
		(@subcommand program =>
			(about: "write a binary file into the EEPROM")
			(@arg start: -s --start +takes_value "first address (hex, default: 0)")
			(@arg end: -e --end +takes_value "last address (hex, default: 7ffe)")
			(@arg FILE: +required "binary image to write")
		)
		(@subcommand dump =>
			(about: "hex dump EEPROM contents")
			(@arg start: -s --start +takes_value "address to start at (hex, rounded down to 16 bytes, default: 0)")
			(@arg lines: -n --lines +takes_value "number of 16 byte lines (default: 1)")
		)
		(@subcommand interactive =>
			(about: "menu driven reading and writing")
			(@arg dir: -d --dir +takes_value "directory with images to offer (default: .)")
		)
	).get_matches();

	let config = bus_config(&matches)?;
	let pins = config.pins;
	match matches.value_of("backend").unwrap_or("sysfs") {
		"sysfs" => with_console(gpio::open_sysfs(pins.all())?, config, &matches),
		"gpiomem" => with_console(gpio::open_gpiomem(pins.all())?, config, &matches),
		backend => bail!("unknown backend {:?}", backend),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
