/*
 * Copyright 2024 Luc Lenôtre
 *
 * This file is part of Maestro.
 *
 * Maestro is free software: you can redistribute it and/or modify it under the
 * terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or (at your option) any later
 * version.
 *
 * Maestro is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
 * A PARTICULAR PURPOSE. See the GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License along with
 * Maestro. If not, see <https://www.gnu.org/licenses/>.
 */

//! Kernel logging
//!
//! Each call to the logger produces one **record**, made of a [`Level`] and a message. Records
//! are stored in a ring buffer using the same layout as Linux's `/dev/kmsg`: `<N>message\n`,
//! where `N` is the numeric level.
//!
//! If the logger is set as silent, logs will not show up on the console, but will be kept in
//! memory anyways.

use core::{
	cmp::min,
	fmt,
	sync::atomic::{AtomicUsize, Ordering::Relaxed},
};
use utils::lock::Mutex;

/// The minimum size of a logs buffer in bytes.
pub const MIN_LOGS_SIZE: usize = 16;
/// The size of the kernel logs buffer in bytes.
pub const LOGS_SIZE: usize = build_cfg!(config_log_buffer_size);
/// Tells whether the kernel logger is silent at boot.
const DEFAULT_SILENT: bool = build_cfg!(config_log_silent);
/// Records with a level strictly lower than this value are echoed on the console.
const DEFAULT_CONSOLE_LEVEL: u8 = build_cfg!(config_log_console_level);

/// The kernel's logger.
pub static LOGGER: Mutex<Logger> = Mutex::new(Logger::new());

/// The severity of a log record.
///
/// The lower the value, the more critical the record.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
pub enum Level {
	/// The system is unusable.
	Emerg = 0,
	/// Action must be taken immediately.
	Alert = 1,
	/// Critical conditions.
	Crit = 2,
	/// Error conditions.
	Err = 3,
	/// Warning conditions.
	Warning = 4,
	/// Normal but significant condition.
	Notice = 5,
	/// Informational.
	Info = 6,
	/// Debug-level messages.
	Debug = 7,
}

impl Level {
	/// Returns the level corresponding to the given number.
	///
	/// If the number does not match any level, the function returns `None`.
	pub const fn from_u8(n: u8) -> Option<Self> {
		let level = match n {
			0 => Self::Emerg,
			1 => Self::Alert,
			2 => Self::Crit,
			3 => Self::Err,
			4 => Self::Warning,
			5 => Self::Notice,
			6 => Self::Info,
			7 => Self::Debug,
			_ => return None,
		};
		Some(level)
	}
}

/// Kernel logger, used to print/store kernel logs.
///
/// Internally, the logger uses a ring buffer of `N` bytes for storage. When the buffer is full,
/// the oldest records are evicted.
///
/// `N` must be at least [`MIN_LOGS_SIZE`]:
///
/// ```compile_fail
/// let _ = kernel::logger::Logger::<1>::new();
/// ```
pub struct Logger<const N: usize = LOGS_SIZE> {
	/// Tells whether the logger is silent.
	pub silent: bool,
	/// Only records with a level strictly lower than this value are echoed on the console. `0`
	/// echoes nothing.
	pub console_level: u8,

	/// The buffer storing the kernel logs.
	buff: [u8; N],
	/// The buffer's reading head.
	read_head: usize,
	/// The buffer's writing head.
	write_head: usize,

	/// The total number of records pushed since creation.
	count: usize,
}

impl<const N: usize> Logger<N> {
	/// Creates a new instance.
	pub const fn new() -> Self {
		const { assert!(N >= MIN_LOGS_SIZE, "logs buffer too small") };
		Logger {
			silent: DEFAULT_SILENT,
			console_level: DEFAULT_CONSOLE_LEVEL,

			buff: [0; N],
			read_head: 0,
			write_head: 0,

			count: 0,
		}
	}

	/// Returns the number of bytes used in the buffer.
	pub fn get_size(&self) -> usize {
		(self.write_head + N - self.read_head) % N
	}

	/// Returns the number of available bytes in the buffer.
	///
	/// One byte is always kept free to distinguish a full buffer from an empty one.
	fn available_space(&self) -> usize {
		N - 1 - self.get_size()
	}

	/// Returns the total number of records pushed since the creation of the logger, including
	/// those that have been evicted since.
	pub fn count(&self) -> usize {
		self.count
	}

	/// Returns the content of the logger's buffer, oldest bytes first.
	pub fn get_content(&self) -> Vec<u8> {
		let len = self.get_size();
		let first = min(len, N - self.read_head);
		let mut content = Vec::with_capacity(len);
		content.extend_from_slice(&self.buff[self.read_head..(self.read_head + first)]);
		content.extend_from_slice(&self.buff[..(len - first)]);
		content
	}

	/// Returns the records retained in the buffer, oldest first.
	///
	/// A line starting with a space is the continuation of a multiline message: it is appended
	/// to the previous record, without the space.
	pub fn records(&self) -> Vec<(Level, String)> {
		let content = self.get_content();
		let content = String::from_utf8_lossy(&content);
		let mut records: Vec<(Level, String)> = Vec::new();
		for line in content.lines() {
			let record = match line.strip_prefix(' ') {
				Some(_) => None,
				None => parse_record(line),
			};
			match record {
				Some((level, msg)) => records.push((level, msg.to_owned())),
				None => {
					// The head of an evicted record has no parent, drop it
					if let Some((_, msg)) = records.last_mut() {
						msg.push('\n');
						msg.push_str(line.strip_prefix(' ').unwrap_or(line));
					}
				}
			}
		}
		records
	}

	/// Drops every record retained in the buffer.
	///
	/// The count of records is left untouched.
	pub fn clear(&mut self) {
		self.read_head = self.write_head;
	}

	/// Logs the message with the given level.
	///
	/// Continuation lines of a multiline message are indented by one space so that they cannot
	/// be mistaken for the start of another record.
	///
	/// The message is truncated if it does not fit in the buffer.
	pub fn log(&mut self, level: Level, args: fmt::Arguments) {
		let msg = format!("{args}");
		let msg = msg.strip_suffix('\n').unwrap_or(&msg);
		let mut record = format!("<{}>{}\n", level as u8, msg.replace('\n', "\n "));
		if record.len() > N - 1 {
			let mut end = N - 2;
			while !record.is_char_boundary(end) {
				end -= 1;
			}
			record.truncate(end);
			let len = record.trim_end_matches('\n').len();
			record.truncate(len);
			record.push('\n');
		}
		self.push(record.as_bytes());
		self.count += 1;
		if self.is_echoed(level) {
			// Skip the level prefix
			let start = record.find('>').map(|i| i + 1).unwrap_or(0);
			console_write(&record[start..]);
		}
	}

	/// Tells whether a record with the given level is written on the console.
	pub fn is_echoed(&self, level: Level) -> bool {
		!self.silent && (level as u8) < self.console_level
	}

	/// Pushes the given record onto the kernel logs buffer.
	///
	/// The record must end with a newline and must not be larger than the buffer's capacity.
	fn push(&mut self, s: &[u8]) {
		if self.available_space() < s.len() {
			self.pop(s.len() - self.available_space());
		}
		let first = min(s.len(), N - self.write_head);
		self.buff[self.write_head..(self.write_head + first)].copy_from_slice(&s[..first]);
		self.buff[..(s.len() - first)].copy_from_slice(&s[first..]);
		self.write_head = (self.write_head + s.len()) % N;
	}

	/// Pops at least `n` bytes from the buffer. If popping `n` bytes results in cutting a line,
	/// the function pops the full line.
	fn pop(&mut self, n: usize) {
		let n = min(n, self.get_size());
		if n == 0 {
			return;
		}
		let mut read = (self.read_head + n) % N;
		while read != self.write_head && self.buff[(read + N - 1) % N] != b'\n' {
			read = (read + 1) % N;
		}
		self.read_head = read;
	}
}

impl<const N: usize> Default for Logger<N> {
	fn default() -> Self {
		Self::new()
	}
}

/// Parses a record line of the form `<N>message`.
fn parse_record(line: &str) -> Option<(Level, &str)> {
	let rest = line.strip_prefix('<')?;
	let (level, msg) = rest.split_once('>')?;
	let level = Level::from_u8(level.parse().ok()?)?;
	Some((level, msg))
}

/// The number of bytes written on the console since boot.
static CONSOLE_WRITTEN: AtomicUsize = AtomicUsize::new(0);

/// Writes the given string on the console.
fn console_write(s: &str) {
	eprint!("{s}");
	CONSOLE_WRITTEN.fetch_add(s.len(), Relaxed);
}

/// Returns the number of bytes written on the console since boot.
pub fn console_written() -> usize {
	CONSOLE_WRITTEN.load(Relaxed)
}

#[cfg(test)]
mod test {
	use super::*;

	fn log(logger: &mut Logger<32>, level: Level, msg: &str) {
		logger.log(level, format_args!("{msg}"));
	}

	fn quiet() -> Logger<32> {
		let mut logger = Logger::new();
		logger.silent = true;
		logger
	}

	#[test]
	fn level_numbers() {
		for n in 0..8 {
			assert_eq!(Level::from_u8(n).map(|l| l as u8), Some(n));
		}
		assert_eq!(Level::from_u8(8), None);
		assert!(Level::Emerg < Level::Debug);
	}

	#[test]
	fn records_keep_level() {
		let mut logger = quiet();
		log(&mut logger, Level::Info, "hello");
		log(&mut logger, Level::Err, "oops\n");
		assert_eq!(logger.get_content(), b"<6>hello\n<3>oops\n");
		assert_eq!(
			logger.records(),
			[
				(Level::Info, "hello".to_owned()),
				(Level::Err, "oops".to_owned())
			]
		);
		assert_eq!(logger.count(), 2);
	}

	#[test]
	fn eviction_drops_whole_records() {
		let mut logger = quiet();
		log(&mut logger, Level::Info, "aaaaaaaa");
		log(&mut logger, Level::Info, "bbbbbbbb");
		// 12 + 12 bytes used, 7 available: evicts the first record only
		log(&mut logger, Level::Info, "cccccccc");
		assert_eq!(
			logger.records(),
			[
				(Level::Info, "bbbbbbbb".to_owned()),
				(Level::Info, "cccccccc".to_owned())
			]
		);
		assert_eq!(logger.count(), 3);
		// Wrap around several times
		for i in 0..10 {
			log(&mut logger, Level::Debug, &format!("{i}"));
		}
		let records = logger.records();
		assert_eq!(records.last(), Some(&(Level::Debug, "9".to_owned())));
		assert!(logger.get_size() < 32);
	}

	#[test]
	fn long_record_truncated() {
		let mut logger = quiet();
		log(&mut logger, Level::Warning, &"x".repeat(100));
		let content = logger.get_content();
		assert_eq!(content.len(), 31);
		assert_eq!(content.last(), Some(&b'\n'));
		let records = logger.records();
		assert_eq!(records.len(), 1);
		assert_eq!(records[0].0, Level::Warning);
		assert_eq!(records[0].1, "x".repeat(27));
	}

	#[test]
	fn multiline_record() {
		let mut logger = quiet();
		log(&mut logger, Level::Notice, "first\nsecond");
		assert_eq!(
			logger.records(),
			[(Level::Notice, "first\nsecond".to_owned())]
		);
		assert_eq!(logger.get_content(), b"<5>first\n second\n");
	}

	#[test]
	fn multiline_record_with_prefix() {
		let mut logger = Logger::<64>::new();
		logger.silent = true;
		logger.log(Level::Info, format_args!("first\n<3>second\n third"));
		assert_eq!(logger.count(), 1);
		assert_eq!(
			logger.records(),
			[(Level::Info, "first\n<3>second\n third".to_owned())]
		);
	}

	#[test]
	fn smallest_buffer() {
		let mut logger = Logger::<MIN_LOGS_SIZE>::new();
		logger.silent = true;
		logger.log(Level::Err, format_args!("{}", "y".repeat(40)));
		logger.log(Level::Info, format_args!("ok"));
		assert_eq!(logger.count(), 2);
		assert!(logger.get_size() < MIN_LOGS_SIZE);
		assert_eq!(logger.records().last(), Some(&(Level::Info, "ok".to_owned())));
	}

	#[test]
	fn clear_keeps_count() {
		let mut logger = quiet();
		log(&mut logger, Level::Info, "a");
		logger.clear();
		assert!(logger.records().is_empty());
		assert_eq!(logger.get_size(), 0);
		assert_eq!(logger.count(), 1);
	}

	#[test]
	fn console_threshold() {
		let mut logger = Logger::<32>::new();
		logger.silent = false;
		logger.console_level = Level::Info as u8;
		assert!(!logger.is_echoed(Level::Debug));
		assert!(!logger.is_echoed(Level::Info));
		assert!(logger.is_echoed(Level::Notice));
		assert!(logger.is_echoed(Level::Emerg));
		logger.console_level = 0;
		assert!(!logger.is_echoed(Level::Emerg));
		logger.console_level = 8;
		assert!(logger.is_echoed(Level::Debug));
		logger.silent = true;
		assert!(!logger.is_echoed(Level::Emerg));
	}

	#[test]
	fn console_echo() {
		let mut logger = Logger::<32>::new();
		logger.silent = false;
		logger.console_level = Level::Info as u8;
		let before = console_written();
		log(&mut logger, Level::Debug, "hidden");
		log(&mut logger, Level::Info, "hidden");
		// Other tests may write concurrently, so only check something was written
		log(&mut logger, Level::Err, "shown");
		assert!(console_written() >= before + "shown\n".len());
		assert_eq!(logger.records().len(), 3);
	}
}
