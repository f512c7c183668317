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

//! Utility features.

use kernel::logger::{LOGGER, Level};
use std::error::Error;

pub struct TestError(pub String);

impl<E: Error> From<E> for TestError {
	fn from(err: E) -> Self {
		TestError(err.to_string())
	}
}

/// Result of a test.
pub type TestResult = Result<(), TestError>;

/// Test assertion.
#[macro_export]
macro_rules! test_assert {
	($predicate:expr) => {{
		let pred = ($predicate);
		if !pred {
			return Err($crate::util::TestError(format!(
				"Assertion failed: {}",
				stringify!($predicate)
			)));
		}
	}};
}

/// Test assertion with comparison.
#[macro_export]
macro_rules! test_assert_eq {
	($a:expr, $b:expr) => {{
		let a = ($a);
		let b = ($b);
		if a != b {
			return Err($crate::util::TestError(format!(
				"Assertion failed\n\tleft: `{:?}`\n\tright: `{:?}`",
				a, b
			)));
		}
	}};
}

/// Prints a log.
#[macro_export]
macro_rules! log {
	($($arg:tt)*) => {{
		println!("[LOG] {}", format_args!($($arg)*));
	}};
}

/// Returns the current position in the kernel logs, to be passed to [`records_since`].
pub fn log_mark() -> usize {
	LOGGER.lock().count()
}

/// Returns the kernel log records produced since `mark`.
pub fn records_since(mark: usize) -> Vec<(Level, String)> {
	let logger = LOGGER.lock();
	let records = logger.records();
	let n = (logger.count() - mark).min(records.len());
	records[(records.len() - n)..].to_vec()
}

/// Returns the number of records produced since `mark` with the given message.
pub fn count_since(mark: usize, msg: &str) -> usize {
	records_since(mark)
		.iter()
		.filter(|(_, m)| m == msg)
		.count()
}
