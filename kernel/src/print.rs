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

//! Implementation of printing/logging macros.
//!
//! Unlike the print macros from Rust's standard library, these are used to log informations
//! instead of only printing. Each invocation produces exactly one record in the kernel logs.
//!
//! [`print!`] and [`println!`] log at [`Level::Info`]. The `pr_*` macros log at the level in their
//! name.
//!
//! Printing can be silenced in the build configuration, but logs remain in memory.

use crate::logger::{LOGGER, Level};
use core::fmt;

/// Prints/logs the given message.
///
/// This function is meant to be used through the macros of this module only.
#[doc(hidden)]
pub fn _print(level: Level, args: fmt::Arguments) {
	LOGGER.lock().log(level, args);
}

/// Prints the given formatted string with the given values.
#[macro_export]
macro_rules! print {
	($($arg:tt)*) => {{
		$crate::print::_print($crate::logger::Level::Info, format_args!($($arg)*));
	}};
}

/// Same as [`crate::print!`], except it appends a newline at the end.
#[macro_export]
macro_rules! println {
	() => ($crate::print!("\n"));
	($($arg:tt)*) => {{
		$crate::print::_print(
			$crate::logger::Level::Info,
			format_args!("{}\n", format_args!($($arg)*)),
		);
	}};
}

/// Logs a message at [`Level::Emerg`].
#[macro_export]
macro_rules! pr_emerg {
	($($arg:tt)*) => {{
		$crate::print::_print($crate::logger::Level::Emerg, format_args!($($arg)*));
	}};
}

/// Logs a message at [`Level::Alert`].
#[macro_export]
macro_rules! pr_alert {
	($($arg:tt)*) => {{
		$crate::print::_print($crate::logger::Level::Alert, format_args!($($arg)*));
	}};
}

/// Logs a message at [`Level::Crit`].
#[macro_export]
macro_rules! pr_crit {
	($($arg:tt)*) => {{
		$crate::print::_print($crate::logger::Level::Crit, format_args!($($arg)*));
	}};
}

/// Logs a message at [`Level::Err`].
#[macro_export]
macro_rules! pr_err {
	($($arg:tt)*) => {{
		$crate::print::_print($crate::logger::Level::Err, format_args!($($arg)*));
	}};
}

/// Logs a message at [`Level::Warning`].
#[macro_export]
macro_rules! pr_warn {
	($($arg:tt)*) => {{
		$crate::print::_print($crate::logger::Level::Warning, format_args!($($arg)*));
	}};
}

/// Logs a message at [`Level::Notice`].
#[macro_export]
macro_rules! pr_notice {
	($($arg:tt)*) => {{
		$crate::print::_print($crate::logger::Level::Notice, format_args!($($arg)*));
	}};
}

/// Logs a message at [`Level::Info`].
#[macro_export]
macro_rules! pr_info {
	($($arg:tt)*) => {{
		$crate::print::_print($crate::logger::Level::Info, format_args!($($arg)*));
	}};
}

/// Logs a message at [`Level::Debug`].
#[macro_export]
macro_rules! pr_debug {
	($($arg:tt)*) => {{
		$crate::print::_print($crate::logger::Level::Debug, format_args!($($arg)*));
	}};
}
