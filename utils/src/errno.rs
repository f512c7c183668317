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

//! Error numbers.
//!
//! Errors returned by the kernel are represented by an [`Errno`], which wraps the same numeric
//! codes as Linux. They are created with the [`crate::errno!`] macro:
//!
//! ```
//! use utils::errno;
//!
//! let err = errno!(ENOENT);
//! assert_eq!(err.as_int(), utils::errno::ENOENT);
//! ```

use core::{error::Error, ffi::c_int, fmt};

/// Operation not permitted.
pub const EPERM: c_int = 1;
/// No such file or directory.
pub const ENOENT: c_int = 2;
/// I/O error.
pub const EIO: c_int = 5;
/// Exec format error.
pub const ENOEXEC: c_int = 8;
/// Resource temporarily unavailable.
pub const EAGAIN: c_int = 11;
/// Cannot allocate memory.
pub const ENOMEM: c_int = 12;
/// Permission denied.
pub const EACCES: c_int = 13;
/// Bad address.
pub const EFAULT: c_int = 14;
/// Device or resource busy.
pub const EBUSY: c_int = 16;
/// File exists.
pub const EEXIST: c_int = 17;
/// No such device.
pub const ENODEV: c_int = 19;
/// Invalid argument.
pub const EINVAL: c_int = 22;
/// Function not implemented.
pub const ENOSYS: c_int = 38;

/// Result type for operations that can fail with an [`Errno`].
pub type EResult<T> = Result<T, Errno>;

/// Creates an [`Errno`] from the name of its constant.
#[macro_export]
macro_rules! errno {
	($errno:ident) => {
		$crate::errno::Errno::new($crate::errno::$errno)
	};
}

/// An error number.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct Errno(c_int);

impl Errno {
	/// Creates a new instance from the given code.
	pub const fn new(errno: c_int) -> Self {
		Self(errno)
	}

	/// Returns the numeric code of the error.
	pub const fn as_int(self) -> c_int {
		self.0
	}

	/// Returns the code as expected in the return value of a C function, meaning negated.
	pub const fn as_ret(self) -> c_int {
		-self.0
	}

	/// Returns the name of the error, or `None` if the code is unknown.
	pub fn name(self) -> Option<&'static str> {
		let name = match self.0 {
			EPERM => "EPERM",
			ENOENT => "ENOENT",
			EIO => "EIO",
			ENOEXEC => "ENOEXEC",
			EAGAIN => "EAGAIN",
			ENOMEM => "ENOMEM",
			EACCES => "EACCES",
			EFAULT => "EFAULT",
			EBUSY => "EBUSY",
			EEXIST => "EEXIST",
			ENODEV => "ENODEV",
			EINVAL => "EINVAL",
			ENOSYS => "ENOSYS",
			_ => return None,
		};
		Some(name)
	}

	/// Returns a human-readable description of the error.
	pub fn strerror(self) -> &'static str {
		match self.0 {
			EPERM => "Operation not permitted",
			ENOENT => "No such file or directory",
			EIO => "Input/output error",
			ENOEXEC => "Exec format error",
			EAGAIN => "Resource temporarily unavailable",
			ENOMEM => "Cannot allocate memory",
			EACCES => "Permission denied",
			EFAULT => "Bad address",
			EBUSY => "Device or resource busy",
			EEXIST => "File exists",
			ENODEV => "No such device",
			EINVAL => "Invalid argument",
			ENOSYS => "Function not implemented",
			_ => "Unknown error",
		}
	}
}

impl fmt::Debug for Errno {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.name() {
			Some(name) => write!(f, "{name}"),
			None => write!(f, "Errno({})", self.0),
		}
	}
}

impl fmt::Display for Errno {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} (errno {})", self.strerror(), self.0)
	}
}

impl Error for Errno {}
