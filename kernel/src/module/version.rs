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

//! The module implements a Version structure.
//!
//! A version is divided into the following component:
//! - Major: Version including breaking changes
//! - Minor: Version including new features
//! - Patch: Version including bug fixes and optimizations

use core::{
	cmp::Ordering,
	fmt::{self, Display, Formatter},
};

/// Structure representing a version.
///
/// Versions are ordered by major, then minor, then patch.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Version {
	/// The major version
	pub major: u16,
	/// The minor version
	pub minor: u16,
	/// The patch version
	pub patch: u16,
}

impl Version {
	/// Creates a new instance.
	pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
		Self {
			major,
			minor,
			patch,
		}
	}

	/// Parses a version from the given string.
	///
	/// The string must have the form `X.Y.Z`, where each component is a decimal number fitting
	/// in 16 bits. Anything else, such as pre-release suffixes, is rejected.
	///
	/// If the string is invalid, the function returns `None`.
	pub const fn parse(s: &str) -> Option<Self> {
		let bytes = s.as_bytes();
		let mut comps = [0u16; 3];
		let mut idx = 0;
		let mut digits = 0;
		let mut i = 0;
		while i < bytes.len() {
			match bytes[i] {
				c @ b'0'..=b'9' => {
					let Some(n) = comps[idx].checked_mul(10) else {
						return None;
					};
					let Some(n) = n.checked_add((c - b'0') as u16) else {
						return None;
					};
					comps[idx] = n;
					digits += 1;
				}
				b'.' => {
					if digits == 0 || idx == 2 {
						return None;
					}
					idx += 1;
					digits = 0;
				}
				_ => return None,
			}
			i += 1;
		}
		if idx != 2 || digits == 0 {
			return None;
		}
		Some(Self::new(comps[0], comps[1], comps[2]))
	}
}

impl Display for Version {
	fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
		write!(fmt, "{}.{}.{}", self.major, self.minor, self.patch)
	}
}

/// A dependency of a kernel module on another one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Dependency {
	/// The name of the required module.
	pub name: &'static str,
	/// The version the required module is compared against.
	pub version: Version,
	/// The expected result of comparing the loaded version with [`Self::version`].
	///
	/// For example, [`Ordering::Greater`] requires a version strictly more recent.
	pub constraint: Ordering,
}

impl Dependency {
	/// Tells whether the given version of the required module satisfies the dependency.
	pub fn is_satisfied_by(&self, version: &Version) -> bool {
		version.cmp(&self.version) == self.constraint
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn parse_valid() {
		assert_eq!(Version::parse("0.1.0"), Some(Version::new(0, 1, 0)));
		assert_eq!(Version::parse("1.0.0"), Some(Version::new(1, 0, 0)));
		assert_eq!(
			Version::parse("12.345.65535"),
			Some(Version::new(12, 345, 65535))
		);
	}

	#[test]
	fn parse_invalid() {
		for s in [
			"", "1", "1.0", "1.0.", ".1.0", "1..0", "1.0.0.0", "a.b.c", "1.0.0-rc1", "65536.0.0",
			" 1.0.0",
		] {
			assert_eq!(Version::parse(s), None, "{s:?}");
		}
	}

	#[test]
	fn parse_const() {
		const VERSION: Option<Version> = Version::parse("2.4.8");
		assert_eq!(VERSION, Some(Version::new(2, 4, 8)));
	}

	#[test]
	fn ordering() {
		assert!(Version::new(1, 0, 0) > Version::new(0, 9, 9));
		assert!(Version::new(1, 2, 0) > Version::new(1, 1, 9));
		assert!(Version::new(1, 1, 2) > Version::new(1, 1, 1));
		assert_eq!(
			Version::new(3, 2, 1).cmp(&Version::new(3, 2, 1)),
			Ordering::Equal
		);
	}

	#[test]
	fn display() {
		assert_eq!(Version::new(1, 20, 300).to_string(), "1.20.300");
	}

	#[test]
	fn dependency_constraint() {
		let dep = Dependency {
			name: "plop",
			version: Version::new(1, 0, 0),
			constraint: Ordering::Greater,
		};
		assert!(dep.is_satisfied_by(&Version::new(1, 0, 1)));
		assert!(!dep.is_satisfied_by(&Version::new(1, 0, 0)));
		assert!(!dep.is_satisfied_by(&Version::new(0, 9, 0)));
	}
}
