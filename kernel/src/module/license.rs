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

//! Module licenses and kernel taint.
//!
//! Loading a module whose license is not compatible with the GPL **taints** the kernel. A tainted
//! kernel keeps running, but the taint is recorded so that bug reports can be filtered.

use core::sync::atomic::{AtomicU32, Ordering::Relaxed};

/// Taint: a module with a license that is not GPL-compatible has been loaded.
pub const TAINT_PROPRIETARY_MODULE: u32 = 1 << 0;
/// Taint: a module has been removed while other modules depended on it.
pub const TAINT_FORCED_RMMOD: u32 = 1 << 3;

/// License strings accepted as GPL-compatible.
const GPL_COMPATIBLE: &[&str] = &[
	"GPL",
	"GPL v2",
	"GPL and additional rights",
	"Dual BSD/GPL",
	"Dual MIT/GPL",
	"Dual MPL/GPL",
	"GPL-2.0",
	"GPL-2.0-only",
	"GPL-2.0-or-later",
	"GPL-3.0",
	"GPL-3.0-only",
	"GPL-3.0-or-later",
];

/// The current taint flags of the kernel.
static TAINT: AtomicU32 = AtomicU32::new(0);

/// Tells whether the given license is compatible with the GPL.
pub fn is_gpl_compatible(license: &str) -> bool {
	GPL_COMPATIBLE.contains(&license)
}

/// Adds the given taint flag(s) to the kernel.
pub fn add_taint(flags: u32) {
	TAINT.fetch_or(flags, Relaxed);
}

/// Returns the taint flags of the kernel.
pub fn tainted() -> u32 {
	TAINT.load(Relaxed)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn gpl_compatible() {
		assert!(is_gpl_compatible("GPL"));
		assert!(is_gpl_compatible("Dual BSD/GPL"));
		assert!(is_gpl_compatible("GPL-3.0-or-later"));
		assert!(!is_gpl_compatible(""));
		assert!(!is_gpl_compatible("gpl"));
		assert!(!is_gpl_compatible("Proprietary"));
		assert!(!is_gpl_compatible("MIT"));
	}

	#[test]
	fn taint_accumulates() {
		add_taint(TAINT_FORCED_RMMOD);
		add_taint(TAINT_FORCED_RMMOD);
		assert_ne!(tainted() & TAINT_FORCED_RMMOD, 0);
	}
}
