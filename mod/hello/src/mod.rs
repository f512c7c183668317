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

//! Minimal kernel module, announcing in the kernel logs when it is loaded and unloaded.
//!
//! The module holds no state and acquires no resource, so loading it cannot fail.

#![cfg_attr(not(test), no_std)]

use core::ffi::c_int;
use kernel::{module_exit, module_init, pr_info};

kernel::module!([], "GPL");

/// The message logged when the module is loaded.
pub const GREETING: &str = "LKM: Hello kernel!";
/// The message logged when the module is unloaded.
pub const FAREWELL: &str = "LKM: Goodbye kernel!";

/// Called on module load
#[module_init]
fn hello_init() -> c_int {
	pr_info!("{GREETING}");
	0
}

/// Called on module unload
#[module_exit]
fn hello_exit() {
	pr_info!("{FAREWELL}");
}
