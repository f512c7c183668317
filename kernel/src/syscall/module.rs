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

//! Kernel module system calls.

use crate::{module, module::Image, perm::AccessProfile};
use core::ffi::c_uint;
use utils::{errno, errno::EResult};

/// `delete_module` flag: do not wait for the module to become unused.
pub const O_NONBLOCK: c_uint = 0o4000;
/// `delete_module` flag: unload the module even if other modules depend on it.
pub const O_TRUNC: c_uint = 0o1000;

/// Loads the kernel module declared by `image`.
pub fn init_module(image: &Image, ap: &AccessProfile) -> EResult<usize> {
	if !ap.is_privileged() {
		return Err(errno!(EPERM));
	}
	module::load(image)?;
	Ok(0)
}

/// Unloads the kernel module with the given `name`.
///
/// Unloading never waits, so [`O_NONBLOCK`] is accepted but has no effect.
pub fn delete_module(name: &str, flags: c_uint, ap: &AccessProfile) -> EResult<usize> {
	if !ap.is_privileged() {
		return Err(errno!(EPERM));
	}
	if flags & !(O_NONBLOCK | O_TRUNC) != 0 {
		return Err(errno!(EINVAL));
	}
	module::remove(name, flags & O_TRUNC != 0)?;
	Ok(0)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::module::{MOD_MAGIC, version::Version};
	use core::ffi::c_int;

	extern "C" fn init() -> c_int {
		0
	}

	static IMAGE: Image = Image {
		magic: MOD_MAGIC,
		name: "syscall_test",
		version: Version::new(0, 1, 0),
		license: "GPL",
		deps: &[],

		init,
		fini: None,
	};

	#[test]
	fn privileges() {
		let user = AccessProfile::new(1000, 1000);
		assert_eq!(init_module(&IMAGE, &user), Err(errno!(EPERM)));
		assert!(!module::is_loaded("syscall_test"));
		assert_eq!(init_module(&IMAGE, &AccessProfile::KERNEL), Ok(0));
		assert!(module::is_loaded("syscall_test"));
		assert_eq!(
			delete_module("syscall_test", 0, &user),
			Err(errno!(EPERM))
		);
		assert_eq!(
			delete_module("syscall_test", 0xffff, &AccessProfile::KERNEL),
			Err(errno!(EINVAL))
		);
		assert!(module::is_loaded("syscall_test"));
		assert_eq!(
			delete_module("syscall_test", O_NONBLOCK, &AccessProfile::KERNEL),
			Ok(0)
		);
		assert!(!module::is_loaded("syscall_test"));
		assert_eq!(
			delete_module("syscall_test", O_NONBLOCK, &AccessProfile::KERNEL),
			Err(errno!(ENOENT))
		);
	}
}
