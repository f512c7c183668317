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

//! Access profiles of the tasks calling into the kernel.

/// Type representing a User ID.
pub type Uid = u32;
/// Type representing a Group ID.
pub type Gid = u32;

/// The root user ID.
pub const ROOT_UID: Uid = 0;
/// The root group ID.
pub const ROOT_GID: Gid = 0;

/// The identity a task uses to access kernel resources.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AccessProfile {
	/// Real ID of user.
	pub uid: Uid,
	/// Real ID of group.
	pub gid: Gid,

	/// Effective ID of user.
	pub euid: Uid,
	/// Effective ID of group.
	pub egid: Gid,
}

impl AccessProfile {
	/// Access profile of the kernel itself.
	pub const KERNEL: Self = Self {
		uid: ROOT_UID,
		gid: ROOT_GID,

		euid: ROOT_UID,
		egid: ROOT_GID,
	};

	/// Creates a profile where real and effective IDs are the same.
	pub const fn new(uid: Uid, gid: Gid) -> Self {
		Self {
			uid,
			gid,

			euid: uid,
			egid: gid,
		}
	}

	/// Tells whether the agent is privileged (root).
	pub fn is_privileged(&self) -> bool {
		self.euid == ROOT_UID
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn privileged() {
		assert!(AccessProfile::KERNEL.is_privileged());
		assert!(!AccessProfile::new(1000, 1000).is_privileged());
		// A setuid-root program is privileged
		let ap = AccessProfile {
			euid: ROOT_UID,
			..AccessProfile::new(1000, 1000)
		};
		assert!(ap.is_privileged());
	}
}
