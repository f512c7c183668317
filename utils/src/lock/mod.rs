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

//! Mutually exclusive access primitive based on a spinlock.
//!
//! A [`Mutex`] protects its wrapped data from being accessed concurrently. Since it can be
//! created in a `const` context, it is suitable for `static` kernel structures such as the logger
//! or the list of loaded modules.
//!
//! Locking is **not** reentrant: locking a mutex twice from the same context deadlocks.

use core::{
	cell::UnsafeCell,
	fmt::{self, Formatter},
	hint,
	ops::{Deref, DerefMut},
	sync::atomic::{
		AtomicBool,
		Ordering::{Acquire, Relaxed, Release},
	},
};

/// Unlocks the associated [`Mutex`] when dropped.
pub struct MutexGuard<'m, T: ?Sized> {
	mutex: &'m Mutex<T>,
}

impl<T: ?Sized> Deref for MutexGuard<'_, T> {
	type Target = T;

	fn deref(&self) -> &Self::Target {
		unsafe { &*self.mutex.data.get() }
	}
}

impl<T: ?Sized> DerefMut for MutexGuard<'_, T> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		unsafe { &mut *self.mutex.data.get() }
	}
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for MutexGuard<'_, T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(self.deref(), f)
	}
}

impl<T: ?Sized> Drop for MutexGuard<'_, T> {
	fn drop(&mut self) {
		unsafe {
			self.mutex.unlock();
		}
	}
}

/// Wraps a value which can be accessed by only one context at a time.
pub struct Mutex<T: ?Sized> {
	spin: AtomicBool,
	data: UnsafeCell<T>,
}

impl<T> Mutex<T> {
	/// Creates a new instance wrapping the given `data`.
	pub const fn new(data: T) -> Self {
		Self {
			spin: AtomicBool::new(false),
			data: UnsafeCell::new(data),
		}
	}

	/// Consumes the mutex and returns the inner value.
	pub fn into_inner(self) -> T {
		self.data.into_inner()
	}
}

impl<T: Default> Default for Mutex<T> {
	fn default() -> Self {
		Self::new(Default::default())
	}
}

impl<T: ?Sized> Mutex<T> {
	/// Acquires the mutex.
	///
	/// If the mutex is already acquired, the thread loops until it becomes available.
	///
	/// The function returns a [`MutexGuard`] associated with `self`. When dropped, the mutex is
	/// released.
	pub fn lock(&self) -> MutexGuard<'_, T> {
		while self
			.spin
			.compare_exchange_weak(false, true, Acquire, Relaxed)
			.is_err()
		{
			hint::spin_loop();
		}
		MutexGuard {
			mutex: self,
		}
	}

	/// Attempts to acquire the mutex without waiting.
	///
	/// If the mutex is already acquired, the function returns `None`.
	pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
		self.spin
			.compare_exchange(false, true, Acquire, Relaxed)
			.ok()
			.map(|_| MutexGuard {
				mutex: self,
			})
	}

	/// Releases the mutex. This function should not be used directly since it is called when the
	/// guard is dropped.
	///
	/// # Safety
	///
	/// If the mutex is not acquired, the behaviour is undefined.
	///
	/// Releasing the mutex while the resource is being used may result in concurrent accesses.
	pub unsafe fn unlock(&self) {
		self.spin.store(false, Release);
	}
}

unsafe impl<T: ?Sized + Send> Send for Mutex<T> {}

unsafe impl<T: ?Sized + Send> Sync for Mutex<T> {}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Mutex<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let guard = self.lock();
		fmt::Debug::fmt(&*guard, f)
	}
}
