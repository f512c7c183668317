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

//! Kernel module testing.

use crate::{
	log, test_assert, test_assert_eq,
	util::{TestResult, count_since, log_mark, records_since},
};
use hello::{FAREWELL, GREETING, MOD_IMAGE};
use kernel::{
	logger::Level,
	module,
	perm::AccessProfile,
	syscall::module::{O_NONBLOCK, delete_module, init_module},
	utils::errno,
};

pub fn activate() -> TestResult {
	log!("Call the activation routine directly");
	for _ in 0..3 {
		let mark = log_mark();
		test_assert_eq!(hello::init(), 0);
		test_assert_eq!(
			records_since(mark),
			[(Level::Info, GREETING.to_owned())]
		);
	}
	Ok(())
}

pub fn unprivileged() -> TestResult {
	log!("Load the module as a regular user");
	let ap = AccessProfile::new(1000, 1000);
	let res = init_module(&MOD_IMAGE, &ap);
	test_assert_eq!(res, Err(errno!(EPERM)));
	test_assert!(!module::is_loaded("hello"));
	Ok(())
}

pub fn load() -> TestResult {
	log!("Load the module");
	let mark = log_mark();
	init_module(&MOD_IMAGE, &AccessProfile::KERNEL)?;

	log!("Check the module is loaded and greeted");
	test_assert!(module::is_loaded("hello"));
	test_assert_eq!(count_since(mark, GREETING), 1);
	Ok(())
}

pub fn reload() -> TestResult {
	log!("Load the module a second time");
	let mark = log_mark();
	let res = init_module(&MOD_IMAGE, &AccessProfile::KERNEL);
	test_assert_eq!(res, Err(errno!(EEXIST)));
	test_assert_eq!(count_since(mark, GREETING), 0);
	Ok(())
}

pub fn unload() -> TestResult {
	log!("Unload the module");
	let mark = log_mark();
	delete_module("hello", O_NONBLOCK, &AccessProfile::KERNEL)?;

	log!("Check the module is gone");
	test_assert!(!module::is_loaded("hello"));
	test_assert_eq!(count_since(mark, FAREWELL), 1);
	Ok(())
}

pub fn unload_twice() -> TestResult {
	log!("Unload the module a second time");
	let mark = log_mark();
	let res = delete_module("hello", O_NONBLOCK, &AccessProfile::KERNEL);
	test_assert_eq!(res, Err(errno!(ENOENT)));
	test_assert_eq!(count_since(mark, FAREWELL), 0);
	Ok(())
}
