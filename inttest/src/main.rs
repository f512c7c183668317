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

//! `inttest` drives kernel modules through their whole lifecycle on the hosted kernel, the way a
//! user loading and unloading them would.

use crate::util::TestResult;
use std::process::exit;

mod module;
mod util;

struct TestSuite {
	name: &'static str,
	desc: &'static str,
	tests: &'static [Test],
}

struct Test {
	name: &'static str,
	desc: &'static str,
	start: fn() -> TestResult,
}

/// The list of tests to perform.
///
/// Tests of a suite run in order and may depend on the state left by the previous ones.
const TESTS: &[TestSuite] = &[TestSuite {
	name: "module",
	desc: "Load and unload the `hello` kernel module",
	tests: &[
		Test {
			name: "activate",
			desc: "The activation routine always succeeds and greets once",
			start: module::activate,
		},
		Test {
			name: "unprivileged",
			desc: "Loading requires privileges",
			start: module::unprivileged,
		},
		Test {
			name: "load",
			desc: "Load the module",
			start: module::load,
		},
		Test {
			name: "reload",
			desc: "A loaded module cannot be loaded again",
			start: module::reload,
		},
		Test {
			name: "unload",
			desc: "Unload the module",
			start: module::unload,
		},
		Test {
			name: "unload twice",
			desc: "An unloaded module cannot be unloaded again",
			start: module::unload_twice,
		},
	],
}];

fn main() {
	// Keep the kernel's console quiet so that only test markers are printed
	kernel::logger::LOGGER.lock().silent = true;
	// The total number of tests
	let total: usize = TESTS.iter().map(|t| t.tests.len()).sum();
	// Start marker
	println!();
	println!("[START]");
	let mut success = 0;
	for suite in TESTS {
		println!("[SUITE] {}", suite.name);
		println!("[DESC] {}", suite.desc);
		for test in suite.tests {
			println!("[TEST] {}", test.name);
			println!("[DESC] {}", test.desc);
			let res = (test.start)();
			match res {
				Ok(_) => {
					success += 1;
					println!("[OK]")
				}
				Err(err) => println!("[KO] {}", err.0),
			}
		}
	}
	println!("[SUCCESS] {success}/{total}");
	// End marker
	println!("[END]");
	if success < total {
		exit(1);
	}
}
