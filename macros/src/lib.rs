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

//! This crate implements procedural macros for the Maestro kernel and its modules.

extern crate proc_macro;

mod lifecycle;

use proc_macro::TokenStream;

/// Registers the decorated function as the activation routine of a kernel module.
///
/// The function takes no argument and returns a `c_int`: `0` on success, or a negated error
/// number on failure. It is exported as the module's `init` symbol, called by the kernel when
/// the module is loaded.
///
/// Example:
/// ```ignore
/// #[kernel::module_init]
/// fn hello_init() -> c_int {
/// 	kernel::pr_info!("Hello world!");
/// 	0
/// }
/// ```
#[proc_macro_attribute]
pub fn module_init(metadata: TokenStream, input: TokenStream) -> TokenStream {
	lifecycle::module_init(metadata, input)
}

/// Registers the decorated function as the deactivation routine of a kernel module.
///
/// The function takes no argument and returns nothing. It is exported as the module's `fini`
/// symbol, called by the kernel when the module is unloaded.
#[proc_macro_attribute]
pub fn module_exit(metadata: TokenStream, input: TokenStream) -> TokenStream {
	lifecycle::module_exit(metadata, input)
}
