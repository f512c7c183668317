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

//! Registration of the lifecycle functions of kernel modules.
//!
//! The kernel looks up a module's activation and deactivation routines by their symbol names
//! (`init` and `fini`). The attributes implemented here wrap the decorated function into an
//! exported function with the expected name and ABI, so that modules can give their routines
//! meaningful names.

use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemFn, ReturnType, Signature, Type, parse_macro_input};

/// Checks the attribute is used without arguments.
fn check_metadata(metadata: TokenStream, attr: &str) {
	let metadata = proc_macro2::TokenStream::from(metadata);
	if !metadata.is_empty() {
		panic!("`{attr}` does not take arguments");
	}
}

/// Checks the signature of a lifecycle function.
///
/// `symbol` is the name under which the function is exported.
fn check_signature(sig: &Signature, attr: &str, symbol: &str) {
	let ident = &sig.ident;
	if sig.constness.is_some() {
		panic!("`{attr}` function `{ident}` cannot be `const`");
	}
	if sig.asyncness.is_some() {
		panic!("`{attr}` function `{ident}` cannot be `async`");
	}
	if sig.unsafety.is_some() {
		panic!("`{attr}` function `{ident}` cannot be `unsafe`");
	}
	if !sig.generics.params.is_empty() {
		panic!("`{attr}` function `{ident}` cannot be generic");
	}
	if !sig.inputs.is_empty() || sig.variadic.is_some() {
		panic!("`{attr}` function `{ident}` cannot take arguments");
	}
	if ident == symbol {
		panic!("`{attr}` function cannot be named `{symbol}`");
	}
}

/// Tells whether the given return type is `()`.
fn is_unit(output: &ReturnType) -> bool {
	match output {
		ReturnType::Default => true,
		ReturnType::Type(_, ty) => matches!(&**ty, Type::Tuple(t) if t.elems.is_empty()),
	}
}

pub fn module_init(metadata: TokenStream, input: TokenStream) -> TokenStream {
	check_metadata(metadata, "module_init");
	let input = parse_macro_input!(input as ItemFn);
	check_signature(&input.sig, "module_init", "init");
	let ident = &input.sig.ident;
	if is_unit(&input.sig.output) {
		panic!("`module_init` function `{ident}` must return a `c_int`");
	}
	let toks = quote! {
		#input

		#[doc(hidden)]
		#[unsafe(no_mangle)]
		pub extern "C" fn init() -> ::core::ffi::c_int {
			#ident()
		}
	};
	TokenStream::from(toks)
}

pub fn module_exit(metadata: TokenStream, input: TokenStream) -> TokenStream {
	check_metadata(metadata, "module_exit");
	let input = parse_macro_input!(input as ItemFn);
	check_signature(&input.sig, "module_exit", "fini");
	let ident = &input.sig.ident;
	if !is_unit(&input.sig.output) {
		panic!("`module_exit` function `{ident}` cannot return a value");
	}
	let toks = quote! {
		#input

		#[doc(hidden)]
		#[unsafe(no_mangle)]
		pub extern "C" fn fini() {
			#ident()
		}
	};
	TokenStream::from(toks)
}
