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

//! Hosted build of Maestro's kernel module subsystem. This reference documents the interfaces
//! available to kernel modules and the host side of their lifecycle.
//!
//! A kernel module links against this crate and declares itself with [`module!`], marking its
//! activation and deactivation routines with [`module_init`] and [`module_exit`]. The host loads
//! it with [`syscall::module::init_module`] and unloads it with
//! [`syscall::module::delete_module`].
//!
//! # Configuration
//!
//! The kernel is configured at compile time through `default.build-config.toml`, which can be
//! overridden by a `build-config.toml` file in the crate's directory.

#![warn(missing_docs)]
#![allow(clippy::tabs_in_doc_comments)]

#[macro_use]
pub mod config;
pub mod logger;
pub mod module;
pub mod perm;
#[macro_use]
pub mod print;
pub mod syscall;

pub use macros::{module_exit, module_init};
pub use utils;

/// The kernel's name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Current kernel version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
