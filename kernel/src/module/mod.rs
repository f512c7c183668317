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

//! A kernel module is a piece of software loaded at runtime in kernelspace in order to handle a
//! specific feature such as device drivers.
//!
//! Some advantages of that system is a lighter kernel with clearer code, and it allows to only
//! load subsystems that are currently required.
//!
//! There's a distinction between a **Module** and a **Kernel Module**:
//! - **Module**: A *Rust* module, part of the structure of the code.
//! - **Kernel Module**: A piece of software to be loaded at runtime in kernelspace.
//!
//! Thus, **Kernel Modules** contain **Modules**.
//!
//! # Lifecycle
//!
//! A kernel module is either *unloaded* or *loaded*. Loading calls the module's `init` function
//! exactly once, and unloading calls its `fini` function exactly once. The kernel refuses to load
//! a module that is already loaded and to unload a module that is not.

pub mod license;
pub mod version;

use crate::{config, pr_err, pr_warn, println};
use core::{cmp::Ordering, ffi::c_int};
use license::{TAINT_FORCED_RMMOD, TAINT_PROPRIETARY_MODULE};
use std::collections::BTreeMap;
use utils::{
	errno,
	errno::{EResult, Errno},
	lock::Mutex,
};
use version::{Dependency, Version};

pub use license::tainted;

/// The magic number that must be present inside a module.
pub const MOD_MAGIC: u64 = 0x9792df56efb7c93f;

/// Macro used to declare a kernel module.
///
/// This macro must be used only inside a kernel module, at the root of the crate. The module's
/// name and version are taken from its `Cargo.toml`.
///
/// Arguments:
/// - the list of dependencies ([`Dependency`]) of the module
/// - optionally, the module's license. If not specified, the `license` field of the module's
///   `Cargo.toml` is used
///
/// The crate must define its `init` and `fini` functions with the [`crate::module_init`] and
/// [`crate::module_exit`] attributes. The declaration is exported as `MOD_IMAGE`.
///
/// Example:
/// ```ignore
/// kernel::module!(
/// 	[Dependency {
/// 		name: "plop",
/// 		version: Version::new(1, 0, 0),
/// 		constraint: core::cmp::Ordering::Equal,
/// 	}],
/// 	"GPL"
/// );
/// ```
#[macro_export]
macro_rules! module {
	($deps:expr) => {
		$crate::module!($deps, env!("CARGO_PKG_LICENSE"));
	};
	($deps:expr, $license:expr) => {
		mod module_meta {
			use $crate::module::{
				Image,
				version::{Dependency, Version},
			};

			const fn get_version() -> Version {
				let result = Version::parse(env!("CARGO_PKG_VERSION"));
				let Some(version) = result else {
					panic!("invalid module version (see kernel's documentation for versioning specifications)");
				};
				version
			}

			const fn const_len<const C: usize>(_: &[Dependency; C]) -> usize {
				C
			}

			static MOD_DEPS: [Dependency; const_len(&$deps)] = $deps;

			#[unsafe(no_mangle)]
			pub static MOD_IMAGE: Image = Image {
				magic: $crate::module::MOD_MAGIC,
				name: env!("CARGO_PKG_NAME"),
				version: get_version(),
				license: $license,
				deps: &MOD_DEPS,
				init: super::init,
				fini: Some(super::fini),
			};
		}

		pub use module_meta::MOD_IMAGE;
	};
}

/// The declaration of a kernel module, exported by the module for the kernel to load it.
#[derive(Debug)]
pub struct Image {
	/// Must be [`MOD_MAGIC`].
	pub magic: u64,
	/// The module's name.
	pub name: &'static str,
	/// The module's version.
	pub version: Version,
	/// The module's license, checked against the kernel's license policy.
	pub license: &'static str,
	/// The modules that must be loaded before this one.
	pub deps: &'static [Dependency],

	/// Called on module load. A return value other than `0` aborts the loading.
	pub init: extern "C" fn() -> c_int,
	/// Called on module unload.
	pub fini: Option<extern "C" fn()>,
}

impl Image {
	/// Checks the declaration is well-formed.
	pub fn check(&self) -> EResult<()> {
		if self.magic != MOD_MAGIC {
			println!("Module has an invalid magic number");
			return Err(errno!(EINVAL));
		}
		if self.name.is_empty() {
			println!("Module has an empty name");
			return Err(errno!(EINVAL));
		}
		Ok(())
	}
}

/// Turns the non-zero return value of a module's `init` function into an error.
///
/// Following the kernel's convention, a negative value is an error number. Other values are
/// reported as [`errno::EINVAL`].
fn init_error(ret: c_int) -> Errno {
	match ret.checked_neg() {
		Some(errno) if errno > 0 => Errno::new(errno),
		_ => errno!(EINVAL),
	}
}

/// Returns the comparison operator expressing the given constraint.
fn constraint_str(constraint: Ordering) -> &'static str {
	match constraint {
		Ordering::Less => "<",
		Ordering::Equal => "=",
		Ordering::Greater => ">",
	}
}

/// A loaded kernel module.
pub struct Module {
	/// The module's name.
	name: String,
	/// The module's version.
	version: Version,
	/// The module's license.
	license: &'static str,

	/// The list of dependencies associated with the module.
	deps: Vec<Dependency>,

	/// Pointer to the module's destructor.
	fini: Option<extern "C" fn()>,
}

impl Module {
	/// Loads a kernel module from the given image, calling its `init` function.
	///
	/// If `init` fails, the module's `fini` function is not called.
	pub fn load(image: &Image) -> EResult<Self> {
		image.check()?;
		println!(
			"Load module `{}` version `{}`",
			image.name, image.version
		);
		let ret = (image.init)();
		if ret != 0 {
			pr_err!("Failed to load module `{}` (init returned {ret})", image.name);
			return Err(init_error(ret));
		}
		Ok(Self {
			name: image.name.to_owned(),
			version: image.version,
			license: image.license,

			deps: image.deps.to_vec(),

			fini: image.fini,
		})
	}

	/// Returns the name of the module.
	pub fn get_name(&self) -> &str {
		&self.name
	}

	/// Returns the [`Version`] of the module.
	pub fn get_version(&self) -> &Version {
		&self.version
	}

	/// Returns the license of the module.
	pub fn get_license(&self) -> &str {
		self.license
	}

	/// Returns the dependencies of the module.
	pub fn get_deps(&self) -> &[Dependency] {
		&self.deps
	}

	/// Tells whether the module requires the module with the given name.
	pub fn depends_on(&self, name: &str) -> bool {
		self.deps.iter().any(|dep| dep.name == name)
	}
}

impl Drop for Module {
	fn drop(&mut self) {
		if let Some(fini) = self.fini {
			fini();
		}
		println!("Unloaded module `{}`", self.name);
	}
}

/// The set of loaded modules, by name.
#[derive(Default)]
pub struct Registry {
	modules: BTreeMap<String, Module>,
}

impl Registry {
	/// Creates an empty registry.
	pub const fn new() -> Self {
		Self {
			modules: BTreeMap::new(),
		}
	}

	/// Loads the module declared by `image` and adds it to the registry.
	///
	/// Errors:
	/// - [`errno::EINVAL`]: the image is malformed, or its `init` function failed without
	///   reporting an error number
	/// - [`errno::EEXIST`]: a module with the same name is already loaded. The module's `init`
	///   function is not called again
	/// - [`errno::ENOENT`]: a dependency is not loaded, or the loaded version does not satisfy it
	/// - [`errno::EPERM`]: the license is not GPL-compatible and the kernel is configured to
	///   refuse such modules
	///
	/// Any error number returned by the module's `init` function is forwarded.
	pub fn load(&mut self, image: &Image) -> EResult<()> {
		image.check()?;
		if self.modules.contains_key(image.name) {
			println!("Module `{}` is already loaded", image.name);
			return Err(errno!(EEXIST));
		}
		self.check_deps(image)?;
		check_license(image, config::STRICT_LICENSE)?;
		let module = Module::load(image)?;
		self.modules.insert(module.name.clone(), module);
		Ok(())
	}

	/// Checks the dependencies of `image` are loaded with a satisfying version.
	fn check_deps(&self, image: &Image) -> EResult<()> {
		for dep in image.deps {
			let Some(module) = self.modules.get(dep.name) else {
				println!(
					"Module `{}` requires `{}`, which is not loaded",
					image.name, dep.name
				);
				return Err(errno!(ENOENT));
			};
			if !dep.is_satisfied_by(&module.version) {
				println!(
					"Module `{}` requires `{}` version {} {}, but version `{}` is loaded",
					image.name,
					dep.name,
					constraint_str(dep.constraint),
					dep.version,
					module.version
				);
				return Err(errno!(ENOENT));
			}
		}
		Ok(())
	}

	/// Removes the module with name `name`, calling its `fini` function.
	///
	/// If another loaded module depends on it, the function returns [`errno::EBUSY`], unless
	/// `force` is set, in which case the kernel is tainted.
	///
	/// If no module with this name is loaded, the function returns [`errno::ENOENT`].
	pub fn remove(&mut self, name: &str, force: bool) -> EResult<()> {
		if !self.modules.contains_key(name) {
			return Err(errno!(ENOENT));
		}
		let user = self
			.modules
			.values()
			.find(|m| m.depends_on(name))
			.map(|m| m.name.clone());
		if let Some(user) = user {
			if !force {
				println!("Module `{name}` is in use by `{user}`");
				return Err(errno!(EBUSY));
			}
			pr_warn!("Forcing removal of module `{name}`, in use by `{user}`");
			license::add_taint(TAINT_FORCED_RMMOD);
		}
		self.modules.remove(name);
		Ok(())
	}

	/// Tells whether a module with the given name is loaded.
	pub fn is_loaded(&self, name: &str) -> bool {
		self.modules.contains_key(name)
	}

	/// Returns the loaded module with the given name.
	pub fn get(&self, name: &str) -> Option<&Module> {
		self.modules.get(name)
	}

	/// Returns an iterator over loaded modules, sorted by name.
	pub fn iter(&self) -> impl Iterator<Item = &Module> {
		self.modules.values()
	}

	/// Returns the number of loaded modules.
	pub fn len(&self) -> usize {
		self.modules.len()
	}

	/// Tells whether no module is loaded.
	pub fn is_empty(&self) -> bool {
		self.modules.is_empty()
	}
}

/// Applies the kernel's license policy to `image`.
///
/// If `strict` is set, a module whose license is not GPL-compatible is refused. Otherwise, it
/// taints the kernel.
fn check_license(image: &Image, strict: bool) -> EResult<()> {
	if license::is_gpl_compatible(image.license) {
		return Ok(());
	}
	if strict {
		pr_err!(
			"{}: module license '{}' is not GPL-compatible, refusing to load",
			image.name,
			image.license
		);
		return Err(errno!(EPERM));
	}
	pr_warn!(
		"{}: module license '{}' taints kernel.",
		image.name,
		image.license
	);
	license::add_taint(TAINT_PROPRIETARY_MODULE);
	Ok(())
}

/// The list of loaded modules.
///
/// The lock is held while a module's `init` or `fini` function runs, which serializes them.
/// Those functions must not call into the module subsystem.
pub static MODULES: Mutex<Registry> = Mutex::new(Registry::new());

/// Loads the module declared by `image`.
///
/// See [`Registry::load`].
pub fn load(image: &Image) -> EResult<()> {
	MODULES.lock().load(image)
}

/// Removes the module with name `name`.
///
/// See [`Registry::remove`].
pub fn remove(name: &str, force: bool) -> EResult<()> {
	MODULES.lock().remove(name, force)
}

/// Tells whether a module with the given name is loaded.
pub fn is_loaded(name: &str) -> bool {
	MODULES.lock().is_loaded(name)
}

/// Returns the name and version of each loaded module, sorted by name.
pub fn list() -> Vec<(String, Version)> {
	MODULES
		.lock()
		.iter()
		.map(|m| (m.name.clone(), m.version))
		.collect()
}

#[cfg(test)]
mod test {
	use super::*;
	use core::sync::atomic::{AtomicUsize, Ordering::SeqCst};

	/// Declares `init` and `fini` functions counting their calls.
	macro_rules! counted {
		($init:ident, $fini:ident, $ret:expr) => {
			static INITS: AtomicUsize = AtomicUsize::new(0);
			static FINIS: AtomicUsize = AtomicUsize::new(0);

			extern "C" fn $init() -> c_int {
				INITS.fetch_add(1, SeqCst);
				$ret
			}

			extern "C" fn $fini() {
				FINIS.fetch_add(1, SeqCst);
			}
		};
	}

	fn image(
		name: &'static str,
		init: extern "C" fn() -> c_int,
		fini: extern "C" fn(),
		deps: &'static [Dependency],
	) -> Image {
		Image {
			magic: MOD_MAGIC,
			name,
			version: Version::new(1, 0, 0),
			license: "GPL",
			deps,

			init,
			fini: Some(fini),
		}
	}

	#[test]
	fn load_remove() {
		counted!(init, fini, 0);
		let mut reg = Registry::new();
		assert_eq!(reg.load(&image("lifecycle", init, fini, &[])), Ok(()));
		assert_eq!(INITS.load(SeqCst), 1);
		assert_eq!(FINIS.load(SeqCst), 0);
		assert!(reg.is_loaded("lifecycle"));
		assert_eq!(reg.len(), 1);
		assert_eq!(reg.remove("lifecycle", false), Ok(()));
		assert_eq!(INITS.load(SeqCst), 1);
		assert_eq!(FINIS.load(SeqCst), 1);
		assert!(!reg.is_loaded("lifecycle"));
		assert!(reg.is_empty());
	}

	#[test]
	fn double_load_and_remove() {
		counted!(init, fini, 0);
		let mut reg = Registry::new();
		let img = image("twice", init, fini, &[]);
		assert_eq!(reg.load(&img), Ok(()));
		assert_eq!(reg.load(&img), Err(errno!(EEXIST)));
		assert_eq!(INITS.load(SeqCst), 1);
		assert_eq!(reg.remove("twice", false), Ok(()));
		assert_eq!(reg.remove("twice", false), Err(errno!(ENOENT)));
		assert_eq!(FINIS.load(SeqCst), 1);
		// The module can be loaded again once unloaded
		assert_eq!(reg.load(&img), Ok(()));
		assert_eq!(INITS.load(SeqCst), 2);
	}

	#[test]
	fn remove_unknown() {
		let mut reg = Registry::new();
		assert_eq!(reg.remove("nothing", false), Err(errno!(ENOENT)));
		assert_eq!(reg.remove("nothing", true), Err(errno!(ENOENT)));
	}

	#[test]
	fn init_failure_errno() {
		counted!(init, fini, -errno::ENOMEM);
		let mut reg = Registry::new();
		assert_eq!(
			reg.load(&image("nomem", init, fini, &[])),
			Err(errno!(ENOMEM))
		);
		assert_eq!(INITS.load(SeqCst), 1);
		assert!(!reg.is_loaded("nomem"));
		assert_eq!(FINIS.load(SeqCst), 0);
	}

	#[test]
	fn init_failure_other() {
		assert_eq!(init_error(1), errno!(EINVAL));
		assert_eq!(init_error(c_int::MIN), errno!(EINVAL));
		assert_eq!(init_error(-errno::EBUSY), errno!(EBUSY));
	}

	#[test]
	fn malformed_image() {
		counted!(init, fini, 0);
		let mut reg = Registry::new();
		let mut img = image("magic", init, fini, &[]);
		img.magic = 0;
		assert_eq!(reg.load(&img), Err(errno!(EINVAL)));
		let img = image("", init, fini, &[]);
		assert_eq!(reg.load(&img), Err(errno!(EINVAL)));
		assert_eq!(INITS.load(SeqCst), 0);
		assert!(reg.is_empty());
	}

	#[test]
	fn dependencies() {
		static USER_DEPS: [Dependency; 1] = [Dependency {
			name: "base",
			version: Version::new(1, 0, 0),
			constraint: Ordering::Equal,
		}];
		mod base {
			use super::*;
			counted!(init, fini, 0);
			pub fn counts() -> (usize, usize) {
				(INITS.load(SeqCst), FINIS.load(SeqCst))
			}
			pub fn image() -> Image {
				super::image("base", init, fini, &[])
			}
		}
		counted!(init, fini, 0);
		let mut reg = Registry::new();
		let user = image("user", init, fini, &USER_DEPS);
		assert_eq!(reg.load(&user), Err(errno!(ENOENT)));
		assert_eq!(INITS.load(SeqCst), 0);
		assert_eq!(reg.load(&base::image()), Ok(()));
		assert_eq!(reg.load(&user), Ok(()));
		assert!(reg.get("user").unwrap().depends_on("base"));
		// `base` is in use
		assert_eq!(reg.remove("base", false), Err(errno!(EBUSY)));
		assert!(reg.is_loaded("base"));
		assert_eq!(base::counts(), (1, 0));
		assert_eq!(reg.remove("user", false), Ok(()));
		assert_eq!(reg.remove("base", false), Ok(()));
		assert_eq!(base::counts(), (1, 1));
	}

	#[test]
	fn forced_removal() {
		static USER_DEPS: [Dependency; 1] = [Dependency {
			name: "forced_base",
			version: Version::new(1, 0, 0),
			constraint: Ordering::Equal,
		}];
		mod base {
			use super::*;
			counted!(init, fini, 0);
			pub fn finis() -> usize {
				FINIS.load(SeqCst)
			}
			pub fn image() -> Image {
				super::image("forced_base", init, fini, &[])
			}
		}
		counted!(init, fini, 0);
		let mut reg = Registry::new();
		assert_eq!(reg.load(&base::image()), Ok(()));
		assert_eq!(reg.load(&image("forced_user", init, fini, &USER_DEPS)), Ok(()));
		assert_eq!(reg.remove("forced_base", true), Ok(()));
		assert_eq!(base::finis(), 1);
		assert!(!reg.is_loaded("forced_base"));
		assert!(reg.is_loaded("forced_user"));
		assert_ne!(tainted() & TAINT_FORCED_RMMOD, 0);
	}

	#[test]
	fn dependency_version_mismatch() {
		static USER_DEPS: [Dependency; 1] = [Dependency {
			name: "old",
			version: Version::new(1, 0, 0),
			constraint: Ordering::Greater,
		}];
		mod old {
			use super::*;
			counted!(init, fini, 0);
			pub fn image() -> Image {
				super::image("old", init, fini, &[])
			}
		}
		counted!(init, fini, 0);
		let mut reg = Registry::new();
		assert_eq!(reg.load(&old::image()), Ok(()));
		assert_eq!(
			reg.load(&image("new", init, fini, &USER_DEPS)),
			Err(errno!(ENOENT))
		);
		assert_eq!(INITS.load(SeqCst), 0);
	}

	#[test]
	fn proprietary_license() {
		counted!(init, fini, 0);
		let mut reg = Registry::new();
		let mut img = image("proprietary", init, fini, &[]);
		img.license = "Proprietary";
		#[cfg(not(config_module_strict_license))]
		{
			assert_eq!(reg.load(&img), Ok(()));
			assert_eq!(INITS.load(SeqCst), 1);
			assert_ne!(tainted() & TAINT_PROPRIETARY_MODULE, 0);
			assert_eq!(reg.get("proprietary").unwrap().get_license(), "Proprietary");
		}
		#[cfg(config_module_strict_license)]
		{
			assert_eq!(reg.load(&img), Err(errno!(EPERM)));
			assert_eq!(INITS.load(SeqCst), 0);
		}
	}

	#[test]
	fn license_policy() {
		counted!(init, fini, 0);
		let gpl = image("free", init, fini, &[]);
		assert_eq!(check_license(&gpl, true), Ok(()));
		assert_eq!(check_license(&gpl, false), Ok(()));
		let mut proprietary = image("closed", init, fini, &[]);
		proprietary.license = "Proprietary";
		assert_eq!(check_license(&proprietary, true), Err(errno!(EPERM)));
		assert_eq!(check_license(&proprietary, false), Ok(()));
		assert_ne!(tainted() & TAINT_PROPRIETARY_MODULE, 0);
		assert_eq!(INITS.load(SeqCst), 0);
	}

	#[test]
	fn iter_sorted() {
		counted!(init, fini, 0);
		let mut reg = Registry::new();
		for name in ["c", "a", "b"] {
			assert_eq!(reg.load(&image(name, init, fini, &[])), Ok(()));
		}
		let names: Vec<_> = reg.iter().map(Module::get_name).collect();
		assert_eq!(names, ["a", "b", "c"]);
		assert_eq!(reg.get("a").unwrap().get_version(), &Version::new(1, 0, 0));
		drop(reg);
		// Dropping the registry unloads every module
		assert_eq!(FINIS.load(SeqCst), 3);
	}
}
