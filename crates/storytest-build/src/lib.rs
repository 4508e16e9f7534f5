//! # storytest-build
//!
//! The build service boundary used by storytest synthesis, plus an
//! implementation on the OXC toolchain.
//!
//! - [`ModuleReference`] identifies a story module by real path, virtual path
//!   and public URL.
//! - [`BuildService`] reports exports, compiles a module to CommonJS and
//!   normalizes finished source units.
//! - [`OxcBuildService`] implements it over a platform [`Runtime`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storytest_build::{BuildService, NativeRuntime, OxcBuildService};
//!
//! let service = OxcBuildService::new(Arc::new(NativeRuntime));
//! let exports = service.analyze_exports(Path::new("Button.stories.jsx")).await?;
//! ```

pub mod dialect;
pub mod error;
pub mod export;
pub mod module_ref;
pub mod oxc;
pub mod runtime;
pub mod service;

pub use dialect::SourceDialect;
pub use error::{BuildError, Result};
pub use export::ExportName;
pub use module_ref::{ModuleReference, default_binding_name, is_identifier};
pub use oxc::OxcBuildService;
pub use runtime::memory::MemoryRuntime;
#[cfg(not(target_family = "wasm"))]
pub use runtime::native::NativeRuntime;
pub use runtime::{Runtime, RuntimeError, RuntimeResult};
pub use service::{
    BuildService, CompileOptions, CompiledModule, DefaultExportShape, HookSet, NormalizedSource,
};
