//! # storytest-runner
//!
//! Runs synthesized story modules in an isolated sandbox.
//!
//! The program text is wrapped in a CommonJS function, every literal
//! `require(...)` is resolved up front against the *real* module's location,
//! and a [`ScriptHost`] evaluates the wrapper in a fresh context. The sandbox
//! sees `__filename` and `__dirname` of the real module, so relative imports
//! behave as they would in the original file.
//!
//! ```rust,ignore
//! let runner = IsolatedRunner::new(Arc::new(NodeScriptHost::default()), cwd.join("node_modules"));
//! let result = runner.run(&module, &code).await?;
//! ```

pub mod error;
pub mod host;
pub mod node;
pub mod requires;
pub mod resolver;
pub mod runner;
pub mod wrap;

pub use error::{Result, RunnerError};
pub use host::{ExecutionResult, SandboxScript, ScriptHost};
pub use node::NodeScriptHost;
pub use requires::collect_require_specifiers;
pub use resolver::{DependencyResolver, Resolution, is_node_builtin};
pub use runner::IsolatedRunner;
pub use wrap::wrap_module_source;
