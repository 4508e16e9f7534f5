//! # storytest-gen
//!
//! Synthesizes browser-test suites from story modules.
//!
//! The pipeline runs strictly in sequence:
//!
//! 1. ask the [`BuildService`](storytest_build::BuildService) for the export catalog
//! 2. resolve the test plan (export selection and auxiliary data)
//! 3. render one test item per planned export
//! 4. wrap the items in a suite with defensively wired lifecycle hooks
//! 5. append the suite to the compiled module and normalize the result
//!
//! ```rust,ignore
//! let synthesizer = Synthesizer::new(build, Arc::new(TemplateRenderer::new()?), options);
//! let descriptor = TestDescriptor::new()
//!     .with_create_test(TestBody::inline("({ publicUrl }) => (browser) => browser.url(publicUrl)")?);
//! let code = synthesizer
//!     .synthesize(Path::new("src/Button.stories.jsx"), &descriptor, &ExecContext::from_env())
//!     .await?;
//! ```

pub mod descriptor;
pub mod error;
pub mod function;
pub mod item;
pub mod plan;
pub mod recombine;
pub mod render;
pub mod suite;
pub mod synthesize;

pub use descriptor::{
    ActivationContext, ActivationPredicate, AuxDataSource, CodeTransform, DataMap, ExecContext,
    ExportFilter, TestBody, TestDescriptor, TestName,
};
pub use error::{GenError, Result};
pub use function::{InlineFunction, SuspensionStyle};
pub use item::CodeFragment;
pub use plan::{TestPlanEntry, default_selection};
pub use render::{Render, Template, TemplateRenderer};
pub use synthesize::{DEFAULT_HOOK_NAMESPACES, SynthesisOptions, Synthesizer};
