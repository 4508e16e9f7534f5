//! CommonJS output through rolldown
//!
//! The story module is the only module in the build. Every import it makes is
//! left external, so the output `require`s the same specifiers the source
//! imports and the sandbox resolves them against the real module directory.

use rolldown::{BundlerBuilder, BundlerOptions, InputItem, OutputFormat, Platform};
use rolldown_common::{ModuleType, Output, OutputExports, ResolvedExternal};
use rolldown_plugin::{
    __inner::SharedPluginable, HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs,
    HookResolveIdOutput, HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use crate::error::{BuildError, Result};

/// Serves the prepared story source and externalizes everything it imports
#[derive(Debug)]
struct StorySourcePlugin {
    entry: String,
    code: String,
}

impl Plugin for StorySourcePlugin {
    fn name(&self) -> Cow<'static, str> {
        "storytest-story-source".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId | HookUsage::Load
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs<'_>,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let external = args.specifier != self.entry.as_str();
        let id = args.specifier.to_string();

        async move {
            Ok(Some(HookResolveIdOutput {
                id: id.into(),
                external: Some(ResolvedExternal::Bool(external)),
                ..Default::default()
            }))
        }
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let output = (args.id == self.entry.as_str()).then(|| HookLoadOutput {
            code: self.code.clone().into(),
            module_type: Some(ModuleType::Js),
            ..Default::default()
        });

        async move { Ok(output) }
    }
}

/// Build `esm`, the plain-JavaScript text of the module at `path`, into CommonJS.
///
/// Exports are always assigned by name (`exports.default`, `exports.Primary`),
/// never by replacing `module.exports`.
pub async fn bundle_commonjs(path: &Path, esm: String) -> Result<String> {
    let entry = path.to_string_lossy().into_owned();

    let options = BundlerOptions {
        input: Some(vec![InputItem {
            name: Some("story".to_string()),
            import: entry.clone(),
        }]),
        cwd: path.parent().map(Path::to_path_buf),
        format: Some(OutputFormat::Cjs),
        exports: Some(OutputExports::Named),
        platform: Some(Platform::Node),
        ..Default::default()
    };
    let plugins: Vec<SharedPluginable> = vec![Arc::new(StorySourcePlugin { entry, code: esm })];

    let mut bundler = BundlerBuilder::default()
        .with_options(options)
        .with_plugins(plugins)
        .build()
        .map_err(|err| BuildError::bundle(path, &err))?;
    let output = bundler
        .generate()
        .await
        .map_err(|err| BuildError::bundle(path, &err))?;

    output
        .assets
        .iter()
        .find_map(|asset| match asset {
            Output::Chunk(chunk) if chunk.is_entry => Some(chunk.code.clone()),
            _ => None,
        })
        .ok_or_else(|| BuildError::Bundle {
            path: path.to_path_buf(),
            message: "no entry chunk was produced".to_string(),
        })
}
