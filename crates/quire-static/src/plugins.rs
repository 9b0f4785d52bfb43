//! Build plugins and lifecycle hooks.

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;

use quire_content::ContentEntry;

use crate::context::BuildContext;

/// Points in the build where plugins run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Output directory was cleaned and recreated
    DistClean,
    /// Static assets were copied
    AssetsCopy,
    /// Content files were loaded
    ContentLoad,
    /// Collections, menus and indexes are final
    ContentReady,
}

impl Hook {
    pub const ALL: [Hook; 4] = [
        Hook::DistClean,
        Hook::AssetsCopy,
        Hook::ContentLoad,
        Hook::ContentReady,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Hook::DistClean => "dist:clean",
            Hook::AssetsCopy => "assets:copy",
            Hook::ContentLoad => "content:load",
            Hook::ContentReady => "content:ready",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors a plugin may return from a hook.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("{0}")]
    Failed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a plugin can see when a hook runs.
#[derive(Clone, Copy)]
pub struct PluginContext<'a> {
    pub hook: Hook,
    pub root_dir: &'a Path,
    pub src_dir: &'a Path,
    pub output_dir: &'a Path,

    /// Loaded content, from `content:load` on
    pub entries: Option<&'a [ContentEntry]>,

    /// Finalized indexes, at `content:ready`
    pub build: Option<&'a BuildContext>,
}

impl<'a> PluginContext<'a> {
    pub fn new(hook: Hook, root_dir: &'a Path, src_dir: &'a Path, output_dir: &'a Path) -> Self {
        Self {
            hook,
            root_dir,
            src_dir,
            output_dir,
            entries: None,
            build: None,
        }
    }

    pub fn with_entries(mut self, entries: &'a [ContentEntry]) -> Self {
        self.entries = Some(entries);
        self
    }

    pub fn with_build(mut self, build: &'a BuildContext) -> Self {
        self.build = Some(build);
        self
    }
}

/// A build plugin.
pub trait Plugin: Send + Sync {
    /// Unique plugin name
    fn name(&self) -> &str;

    /// Hooks this plugin handles. A plugin with no hooks is skipped.
    fn hooks(&self) -> &[Hook];

    fn run(&self, hook: Hook, ctx: &PluginContext<'_>) -> Result<(), PluginError>;
}

/// Registered plugins in registration order.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: IndexMap<String, Box<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin. Blank and duplicate names are rejected with a warning.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> bool {
        let name = plugin.name().trim().to_string();
        if name.is_empty() {
            tracing::warn!("Plugin cannot load correctly: missing name");
            return false;
        }
        if self.plugins.contains_key(&name) {
            tracing::warn!("Duplicate plugin name detected: {}", name);
            return false;
        }

        tracing::debug!("The plugin '{}' has been loaded", name);
        self.plugins.insert(name, plugin);
        true
    }

    pub fn count(&self) -> usize {
        self.plugins.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Plugin)> {
        self.plugins.iter().map(|(name, plugin)| (name.as_str(), plugin.as_ref()))
    }
}

/// Runs hooks across every registered plugin.
#[derive(Default)]
pub struct PluginEngine {
    registry: PluginRegistry,
}

impl PluginEngine {
    pub fn new(registry: PluginRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Run `ctx.hook` on every plugin that handles it, in registration order.
    ///
    /// A failing plugin is logged and the remaining plugins still run. Returns the number
    /// of failures.
    pub fn execute(&self, ctx: &PluginContext<'_>) -> usize {
        let hook = ctx.hook;
        let mut failures = 0;

        for (name, plugin) in self.registry.iter() {
            let hooks = plugin.hooks();
            if hooks.is_empty() {
                tracing::warn!("The '{}' plugin is invalid: it has no hooks", name);
                continue;
            }
            if !hooks.contains(&hook) {
                continue;
            }

            tracing::debug!("The '{}' plugin has been triggered with '{}' hook", name, hook);
            if let Err(e) = plugin.run(hook, ctx) {
                tracing::error!("The '{}' plugin failed on '{}' hook: {}", name, hook, e);
                failures += 1;
            }
        }

        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        hooks: Vec<Hook>,
        fail: bool,
        log: Log,
    }

    fn recorder(name: &'static str, hooks: Vec<Hook>, fail: bool, log: &Log) -> Box<dyn Plugin> {
        Box::new(Recorder {
            name,
            hooks,
            fail,
            log: Arc::clone(log),
        })
    }

    impl Plugin for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn hooks(&self) -> &[Hook] {
            &self.hooks
        }

        fn run(&self, hook: Hook, ctx: &PluginContext<'_>) -> Result<(), PluginError> {
            let has_build = ctx.build.is_some();
            self.log
                .lock()
                .unwrap()
                .push(format!("{}@{}:{}", self.name, hook, has_build));
            if self.fail {
                return Err(PluginError::Failed("boom".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn hook_names() {
        let names: Vec<_> = Hook::ALL.iter().map(Hook::as_str).collect();
        assert_eq!(names, vec!["dist:clean", "assets:copy", "content:load", "content:ready"]);
    }

    #[test]
    fn rejects_blank_and_duplicate_names() {
        let log = Log::default();
        let mut registry = PluginRegistry::new();

        assert!(registry.register(recorder("seo", vec![Hook::DistClean], false, &log)));
        assert!(!registry.register(recorder("seo", vec![Hook::DistClean], false, &log)));
        assert!(!registry.register(recorder("  ", vec![Hook::DistClean], false, &log)));

        assert_eq!(registry.count(), 1);
        assert_eq!(registry.names(), vec!["seo"]);
    }

    #[test]
    fn failures_are_isolated() {
        let log = Log::default();
        let mut registry = PluginRegistry::new();
        registry.register(recorder("first", vec![Hook::ContentReady], true, &log));
        registry.register(recorder("second", vec![Hook::ContentReady], false, &log));
        registry.register(recorder("other", vec![Hook::DistClean], false, &log));
        registry.register(recorder("empty", vec![], false, &log));
        let engine = PluginEngine::new(registry);

        let build = BuildContext::default();
        let root = Path::new(".");
        let ctx = PluginContext::new(Hook::ContentReady, root, root, root).with_build(&build);

        assert_eq!(engine.execute(&ctx), 1);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["first@content:ready:true", "second@content:ready:true"]
        );
    }
}
