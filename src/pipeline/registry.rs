//! Lookup of stages by name

use crate::pipeline::builtin::{RawStage, TrimStage};
use crate::pipeline::stage::Stage;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Stages available to descriptors, keyed by name
#[derive(Clone, Default)]
pub struct StageRegistry {
    stages: HashMap<String, Arc<dyn Stage>>,
}

impl StageRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `raw` and `trim` stages
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register(Arc::new(RawStage))
            .register(Arc::new(TrimStage));
        registry
    }

    /// Add a stage, replacing any stage of the same name
    pub fn register(&mut self, stage: Arc<dyn Stage>) -> &mut Self {
        let name = stage.name().to_string();
        if self.stages.insert(name.clone(), stage).is_some() {
            log::debug!("stage '{}' replaced", name);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Stage>> {
        self.stages.get(name).cloned()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.stages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageRegistry")
            .field("stages", &self.names())
            .finish()
    }
}
