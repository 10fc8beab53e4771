//! Query runner registration.
//!
//! The host looks runners up by type. Only enabled runners are registered;
//! disabled ones are remembered with their reason so the host can list them.

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::runner::{QueryRunner, RunnerDescriptor};

/// Registry of query runners keyed by type.
#[derive(Default)]
pub struct Registry {
    runners: IndexMap<&'static str, Box<dyn QueryRunner>>,
    disabled: Vec<(RunnerDescriptor, String)>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a runner.
    ///
    /// Returns false, and keeps the runner out of the registry, if it is
    /// disabled. A runner of an already registered type replaces it.
    pub fn register(&mut self, runner: Box<dyn QueryRunner>) -> bool {
        let descriptor = runner.descriptor();

        if !descriptor.enabled {
            let reason = runner
                .disabled_reason()
                .unwrap_or_else(|| "not available".to_string());
            warn!(
                "Not registering {} ({}): {}",
                descriptor.name, descriptor.runner_type, reason
            );
            self.disabled
                .retain(|(d, _)| d.runner_type != descriptor.runner_type);
            self.disabled.push((descriptor, reason));
            return false;
        }

        if self.runners.contains_key(descriptor.runner_type) {
            debug!("Replacing registered runner {}", descriptor.runner_type);
        }
        info!(
            "Registering {} ({})",
            descriptor.name, descriptor.runner_type
        );
        self.disabled
            .retain(|(d, _)| d.runner_type != descriptor.runner_type);
        self.runners.insert(descriptor.runner_type, runner);
        true
    }

    /// Returns the registered runner of the given type.
    pub fn get(&self, runner_type: &str) -> Option<&dyn QueryRunner> {
        self.runners.get(runner_type).map(|runner| runner.as_ref())
    }

    /// Returns the types of all registered runners, in registration order.
    pub fn runner_types(&self) -> Vec<&'static str> {
        self.runners.keys().copied().collect()
    }

    /// Returns the identities of registered and disabled runners.
    pub fn descriptors(&self) -> Vec<RunnerDescriptor> {
        self.runners
            .values()
            .map(|runner| runner.descriptor())
            .chain(self.disabled.iter().map(|(d, _)| d.clone()))
            .collect()
    }

    /// Returns the disabled runner types and why they are disabled.
    pub fn disabled(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.disabled
            .iter()
            .map(|(d, reason)| (d.runner_type, reason.as_str()))
    }
}
