//! Scheduler configuration.

use serde::{Deserialize, Serialize};

/// Default capacity of the handoff queue between callers and a scheduler.
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Default prefix for scheduler thread names.
pub const DEFAULT_THREAD_NAME: &str = "statelane";

/// Settings shared by both schedulers.
///
/// Missing fields take their defaults when deserialized, so the struct can
/// be embedded in an application's own config file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Capacity of the bounded handoff queue; 0 makes every hand-off a rendezvous.
    pub queue_capacity: usize,
    /// Prefix for the names of the threads a scheduler spawns.
    pub thread_name: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn builder() -> SchedulerConfigBuilder {
        SchedulerConfigBuilder::new()
    }

    pub(crate) fn worker_thread_name(&self) -> String {
        format!("{}-worker", self.thread_name)
    }

    pub(crate) fn dispatcher_thread_name(&self) -> String {
        format!("{}-dispatcher", self.thread_name)
    }
}

/// Builder for [`SchedulerConfig`].
pub struct SchedulerConfigBuilder {
    config: SchedulerConfig,
}

impl SchedulerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
        }
    }

    /// Set the handoff queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Set the thread name prefix
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.thread_name = name.into();
        self
    }

    pub fn build(self) -> SchedulerConfig {
        self.config
    }
}

impl Default for SchedulerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.thread_name, "statelane");
        assert_eq!(config.worker_thread_name(), "statelane-worker");
        assert_eq!(config.dispatcher_thread_name(), "statelane-dispatcher");
    }

    #[test]
    fn builder_overrides_fields() {
        let config = SchedulerConfig::builder()
            .queue_capacity(0)
            .thread_name("door")
            .build();

        assert_eq!(config.queue_capacity, 0);
        assert_eq!(config.worker_thread_name(), "door-worker");
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let config: SchedulerConfig = serde_json::from_str(r#"{"queue_capacity": 4}"#).unwrap();
        assert_eq!(config.queue_capacity, 4);
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);

        let config: SchedulerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SchedulerConfig::default());
    }
}
