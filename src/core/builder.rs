use std::sync::Arc;

use crate::{
    core::SupervisorConfig,
    events::Bus,
    process::ProcessSpec,
    subscribers::{Subscribe, SubscriberSet},
};

use super::supervisor::Supervisor;

/// Assembles a [`Supervisor`] from a spec plus optional config and
/// subscribers.
///
/// Obtained through [`Supervisor::builder`].
pub struct SupervisorBuilder {
    spec: ProcessSpec,
    cfg: SupervisorConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    /// Starts a builder around the process to supervise, with default
    /// configuration and no subscribers.
    pub fn new(spec: ProcessSpec) -> Self {
        Self {
            spec,
            cfg: SupervisorConfig::default(),
            subscribers: Vec::new(),
        }
    }

    /// Replaces the runtime configuration.
    pub fn with_config(mut self, cfg: SupervisorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Installs event subscribers.
    ///
    /// Each one gets a bounded queue and its own worker task, so handlers
    /// never run on the monitor loop.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Consumes the builder and wires the runtime together.
    ///
    /// Subscriber workers are spawned here, so call this on a tokio runtime
    /// when subscribers were installed.
    pub fn build(self) -> Arc<Supervisor> {
        let bus = Bus::new(self.cfg.bus_capacity);
        let fanout = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));
        Arc::new(Supervisor::new_internal(self.spec, self.cfg, bus, fanout))
    }
}
