// Registry aggregates named liveness services into a single verdict.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::config::{Config, DEFAULT_DUMP_LIMIT};
use super::prober::Prober;
use super::service::Service;
use crate::stack::{self, Dumper, ProcessDumper};

/// Named set of liveness services. The process is alive only while every
/// registered service is.
///
/// A single mutex guards the set for the whole of every operation, stack
/// capture included, so the set being checked never changes mid-check.
pub struct Registry {
    // name -> service
    services: Mutex<HashMap<String, Arc<dyn Service>>>,
    dumper: Arc<dyn Dumper>,
    dump_limit: usize,
}

impl Registry {
    /// Creates an empty registry dumping up to 12 MiB of stacks on failure.
    pub fn new() -> Self {
        Self {
            services: Mutex::new(HashMap::new()),
            dumper: Arc::new(ProcessDumper),
            dump_limit: DEFAULT_DUMP_LIMIT,
        }
    }

    /// Creates an empty registry using the configured dump limit.
    pub fn with_config(cfg: &Config) -> Self {
        Self::new().with_dump_limit(cfg.dump_limit)
    }

    pub fn with_dump_limit(mut self, limit: usize) -> Self {
        self.dump_limit = limit;
        self
    }

    /// Replaces the stack source used when a service is not alive.
    pub fn with_dumper(mut self, dumper: Arc<dyn Dumper>) -> Self {
        self.dumper = dumper;
        self
    }

    /// Registers `service` under `name`. A service already registered under
    /// the same name is replaced.
    pub fn add(&self, name: impl Into<String>, service: Arc<dyn Service>) {
        let name = name.into();
        let mut services = self.services.lock();
        if services.insert(name.clone(), service).is_some() {
            debug!(
                component = "liveness",
                event = "service_replaced",
                service = %name,
                "liveness service re-registered"
            );
        } else {
            debug!(
                component = "liveness",
                event = "service_added",
                service = %name,
                "liveness service registered"
            );
        }
    }

    pub fn len(&self) -> usize {
        self.services.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.lock().is_empty()
    }

    /// Polls every registered service and stops at the first one that is not
    /// alive, logging its name followed by a stack dump of the whole process.
    /// An empty registry is alive.
    pub fn is_alive(&self) -> bool {
        let services = self.services.lock();

        for (name, service) in services.iter() {
            if service.is_alive() {
                continue;
            }

            warn!(
                component = "liveness",
                event = "service_not_alive",
                service = %name,
                "Controller [{}] didn't sync for a long time, declaring unhealthy and dumping stack",
                name
            );

            let mut dump = self.dumper.dump(self.dump_limit);
            let truncated = stack::truncate(&mut dump, self.dump_limit);
            warn!(
                component = "liveness",
                event = "stack_dump",
                service = %name,
                bytes = dump.len(),
                truncated = truncated,
                "{}",
                dump
            );

            return false;
        }

        true
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for Registry {
    fn is_alive(&self) -> bool {
        Registry::is_alive(self)
    }
}

impl Prober for Registry {
    fn add(&self, name: &str, service: Arc<dyn Service>) {
        Registry::add(self, name, service);
    }

    fn is_alive(&self) -> bool {
        Registry::is_alive(self)
    }
}
