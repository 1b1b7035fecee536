#![allow(dead_code)]

use std::{
    any::Any,
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use graphql_field_synthesis::{Instance, ServiceKey, ServiceProvider, ServiceScope};

pub const SCOPE_ID: &str = "ScopeId";

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

#[derive(Debug, Default)]
pub struct ScopeCounters {
    created: AtomicUsize,
    released: AtomicUsize,
}

impl ScopeCounters {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

/// An in-memory service provider. Scopes expose their sequence number as the `ScopeId` service.
#[derive(Clone, Default)]
pub struct FakeServices {
    services: HashMap<ServiceKey, Instance>,
    counters: Arc<ScopeCounters>,
    scope_id: Option<usize>,
    failing_creation: bool,
    failing_release: bool,
}

impl FakeServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Any + Send + Sync>(mut self, key: &str, service: T) -> Self {
        self.services.insert(ServiceKey::from(key), Arc::new(service));
        self
    }

    pub fn failing_creation(self) -> Self {
        FakeServices {
            failing_creation: true,
            ..self
        }
    }

    pub fn failing_release(self) -> Self {
        FakeServices {
            failing_release: true,
            ..self
        }
    }

    pub fn counters(&self) -> Arc<ScopeCounters> {
        self.counters.clone()
    }

    pub fn shared(self) -> Arc<dyn ServiceProvider> {
        Arc::new(self)
    }
}

impl ServiceProvider for FakeServices {
    fn service(&self, key: &ServiceKey) -> Option<Instance> {
        if key.as_str() == SCOPE_ID {
            return self.scope_id.map(|id| Arc::new(id) as Instance);
        }
        self.services.get(key).cloned()
    }

    fn create_scope(&self) -> anyhow::Result<Box<dyn ServiceScope>> {
        if self.failing_creation {
            anyhow::bail!("the container has been disposed");
        }

        let id = self.counters.created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Box::new(FakeScope {
            services: FakeServices {
                scope_id: Some(id),
                ..self.clone()
            },
        }))
    }
}

struct FakeScope {
    services: FakeServices,
}

impl ServiceScope for FakeScope {
    fn services(&self) -> Arc<dyn ServiceProvider> {
        Arc::new(self.services.clone())
    }

    fn release(self: Box<Self>) -> anyhow::Result<()> {
        self.services.counters.released.fetch_add(1, Ordering::SeqCst);
        if self.services.failing_release {
            anyhow::bail!("a scoped service failed to dispose");
        }
        Ok(())
    }
}
