use std::{fmt, sync::Arc};

use crate::{Instance, ResolverError};

/// Identifies a service by the name of its type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceKey(String);

impl ServiceKey {
    pub fn new(type_name: impl Into<String>) -> Self {
        ServiceKey(type_name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceKey {
    fn from(value: &str) -> Self {
        ServiceKey(value.to_string())
    }
}

/// The host's dependency resolution container. Read concurrently by many resolvers.
pub trait ServiceProvider: Send + Sync {
    fn service(&self, key: &ServiceKey) -> Option<Instance>;

    /// Opens an isolated resolution scope. The scope is released by exactly one call to
    /// [`ServiceScope::release`].
    fn create_scope(&self) -> anyhow::Result<Box<dyn ServiceScope>>;
}

pub trait ServiceScope: Send {
    /// The container resolving services within this scope.
    fn services(&self) -> Arc<dyn ServiceProvider>;

    fn release(self: Box<Self>) -> anyhow::Result<()>;
}

pub(crate) fn required_service(
    services: &dyn ServiceProvider,
    key: &ServiceKey,
    field: &str,
) -> Result<Instance, ResolverError> {
    services.service(key).ok_or_else(|| ResolverError::MissingService {
        field: field.to_string(),
        service: key.clone(),
    })
}
