use std::{any::Any, fmt, sync::Arc};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{Instance, ResolverError, ServiceProvider};

/// What the query execution engine provides when it resolves a field.
#[derive(Clone, Default)]
pub struct ResolveContext {
    source: Option<Instance>,
    services: Option<Arc<dyn ServiceProvider>>,
    cancellation: CancellationToken,
    arguments: Arc<IndexMap<String, Value>>,
}

impl ResolveContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(self, source: Instance) -> Self {
        ResolveContext {
            source: Some(source),
            ..self
        }
    }

    pub fn with_source_value<T: Any + Send + Sync>(self, source: T) -> Self {
        self.with_source(Arc::new(source))
    }

    /// A view of this context reporting another service provider. Everything else is shared.
    pub fn with_services(self, services: Arc<dyn ServiceProvider>) -> Self {
        ResolveContext {
            services: Some(services),
            ..self
        }
    }

    pub fn with_cancellation(self, cancellation: CancellationToken) -> Self {
        ResolveContext { cancellation, ..self }
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        Arc::make_mut(&mut self.arguments).insert(name.into(), value.into());
        self
    }

    pub fn source(&self) -> Option<&Instance> {
        self.source.as_ref()
    }

    pub fn services(&self) -> Option<&Arc<dyn ServiceProvider>> {
        self.services.as_ref()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Value of an already coerced query argument.
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }
}

impl fmt::Debug for ResolveContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveContext")
            .field("has_source", &self.source.is_some())
            .field("has_services", &self.services.is_some())
            .field("cancelled", &self.cancellation.is_cancelled())
            .field("arguments", &self.arguments)
            .finish()
    }
}

/// The value bound to one member parameter.
#[derive(Clone)]
pub enum Argument {
    Context(ResolveContext),
    Cancellation(CancellationToken),
    Source(Option<Instance>),
    Services(Arc<dyn ServiceProvider>),
    Service(Instance),
    Value(Value),
}

impl Argument {
    fn kind(&self) -> &'static str {
        match self {
            Argument::Context(_) => "a context",
            Argument::Cancellation(_) => "a cancellation token",
            Argument::Source(_) => "a source value",
            Argument::Services(_) => "a service provider",
            Argument::Service(_) => "a service",
            Argument::Value(_) => "a value",
        }
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Value(value) => f.debug_tuple("Value").field(value).finish(),
            other => f.write_str(other.kind()),
        }
    }
}

/// A single call of a member body: the owning instance and the bound parameters, in
/// declaration order.
pub struct Invocation {
    pub(crate) field: Arc<str>,
    pub(crate) instance: Option<Instance>,
    pub(crate) arguments: Vec<Argument>,
}

impl Invocation {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// The object an instance member is invoked on.
    pub fn instance<T: Any>(&self) -> Result<&T, ResolverError> {
        self.instance
            .as_deref()
            .and_then(|instance| instance.downcast_ref::<T>())
            .ok_or_else(|| ResolverError::MissingSource {
                field: self.field.to_string(),
            })
    }

    pub fn value(&self, position: usize) -> Result<&Value, ResolverError> {
        match self.arguments.get(position) {
            Some(Argument::Value(value)) => Ok(value),
            _ => Err(self.invalid(position, "a value")),
        }
    }

    pub fn deserialize<T: DeserializeOwned>(&self, position: usize) -> Result<T, ResolverError> {
        let value = self.value(position)?.clone();
        serde_json::from_value(value).map_err(|source| ResolverError::InvalidValue {
            field: self.field.to_string(),
            position,
            source,
        })
    }

    pub fn context(&self, position: usize) -> Result<&ResolveContext, ResolverError> {
        match self.arguments.get(position) {
            Some(Argument::Context(ctx)) => Ok(ctx),
            _ => Err(self.invalid(position, "a context")),
        }
    }

    pub fn cancellation(&self, position: usize) -> Result<&CancellationToken, ResolverError> {
        match self.arguments.get(position) {
            Some(Argument::Cancellation(token)) => Ok(token),
            _ => Err(self.invalid(position, "a cancellation token")),
        }
    }

    /// The source value, `None` when the field was resolved without one.
    pub fn source<T: Any>(&self, position: usize) -> Result<Option<&T>, ResolverError> {
        match self.arguments.get(position) {
            Some(Argument::Source(None)) => Ok(None),
            Some(Argument::Source(Some(source))) => source
                .downcast_ref::<T>()
                .map(Some)
                .ok_or_else(|| self.invalid(position, "a source value of the expected type")),
            _ => Err(self.invalid(position, "a source value")),
        }
    }

    pub fn services(&self, position: usize) -> Result<&Arc<dyn ServiceProvider>, ResolverError> {
        match self.arguments.get(position) {
            Some(Argument::Services(services)) => Ok(services),
            _ => Err(self.invalid(position, "a service provider")),
        }
    }

    pub fn service<T: Any>(&self, position: usize) -> Result<&T, ResolverError> {
        match self.arguments.get(position) {
            Some(Argument::Service(service)) => service
                .downcast_ref::<T>()
                .ok_or_else(|| self.invalid(position, "a service of the expected type")),
            _ => Err(self.invalid(position, "a service")),
        }
    }

    fn invalid(&self, position: usize, expected: &'static str) -> ResolverError {
        ResolverError::InvalidArgument {
            field: self.field.to_string(),
            position,
            expected,
        }
    }
}
