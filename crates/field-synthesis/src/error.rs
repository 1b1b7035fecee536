use crate::ServiceKey;

/// Raised while synthesizing a type. Any of these aborts the synthesis of the whole type.
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("At {location}, the declared type has no GraphQL representation: {source}")]
    MalformedShape { location: String, source: ShapeError },
    #[error("At {location}, a member cannot be both required and optional")]
    ConflictingNullability { location: String },
    #[error("At {location}, the graph type '{graph_type}' is invalid: {reason}")]
    IncompatibleGraphType {
        location: String,
        graph_type: String,
        reason: String,
    },
    #[error("At {location}, the context is narrowed to '{found}' but the field belongs to '{expected}'")]
    IncompatibleContextType {
        location: String,
        expected: String,
        found: String,
    },
    #[error("At {location}, the source parameter expects '{found}' but the field belongs to '{expected}'")]
    IncompatibleSourceType {
        location: String,
        expected: String,
        found: String,
    },
    #[error("At {location}, services can only be injected for named types")]
    InvalidServiceType { location: String },
    #[error("At {location}, the member is declared {declared} but its body is {body}")]
    BodyMismatch {
        location: String,
        declared: &'static str,
        body: &'static str,
    },
    #[error("At {location}, the member has no body to resolve it with")]
    MissingBody { location: String },
    #[error("The type '{ty}' declares the field '{name}' more than once")]
    DuplicateField { ty: String, name: String },
    #[error("A type named '{name}' is already registered")]
    DuplicateType { name: String },
}

/// Why a declared type could not be decomposed into a [`ShapeDescriptor`](crate::ShapeDescriptor).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("it does not produce a value")]
    NoValue,
    #[error("an asynchronous result may only wrap the outermost type")]
    NestedAsync,
    #[error("a deferred result may only wrap the outermost type")]
    NestedDeferred,
    #[error("lists of lists are not supported")]
    NestedList,
    #[error("the generic parameter '{0}' is not bound")]
    OpenGeneric(String),
    #[error("{0} is only available as a resolver parameter")]
    RuntimeOnly(&'static str),
}

/// Raised when a compiled resolver runs. Errors are reported for the field being resolved and
/// never turned into a null value.
#[derive(thiserror::Error, Debug)]
pub enum ResolverError {
    #[error("{field}: no service provider is available in the resolve context")]
    MissingServiceProvider { field: String },
    #[error("{field}: the service '{service}' is not registered")]
    MissingService { field: String, service: ServiceKey },
    #[error("{field}: the field requires a source value but none was provided")]
    MissingSource { field: String },
    #[error("{field}: the source value has no '{property}' for a non-null field")]
    MissingProperty { field: String, property: String },
    #[error("{field}: argument #{position} is not {expected}")]
    InvalidArgument {
        field: String,
        position: usize,
        expected: &'static str,
    },
    #[error("{field}: argument #{position} could not be deserialized: {source}")]
    InvalidValue {
        field: String,
        position: usize,
        source: serde_json::Error,
    },
    #[error("{field}: the operation was cancelled")]
    Cancelled { field: String },
    #[error("{field}: could not create a service scope: {source}")]
    ScopeCreation { field: String, source: anyhow::Error },
    #[error("{field}: could not release the service scope: {source}")]
    ScopeRelease { field: String, source: anyhow::Error },
    #[error(transparent)]
    Faulted(#[from] anyhow::Error),
}

impl ResolverError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResolverError::Cancelled { .. })
    }
}
