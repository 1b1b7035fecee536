use serde_json::Value;

/// Declarative annotation attached to a type, member or parameter.
///
/// Markers are kept in declaration order. Apart from the precedence between custom types,
/// required/optional and identifiers, their effects don't depend on that order.
#[derive(Clone, Debug, PartialEq)]
pub enum Marker {
    /// Replaces the inferred type with a schema type reference, e.g. `[Int!]`.
    GraphType(String),
    Required,
    Optional,
    /// Maps the element to the `ID` scalar.
    Id,
    Ignore,
    /// `Name(None)` drops a member, or turns a parameter into a literal default.
    Name(Option<String>),
    Description(String),
    Deprecated(String),
    Metadata { key: String, value: Value },
    /// Allows an asynchronous field to run in parallel with its siblings, optionally in a
    /// dedicated service scope. On a type it applies to every member without its own marker.
    Concurrent { concurrent: bool, create_scope: bool },
    /// Binds the parameter to the value the field is resolved on.
    FromSource,
    /// Binds the parameter to a service of the parameter type.
    FromServices,
}

impl Marker {
    pub fn graph_type(graph_type: impl Into<String>) -> Self {
        Marker::GraphType(graph_type.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Marker::Name(Some(name.into()))
    }

    pub fn description(description: impl Into<String>) -> Self {
        Marker::Description(description.into())
    }

    pub fn deprecated(reason: impl Into<String>) -> Self {
        Marker::Deprecated(reason.into())
    }

    pub fn metadata(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Marker::Metadata {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn concurrent(concurrent: bool) -> Self {
        Marker::Concurrent {
            concurrent,
            create_scope: false,
        }
    }

    /// Concurrent, within a dedicated service scope.
    pub fn scoped() -> Self {
        Marker::Concurrent {
            concurrent: true,
            create_scope: true,
        }
    }
}
