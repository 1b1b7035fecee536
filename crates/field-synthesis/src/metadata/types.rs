use serde_json::Value;

/// Ambient nullability recorded for one position of a declared type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Nullability {
    /// No annotation. Treated as nullable, except for value types which can't be absent.
    #[default]
    Unknown,
    Nullable,
    NotNull,
}

/// A declared type, as reported by the host, with the nullability of its outermost position.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeRef {
    pub kind: TypeKind,
    pub nullability: Nullability,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeKind {
    /// Terminal type. Generic types other than [`TypeKind::Optional`] are terminal too and carry
    /// their arguments in their name.
    Named(NamedType),
    /// Optional-value wrapper around a value type.
    Optional(Box<TypeRef>),
    List {
        collection: CollectionKind,
        element: Box<TypeRef>,
    },
    /// Asynchronous result, `None` when it completes without a payload.
    Async(Option<Box<TypeRef>>),
    /// Value produced later by a batching subsystem. Wrap a list for the list variant.
    Deferred(Box<TypeRef>),
    Unit,
    /// Unbound generic parameter.
    Generic(String),
    Context,
    /// Context narrowed to a specific source type.
    TypedContext(String),
    Cancellation,
    ServiceProvider,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum CollectionKind {
    Array,
    List,
    Set,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NamedType {
    pub name: String,
    /// Set for value types, which always hold a value and default to this one.
    pub zero_value: Option<Value>,
}

impl NamedType {
    pub fn is_value_type(&self) -> bool {
        self.zero_value.is_some()
    }
}

impl TypeRef {
    pub fn new(kind: TypeKind) -> Self {
        TypeRef {
            kind,
            nullability: Nullability::Unknown,
        }
    }

    /// A reference type, nullable unless annotated otherwise.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Named(NamedType {
            name: name.into(),
            zero_value: None,
        }))
    }

    /// A value type defaulting to `zero_value`.
    pub fn value_type(name: impl Into<String>, zero_value: Value) -> Self {
        Self::new(TypeKind::Named(NamedType {
            name: name.into(),
            zero_value: Some(zero_value),
        }))
    }

    pub fn string() -> Self {
        Self::named("String")
    }

    pub fn int() -> Self {
        Self::value_type("Int", Value::from(0))
    }

    pub fn float() -> Self {
        Self::value_type("Float", Value::from(0.0))
    }

    pub fn boolean() -> Self {
        Self::value_type("Boolean", Value::Bool(false))
    }

    pub fn future(output: TypeRef) -> Self {
        Self::new(TypeKind::Async(Some(Box::new(output))))
    }

    /// An asynchronous operation without a payload.
    pub fn future_unit() -> Self {
        Self::new(TypeKind::Async(None))
    }

    pub fn unit() -> Self {
        Self::new(TypeKind::Unit)
    }

    pub fn generic(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Generic(name.into()))
    }

    pub fn context() -> Self {
        Self::new(TypeKind::Context)
    }

    pub fn typed_context(source_type: impl Into<String>) -> Self {
        Self::new(TypeKind::TypedContext(source_type.into()))
    }

    pub fn cancellation() -> Self {
        Self::new(TypeKind::Cancellation)
    }

    pub fn service_provider() -> Self {
        Self::new(TypeKind::ServiceProvider)
    }

    /// Wraps `self` in the optional-value wrapper.
    pub fn optional(self) -> Self {
        Self::new(TypeKind::Optional(Box::new(self)))
    }

    pub fn list(self) -> Self {
        self.collection(CollectionKind::List)
    }

    pub fn array(self) -> Self {
        self.collection(CollectionKind::Array)
    }

    pub fn set(self) -> Self {
        self.collection(CollectionKind::Set)
    }

    pub fn collection(self, collection: CollectionKind) -> Self {
        Self::new(TypeKind::List {
            collection,
            element: Box::new(self),
        })
    }

    pub fn deferred(self) -> Self {
        Self::new(TypeKind::Deferred(Box::new(self)))
    }

    pub fn nullable(self) -> Self {
        self.with_nullability(Nullability::Nullable)
    }

    pub fn non_null(self) -> Self {
        self.with_nullability(Nullability::NotNull)
    }

    pub fn with_nullability(self, nullability: Nullability) -> Self {
        TypeRef { nullability, ..self }
    }

    pub fn is_async(&self) -> bool {
        matches!(self.kind, TypeKind::Async(_))
    }

    /// Whether this declared type produces nothing a field could return.
    pub fn is_no_value(&self) -> bool {
        match &self.kind {
            TypeKind::Unit | TypeKind::Async(None) => true,
            TypeKind::Async(Some(output)) => matches!(output.kind, TypeKind::Unit),
            _ => false,
        }
    }

    pub fn as_named(&self) -> Option<&NamedType> {
        match &self.kind {
            TypeKind::Named(named) => Some(named),
            _ => None,
        }
    }

    /// The default of this type when a caller provides nothing: the zero value of value types,
    /// null otherwise.
    pub fn zero_value(&self) -> Value {
        self.as_named()
            .and_then(|named| named.zero_value.clone())
            .unwrap_or(Value::Null)
    }

    /// Short human readable form, used in error messages.
    pub fn describe(&self) -> String {
        match &self.kind {
            TypeKind::Named(named) => named.name.clone(),
            TypeKind::Optional(inner) => format!("Option<{}>", inner.describe()),
            TypeKind::List { collection, element } => format!("{collection}<{}>", element.describe()),
            TypeKind::Async(Some(inner)) => format!("Future<{}>", inner.describe()),
            TypeKind::Async(None) => "Future<()>".to_string(),
            TypeKind::Deferred(inner) => format!("Deferred<{}>", inner.describe()),
            TypeKind::Unit => "()".to_string(),
            TypeKind::Generic(name) => name.clone(),
            TypeKind::Context => "Context".to_string(),
            TypeKind::TypedContext(source) => format!("Context<{source}>"),
            TypeKind::Cancellation => "CancellationToken".to_string(),
            TypeKind::ServiceProvider => "ServiceProvider".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_nested_types() {
        let ty = TypeRef::future(TypeRef::int().optional().set().deferred());
        assert_eq!(ty.describe(), "Future<Deferred<Set<Option<Int>>>>");
    }

    #[test]
    fn payload_less_results() {
        assert!(TypeRef::unit().is_no_value());
        assert!(TypeRef::future_unit().is_no_value());
        assert!(TypeRef::future(TypeRef::unit()).is_no_value());
        assert!(!TypeRef::future(TypeRef::int()).is_no_value());
        assert!(!TypeRef::unit().list().is_no_value());
    }

    #[test]
    fn zero_values() {
        assert_eq!(TypeRef::int().zero_value(), Value::from(0));
        assert_eq!(TypeRef::boolean().zero_value(), Value::Bool(false));
        assert_eq!(TypeRef::string().zero_value(), Value::Null);
        assert_eq!(TypeRef::int().optional().zero_value(), Value::Null);
    }
}
