//! Decomposition of declared types into GraphQL type shapes.

use std::{fmt, str::FromStr};

use crate::{metadata::TypeKind, Nullability, ShapeError, TypeRef};

/// The type a shape's innermost position refers to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Inferred from the declared type.
    Named(String),
    /// Given explicitly through a [`Marker::GraphType`](crate::Marker::GraphType).
    Custom(String),
    /// The opaque identifier scalar.
    Id,
}

impl ElementType {
    pub fn name(&self) -> &str {
        match self {
            ElementType::Named(name) | ElementType::Custom(name) => name,
            ElementType::Id => "ID",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical GraphQL shape of a field or argument: at most one list level around a named
/// element.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShapeDescriptor {
    element_type: ElementType,
    element_nullable: bool,
    is_list: bool,
    list_nullable: bool,
}

impl ShapeDescriptor {
    pub fn element(element_type: ElementType, nullable: bool) -> Self {
        ShapeDescriptor {
            element_type,
            element_nullable: nullable,
            is_list: false,
            list_nullable: false,
        }
    }

    pub fn list(element_type: ElementType, element_nullable: bool, list_nullable: bool) -> Self {
        ShapeDescriptor {
            element_type,
            element_nullable,
            is_list: true,
            list_nullable,
        }
    }

    pub fn element_type(&self) -> &ElementType {
        &self.element_type
    }

    pub fn is_element_nullable(&self) -> bool {
        self.element_nullable
    }

    pub fn is_list(&self) -> bool {
        self.is_list
    }

    /// Always false for non-list shapes.
    pub fn is_list_nullable(&self) -> bool {
        self.list_nullable
    }

    /// Whether the outermost position may be null: the list when there is one, the element
    /// otherwise.
    pub fn is_nullable(&self) -> bool {
        if self.is_list {
            self.list_nullable
        } else {
            self.element_nullable
        }
    }

    pub fn with_element_type(&self, element_type: ElementType) -> Self {
        ShapeDescriptor {
            element_type,
            ..self.clone()
        }
    }

    /// Changes the nullability of the outermost position.
    pub fn with_nullable(&self, nullable: bool) -> Self {
        let mut shape = self.clone();
        if shape.is_list {
            shape.list_nullable = nullable;
        } else {
            shape.element_nullable = nullable;
        }
        shape
    }
}

impl fmt::Display for ShapeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let element_bang = if self.element_nullable { "" } else { "!" };
        if self.is_list {
            let list_bang = if self.list_nullable { "" } else { "!" };
            write!(f, "[{}{element_bang}]{list_bang}", self.element_type)
        } else {
            write!(f, "{}{element_bang}", self.element_type)
        }
    }
}

/// Parses an SDL type reference such as `[Int!]!` into a shape with a custom element type.
impl FromStr for ShapeDescriptor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (rest, nullable) = strip_bang(s);

        if let Some(inner) = rest.strip_prefix('[') {
            let inner = inner
                .strip_suffix(']')
                .ok_or_else(|| "unbalanced list brackets".to_string())?;
            let (name, element_nullable) = strip_bang(inner.trim());
            if name.starts_with('[') {
                return Err("lists of lists are not supported".to_string());
            }
            validate_name(name)?;
            Ok(ShapeDescriptor::list(
                ElementType::Custom(name.to_string()),
                element_nullable,
                nullable,
            ))
        } else {
            validate_name(rest)?;
            Ok(ShapeDescriptor::element(ElementType::Custom(rest.to_string()), nullable))
        }
    }
}

fn strip_bang(s: &str) -> (&str, bool) {
    match s.strip_suffix('!') {
        Some(rest) => (rest.trim_end(), false),
        None => (s, true),
    }
}

fn validate_name(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric());

    if valid {
        Ok(())
    } else {
        Err(format!("'{name}' is not a valid type name"))
    }
}

/// Shape of a field's declared type: a property type or a method return type.
pub(crate) fn infer(ty: &TypeRef) -> Result<ShapeDescriptor, ShapeError> {
    let ty = match &ty.kind {
        TypeKind::Async(Some(output)) => output.as_ref(),
        _ => ty,
    };

    // A deferred value that may itself be absent makes the outermost position nullable.
    let (ty, absent_deferred) = match &ty.kind {
        TypeKind::Deferred(inner) => (inner.as_ref(), is_nullable_position(ty)),
        _ => (ty, false),
    };

    match &ty.kind {
        TypeKind::List { element, .. } => {
            let (element_type, element_nullable) = infer_element(element)?;
            Ok(ShapeDescriptor::list(
                element_type,
                element_nullable,
                is_nullable_position(ty) || absent_deferred,
            ))
        }
        _ => {
            let (element_type, nullable) = infer_element(ty)?;
            Ok(ShapeDescriptor::element(element_type, nullable || absent_deferred))
        }
    }
}

/// Shape of a parameter. A parameter with a default value can always be omitted, so its
/// outermost position is nullable.
pub(crate) fn infer_parameter(ty: &TypeRef, has_default: bool) -> Result<ShapeDescriptor, ShapeError> {
    let shape = infer(ty)?;
    Ok(if has_default { shape.with_nullable(true) } else { shape })
}

fn infer_element(ty: &TypeRef) -> Result<(ElementType, bool), ShapeError> {
    match &ty.kind {
        TypeKind::Named(named) => Ok((ElementType::Named(named.name.clone()), is_nullable_position(ty))),
        TypeKind::Optional(inner) => infer_element(inner).map(|(element_type, _)| (element_type, true)),
        TypeKind::List { .. } => Err(ShapeError::NestedList),
        TypeKind::Async(_) => Err(ShapeError::NestedAsync),
        TypeKind::Deferred(_) => Err(ShapeError::NestedDeferred),
        TypeKind::Unit => Err(ShapeError::NoValue),
        TypeKind::Generic(name) => Err(ShapeError::OpenGeneric(name.clone())),
        TypeKind::Context | TypeKind::TypedContext(_) => Err(ShapeError::RuntimeOnly("the resolve context")),
        TypeKind::Cancellation => Err(ShapeError::RuntimeOnly("the cancellation token")),
        TypeKind::ServiceProvider => Err(ShapeError::RuntimeOnly("the service provider")),
    }
}

fn is_nullable_position(ty: &TypeRef) -> bool {
    match ty.nullability {
        Nullability::Nullable => true,
        Nullability::NotNull => false,
        // Value types always hold a value, anything else fails open.
        Nullability::Unknown => !ty.as_named().is_some_and(|named| named.is_value_type()),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn named(name: &str) -> ElementType {
        ElementType::Named(name.to_string())
    }

    #[rstest]
    #[case::plain_reference(TypeRef::string(), ShapeDescriptor::element(named("String"), true))]
    #[case::plain_reference_not_null(TypeRef::string().non_null(), ShapeDescriptor::element(named("String"), false))]
    #[case::plain_value_type(TypeRef::int(), ShapeDescriptor::element(named("Int"), false))]
    #[case::optional_value_type(TypeRef::int().optional(), ShapeDescriptor::element(named("Int"), true))]
    #[case::list(
        TypeRef::int().list().non_null(),
        ShapeDescriptor::list(named("Int"), false, false)
    )]
    #[case::list_unknown_nullability(TypeRef::string().array(), ShapeDescriptor::list(named("String"), true, true))]
    #[case::optional_list_of_optional(
        TypeRef::int().optional().set().nullable(),
        ShapeDescriptor::list(named("Int"), true, true)
    )]
    #[case::generic_struct_is_terminal(
        TypeRef::named("Pair<String, Int>").non_null(),
        ShapeDescriptor::element(named("Pair<String, Int>"), false)
    )]
    fn shapes(#[case] ty: TypeRef, #[case] expected: ShapeDescriptor) {
        assert_eq!(infer(&ty).unwrap(), expected);
    }

    #[rstest]
    #[case::future(TypeRef::future(TypeRef::string().non_null()), ShapeDescriptor::element(named("String"), false))]
    #[case::future_list(
        TypeRef::future(TypeRef::int().list().non_null()),
        ShapeDescriptor::list(named("Int"), false, false)
    )]
    #[case::deferred_not_null(
        TypeRef::named("User").non_null().deferred().non_null(),
        ShapeDescriptor::element(named("User"), false)
    )]
    #[case::deferred_nullable(
        TypeRef::named("User").non_null().deferred().nullable(),
        ShapeDescriptor::element(named("User"), true)
    )]
    #[case::deferred_list(
        TypeRef::named("User").non_null().list().non_null().deferred().nullable(),
        ShapeDescriptor::list(named("User"), false, true)
    )]
    #[case::deferred_list_not_null(
        TypeRef::named("User").non_null().list().non_null().deferred().non_null(),
        ShapeDescriptor::list(named("User"), false, false)
    )]
    #[case::future_of_deferred(
        TypeRef::future(TypeRef::int().deferred().non_null()),
        ShapeDescriptor::element(named("Int"), false)
    )]
    fn wrappers_are_transparent(#[case] ty: TypeRef, #[case] expected: ShapeDescriptor) {
        assert_eq!(infer(&ty).unwrap(), expected);
    }

    #[rstest]
    #[case::nested_list(TypeRef::int().list().list(), ShapeError::NestedList)]
    #[case::future_in_list(TypeRef::future(TypeRef::int()).list(), ShapeError::NestedAsync)]
    #[case::future_in_future(TypeRef::future(TypeRef::future(TypeRef::int())), ShapeError::NestedAsync)]
    #[case::deferred_in_list(TypeRef::int().deferred().list(), ShapeError::NestedDeferred)]
    #[case::unit(TypeRef::unit(), ShapeError::NoValue)]
    #[case::future_unit(TypeRef::future(TypeRef::unit()), ShapeError::NoValue)]
    #[case::open_generic(TypeRef::generic("T"), ShapeError::OpenGeneric("T".into()))]
    #[case::context(TypeRef::context(), ShapeError::RuntimeOnly("the resolve context"))]
    fn malformed_shapes(#[case] ty: TypeRef, #[case] expected: ShapeError) {
        assert_eq!(infer(&ty).unwrap_err(), expected);
    }

    #[test]
    fn defaulted_parameters_are_nullable() {
        let shape = infer_parameter(&TypeRef::int(), true).unwrap();
        assert_eq!(shape, ShapeDescriptor::element(named("Int"), true));

        let shape = infer_parameter(&TypeRef::int().list().non_null(), true).unwrap();
        assert_eq!(shape, ShapeDescriptor::list(named("Int"), false, true));

        let shape = infer_parameter(&TypeRef::int(), false).unwrap();
        assert_eq!(shape, ShapeDescriptor::element(named("Int"), false));
    }

    #[rstest]
    #[case("Int", "Int")]
    #[case("Int!", "Int!")]
    #[case("[Int]", "[Int]")]
    #[case(" [ Int! ] ! ", "[Int!]!")]
    #[case("_Any", "_Any")]
    fn parse_graph_types(#[case] input: &str, #[case] expected: &str) {
        let shape: ShapeDescriptor = input.parse().unwrap();
        assert_eq!(shape.to_string(), expected);
        assert!(matches!(shape.element_type(), ElementType::Custom(_)));
    }

    #[rstest]
    #[case("", "'' is not a valid type name")]
    #[case("[Int", "unbalanced list brackets")]
    #[case("[[Int]]", "lists of lists are not supported")]
    #[case("1Int", "'1Int' is not a valid type name")]
    #[case("Int!!", "'Int!' is not a valid type name")]
    fn invalid_graph_types(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(input.parse::<ShapeDescriptor>().unwrap_err(), expected);
    }

    #[test]
    fn outer_nullability() {
        let list = ShapeDescriptor::list(named("Int"), false, true);
        assert_eq!(list.with_nullable(false).to_string(), "[Int!]!");

        let element = ShapeDescriptor::element(named("Int"), false);
        assert_eq!(element.with_nullable(true).to_string(), "Int");
        assert!(!element.with_nullable(true).is_list_nullable());
    }
}
