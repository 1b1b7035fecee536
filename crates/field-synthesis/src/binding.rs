//! Decides how each member parameter gets its value when the field is resolved.

use serde_json::Value;

use crate::{
    metadata::TypeKind,
    overrides::{self, explicit_name},
    shape, BuildError, Marker, NameCase, ParameterDescriptor, QueryArgumentDescriptor, ServiceKey,
};

/// Strategy producing the value of one parameter. Every parameter gets exactly one.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Binding {
    Context,
    CancellationSignal,
    /// The context, narrowed to the source type of the field.
    TypedContext,
    SourceValue,
    ServiceContainer,
    NamedService(ServiceKey),
    /// Always this value, whatever the caller sends.
    LiteralDefault(Value),
    QueryArgument(QueryArgumentDescriptor),
}

impl Binding {
    pub(crate) fn uses_services(&self) -> bool {
        matches!(self, Binding::ServiceContainer | Binding::NamedService(_))
    }

    pub(crate) fn as_argument(&self) -> Option<&QueryArgumentDescriptor> {
        match self {
            Binding::QueryArgument(argument) => Some(argument),
            _ => None,
        }
    }
}

pub(crate) struct BindingClassifier<'a> {
    /// The source type the field is synthesized for.
    pub source_type: &'a str,
    pub name_case: NameCase,
}

impl BindingClassifier<'_> {
    /// Runs the rules in priority order. `location` names the member for error messages.
    pub(crate) fn classify(&self, location: &str, parameter: &ParameterDescriptor) -> Result<Binding, BuildError> {
        let location = || format!("{location}({}:)", parameter.name);
        let markers = parameter.markers.as_slice();

        match &parameter.ty.kind {
            TypeKind::Context => return Ok(Binding::Context),
            TypeKind::Cancellation => return Ok(Binding::CancellationSignal),
            TypeKind::TypedContext(source) => {
                return if source == self.source_type {
                    Ok(Binding::TypedContext)
                } else {
                    Err(BuildError::IncompatibleContextType {
                        location: location(),
                        expected: self.source_type.to_string(),
                        found: source.clone(),
                    })
                };
            }
            _ => {}
        }

        let source_typed = parameter
            .ty
            .as_named()
            .is_some_and(|named| named.name == self.source_type);
        if source_typed {
            return Ok(Binding::SourceValue);
        }
        if markers.contains(&Marker::FromSource) {
            return Err(BuildError::IncompatibleSourceType {
                location: location(),
                expected: self.source_type.to_string(),
                found: parameter.ty.describe(),
            });
        }

        if matches!(parameter.ty.kind, TypeKind::ServiceProvider) {
            return Ok(Binding::ServiceContainer);
        }

        if markers.contains(&Marker::FromServices) {
            return match parameter.ty.as_named() {
                Some(named) => Ok(Binding::NamedService(ServiceKey::new(named.name.clone()))),
                None => Err(BuildError::InvalidServiceType { location: location() }),
            };
        }

        if markers.contains(&Marker::Name(None)) {
            return Ok(Binding::LiteralDefault(parameter.ty.zero_value()));
        }

        self.query_argument(parameter)
            .map(Binding::QueryArgument)
            .map_err(|err| err.at(location()))
    }

    fn query_argument(
        &self,
        parameter: &ParameterDescriptor,
    ) -> Result<QueryArgumentDescriptor, overrides::OverrideError> {
        let markers = parameter.markers.as_slice();
        let shape = overrides::shape(markers, || {
            shape::infer_parameter(&parameter.ty, parameter.default_value.is_some())
        })?;

        let name = match explicit_name(markers) {
            Some(Some(name)) => name.to_string(),
            _ => self.name_case.apply(&parameter.name),
        };

        let default_value = match &parameter.default_value {
            Some(value) => Some(value.clone()),
            None => parameter
                .ty
                .as_named()
                .and_then(|named| named.zero_value.clone()),
        };

        let overrides::Annotations {
            description,
            metadata,
            ..
        } = overrides::annotations(markers);

        Ok(QueryArgumentDescriptor {
            name,
            shape,
            description,
            default_value,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::TypeRef;

    const CLASSIFIER: BindingClassifier<'static> = BindingClassifier {
        source_type: "User",
        name_case: NameCase::Camel,
    };

    fn classify(parameter: ParameterDescriptor) -> Result<Binding, BuildError> {
        CLASSIFIER.classify("User.friends", &parameter)
    }

    #[rstest]
    #[case::context(ParameterDescriptor::new("ctx", TypeRef::context()), Binding::Context)]
    #[case::cancellation(ParameterDescriptor::new("token", TypeRef::cancellation()), Binding::CancellationSignal)]
    #[case::typed_context(ParameterDescriptor::new("ctx", TypeRef::typed_context("User")), Binding::TypedContext)]
    #[case::source_by_type(ParameterDescriptor::new("user", TypeRef::named("User")), Binding::SourceValue)]
    #[case::source_by_marker(
        ParameterDescriptor::new("me", TypeRef::named("User").non_null()).marker(Marker::FromSource),
        Binding::SourceValue
    )]
    #[case::service_container(ParameterDescriptor::new("services", TypeRef::service_provider()), Binding::ServiceContainer)]
    #[case::named_service(
        ParameterDescriptor::new("repo", TypeRef::named("UserRepository")).marker(Marker::FromServices),
        Binding::NamedService(ServiceKey::new("UserRepository"))
    )]
    #[case::literal_default(
        ParameterDescriptor::new("limit", TypeRef::int()).marker(Marker::Name(None)),
        Binding::LiteralDefault(json!(0))
    )]
    #[case::literal_default_reference(
        ParameterDescriptor::new("filter", TypeRef::string()).marker(Marker::Name(None)),
        Binding::LiteralDefault(Value::Null)
    )]
    fn non_argument_bindings(#[case] parameter: ParameterDescriptor, #[case] expected: Binding) {
        let binding = classify(parameter).unwrap();
        assert!(binding.as_argument().is_none());
        assert_eq!(binding, expected);
    }

    #[test]
    fn context_rules_take_priority_over_markers() {
        let parameter = ParameterDescriptor::new("ctx", TypeRef::context())
            .marker(Marker::FromServices)
            .marker(Marker::Name(None));
        assert_eq!(classify(parameter).unwrap(), Binding::Context);
    }

    #[test]
    fn incompatible_typed_context() {
        let err = classify(ParameterDescriptor::new("ctx", TypeRef::typed_context("Post"))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "At User.friends(ctx:), the context is narrowed to 'Post' but the field belongs to 'User'"
        );
    }

    #[test]
    fn incompatible_source() {
        let parameter = ParameterDescriptor::new("post", TypeRef::named("Post")).marker(Marker::FromSource);
        let err = classify(parameter).unwrap_err();
        assert_eq!(
            err.to_string(),
            "At User.friends(post:), the source parameter expects 'Post' but the field belongs to 'User'"
        );
    }

    #[test]
    fn services_require_a_named_type() {
        let parameter = ParameterDescriptor::new("repos", TypeRef::named("Repo").list()).marker(Marker::FromServices);
        assert!(matches!(
            classify(parameter),
            Err(BuildError::InvalidServiceType { .. })
        ));
    }

    #[test]
    fn service_bindings_use_services() {
        assert!(Binding::ServiceContainer.uses_services());
        assert!(Binding::NamedService(ServiceKey::new("Repo")).uses_services());
        assert!(!Binding::Context.uses_services());
    }

    #[test]
    fn value_type_argument_defaults_to_zero() {
        let binding = classify(ParameterDescriptor::new("first_n", TypeRef::int())).unwrap();
        let argument = binding.as_argument().unwrap();

        assert_eq!(argument.name, "firstN");
        assert_eq!(argument.shape.to_string(), "Int!");
        assert_eq!(argument.default_value, Some(json!(0)));
    }

    #[test]
    fn optional_argument_uses_its_default() {
        let parameter = ParameterDescriptor::new("tags", TypeRef::string().non_null().list().non_null())
            .default_value(json!(["a"]))
            .marker(Marker::description("Filter by tags"))
            .marker(Marker::metadata("complexity", 2));
        let binding = classify(parameter).unwrap();
        let argument = binding.as_argument().unwrap();

        assert_eq!(argument.shape.to_string(), "[String!]");
        assert_eq!(argument.default_value, Some(json!(["a"])));
        assert_eq!(argument.description.as_deref(), Some("Filter by tags"));
        assert_eq!(argument.metadata.get("complexity"), Some(&json!(2)));
    }

    #[test]
    fn reference_argument_has_no_default() {
        let parameter = ParameterDescriptor::new("search", TypeRef::string())
            .marker(Marker::name("query"))
            .marker(Marker::Id);
        let binding = classify(parameter).unwrap();
        let argument = binding.as_argument().unwrap();

        assert_eq!(argument.name, "query");
        assert_eq!(argument.shape.to_string(), "ID");
        assert_eq!(argument.default_value, None);
    }

    #[test]
    fn conflicting_argument_markers() {
        let parameter = ParameterDescriptor::new("id", TypeRef::int())
            .marker(Marker::Required)
            .marker(Marker::Optional);
        let err = classify(parameter).unwrap_err();
        assert_eq!(
            err.to_string(),
            "At User.friends(id:), a member cannot be both required and optional"
        );
    }

    #[test]
    fn malformed_argument_type() {
        let err = classify(ParameterDescriptor::new("values", TypeRef::int().list().list())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "At User.friends(values:), the declared type has no GraphQL representation: lists of lists are not supported"
        );
    }
}
