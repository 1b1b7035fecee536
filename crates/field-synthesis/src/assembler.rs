use std::sync::Arc;

use itertools::Itertools;
use serde_json::Value;

use crate::{
    binding::BindingClassifier,
    cache::ShapeCache,
    overrides::{self, explicit_name},
    resolver::{concurrency_marker, CompiledMember, ConcurrencyMarker},
    selector::{Direction, MemberSelector, SelectedMember},
    Binding, BuildError, FieldDescriptor, FieldResolver, InputObjectDefinition, Invocation, MemberBody, ObjectTypeDefinition,
    QueryArgumentDescriptor, ResolverError, ResolverPolicy, SchemaContainer, ServiceKey, SourceTypeDescriptor,
    SynthesisOptions,
};

/// Turns source type descriptions into object and input object definitions.
///
/// Keep one assembler around for the lifetime of the process: it memoizes shape inference per
/// member. Assembling the same source type twice yields structurally identical definitions.
#[derive(Debug, Default)]
pub struct GraphTypeAssembler {
    options: SynthesisOptions,
    shapes: ShapeCache,
}

impl GraphTypeAssembler {
    pub fn new(options: SynthesisOptions) -> Self {
        GraphTypeAssembler {
            options,
            shapes: ShapeCache::default(),
        }
    }

    pub fn options(&self) -> &SynthesisOptions {
        &self.options
    }

    /// Synthesizes the object type for `source` and registers it into `container`.
    pub fn register(&self, source: &SourceTypeDescriptor, container: &mut dyn SchemaContainer) -> Result<(), BuildError> {
        container.add_object(self.assemble(source)?)
    }

    /// Synthesizes the input object type for `source` and registers it into `container`.
    pub fn register_input(
        &self,
        source: &SourceTypeDescriptor,
        container: &mut dyn SchemaContainer,
    ) -> Result<(), BuildError> {
        container.add_input_object(self.assemble_input(source)?)
    }

    pub fn assemble(&self, source: &SourceTypeDescriptor) -> Result<ObjectTypeDefinition, BuildError> {
        let span = tracing::debug_span!("assemble", ty = %source.name, instance_source = %self.options.instance_source);
        let _guard = span.enter();

        let classifier = BindingClassifier {
            source_type: &source.name,
            name_case: self.options.name_case,
        };
        let type_marker = concurrency_marker(&source.markers);

        let mut fields = MemberSelector::new(source, &self.options)
            .select(Direction::Output)
            .into_iter()
            .map(|selected| self.field(source, selected, &classifier, type_marker))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(name) = fields.iter().map(|field| &field.name).duplicates().next() {
            return Err(BuildError::DuplicateField {
                ty: source.name.clone(),
                name: name.clone(),
            });
        }

        if self.options.sort_fields {
            fields.sort_by(|a, b| a.name.cmp(&b.name));
        }

        let overrides::Annotations {
            description,
            deprecation_reason,
            metadata,
        } = overrides::annotations(&source.markers);

        Ok(ObjectTypeDefinition {
            name: type_name(source),
            description,
            deprecation_reason,
            metadata,
            fields,
        })
    }

    pub fn assemble_input(&self, source: &SourceTypeDescriptor) -> Result<InputObjectDefinition, BuildError> {
        let span = tracing::debug_span!("assemble_input", ty = %source.name);
        let _guard = span.enter();

        let mut fields = MemberSelector::new(source, &self.options)
            .select(Direction::Input)
            .into_iter()
            .map(|selected| self.input_field(source, selected))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(name) = fields.iter().map(|field| &field.name).duplicates().next() {
            return Err(BuildError::DuplicateField {
                ty: source.name.clone(),
                name: name.clone(),
            });
        }

        if self.options.sort_fields {
            fields.sort_by(|a, b| a.name.cmp(&b.name));
        }

        let overrides::Annotations {
            description, metadata, ..
        } = overrides::annotations(&source.markers);

        Ok(InputObjectDefinition {
            name: type_name(source),
            description,
            metadata,
            fields,
        })
    }

    fn field(
        &self,
        source: &SourceTypeDescriptor,
        SelectedMember { member, name }: SelectedMember<'_>,
        classifier: &BindingClassifier<'_>,
        type_marker: Option<ConcurrencyMarker>,
    ) -> Result<FieldDescriptor, BuildError> {
        let location = format!("{}.{}", source.name, member.name);

        let shape = overrides::shape(&member.markers, || {
            self.shapes.infer(&source.name, &member.name, &member.ty)
        })
        .map_err(|err| err.at(location.clone()))?;

        let bindings = member
            .parameters()
            .iter()
            .map(|parameter| classifier.classify(&location, parameter))
            .collect::<Result<Vec<_>, _>>()?;

        let arguments = bindings.iter().filter_map(Binding::as_argument).cloned().collect();
        let is_async = member.ty.is_async();
        let policy = ResolverPolicy::decide(
            is_async,
            member.is_static,
            bindings.iter().any(Binding::uses_services),
            concurrency_marker(&member.markers),
            type_marker,
        );

        let body = member_body(member, &location, is_async, shape.is_nullable())?;
        let overrides::Annotations {
            description,
            deprecation_reason,
            metadata,
        } = overrides::annotations(&member.markers);

        tracing::debug!(
            field = %name,
            shape = %shape,
            concurrent = policy.concurrent,
            scoped = policy.requires_scope,
            "field synthesized"
        );

        let resolver = FieldResolver::new(
            CompiledMember {
                field: Arc::from(location),
                declaring_type: ServiceKey::new(source.name.clone()),
                is_static: member.is_static,
                instance_source: self.options.instance_source,
                bindings,
                body,
            },
            policy,
        );

        Ok(FieldDescriptor {
            name,
            shape,
            arguments,
            resolver,
            description,
            deprecation_reason,
            concurrent: policy.concurrent,
            requires_scope: policy.requires_scope,
            metadata,
        })
    }

    fn input_field(
        &self,
        source: &SourceTypeDescriptor,
        SelectedMember { member, name }: SelectedMember<'_>,
    ) -> Result<QueryArgumentDescriptor, BuildError> {
        let location = format!("{}.{}", source.name, member.name);

        let shape = overrides::shape(&member.markers, || {
            self.shapes.infer(&source.name, &member.name, &member.ty)
        })
        .map_err(|err| err.at(location))?;

        let default_value = if shape.is_nullable() {
            None
        } else {
            member.ty.as_named().and_then(|named| named.zero_value.clone())
        };

        let overrides::Annotations {
            description, metadata, ..
        } = overrides::annotations(&member.markers);

        Ok(QueryArgumentDescriptor {
            name,
            shape,
            description,
            default_value,
            metadata,
        })
    }
}

fn type_name(source: &SourceTypeDescriptor) -> String {
    match explicit_name(&source.markers) {
        Some(Some(name)) => name.to_string(),
        _ => source.name.clone(),
    }
}

fn member_body(
    member: &crate::MemberCandidate,
    location: &str,
    is_async: bool,
    nullable: bool,
) -> Result<MemberBody, BuildError> {
    match &member.body {
        Some(body) if body.is_async() == is_async => Ok(body.clone()),
        Some(body) => Err(BuildError::BodyMismatch {
            location: location.to_string(),
            declared: if is_async { "asynchronous" } else { "synchronous" },
            body: body.kind(),
        }),
        None if !member.is_method() && !is_async => Ok(read_from_source(member.name.clone(), nullable)),
        None => Err(BuildError::MissingBody {
            location: location.to_string(),
        }),
    }
}

/// Properties without a body read the entry of the same name from a JSON object source. A
/// missing or null entry is only allowed when the field is nullable.
fn read_from_source(property: String, nullable: bool) -> MemberBody {
    MemberBody::Sync(Arc::new(move |invocation: Invocation| {
        let source = invocation.instance::<Value>()?;
        match source.get(&property) {
            Some(value) if nullable || !value.is_null() => Ok(value.clone()),
            None if nullable => Ok(Value::Null),
            _ => Err(ResolverError::MissingProperty {
                field: invocation.field().to_string(),
                property: property.clone(),
            }),
        }
    }))
}
