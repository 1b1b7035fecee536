use std::collections::BTreeMap;

use serde_json::Value;

use crate::{FieldResolver, ShapeDescriptor};

/// An argument of a synthesized field, or a field of a synthesized input object.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryArgumentDescriptor {
    pub name: String,
    pub shape: ShapeDescriptor,
    pub description: Option<String>,
    pub default_value: Option<Value>,
    pub metadata: BTreeMap<String, Value>,
}

/// A synthesized output field. Immutable once built.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub(crate) name: String,
    pub(crate) shape: ShapeDescriptor,
    pub(crate) arguments: Vec<QueryArgumentDescriptor>,
    pub(crate) resolver: FieldResolver,
    pub(crate) description: Option<String>,
    pub(crate) deprecation_reason: Option<String>,
    pub(crate) concurrent: bool,
    pub(crate) requires_scope: bool,
    pub(crate) metadata: BTreeMap<String, Value>,
}

impl FieldDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &ShapeDescriptor {
        &self.shape
    }

    pub fn arguments(&self) -> &[QueryArgumentDescriptor] {
        &self.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&QueryArgumentDescriptor> {
        self.arguments.iter().find(|argument| argument.name == name)
    }

    pub fn resolver(&self) -> &FieldResolver {
        &self.resolver
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn deprecation_reason(&self) -> Option<&str> {
        self.deprecation_reason.as_deref()
    }

    /// Whether the execution engine may resolve this field in parallel with its siblings.
    pub fn is_concurrent(&self) -> bool {
        self.concurrent
    }

    /// Whether each resolution runs within its own service scope.
    pub fn requires_scope(&self) -> bool {
        self.requires_scope
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }
}

// Resolvers are closures, two fields are equal when everything else is.
impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.shape == other.shape
            && self.arguments == other.arguments
            && self.description == other.description
            && self.deprecation_reason == other.deprecation_reason
            && self.concurrent == other.concurrent
            && self.requires_scope == other.requires_scope
            && self.metadata == other.metadata
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectTypeDefinition {
    pub name: String,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
    pub metadata: BTreeMap<String, Value>,
    pub fields: Vec<FieldDescriptor>,
}

impl ObjectTypeDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InputObjectDefinition {
    pub name: String,
    pub description: Option<String>,
    pub metadata: BTreeMap<String, Value>,
    pub fields: Vec<QueryArgumentDescriptor>,
}

impl InputObjectDefinition {
    pub fn field(&self, name: &str) -> Option<&QueryArgumentDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }
}
