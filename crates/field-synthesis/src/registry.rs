use std::{collections::BTreeMap, fmt::Write};

use serde_json::Value;

use crate::{BuildError, FieldDescriptor, InputObjectDefinition, ObjectTypeDefinition, QueryArgumentDescriptor};

/// Receives the types synthesized by the [`GraphTypeAssembler`](crate::GraphTypeAssembler).
pub trait SchemaContainer {
    fn add_object(&mut self, object: ObjectTypeDefinition) -> Result<(), BuildError>;

    fn add_input_object(&mut self, input_object: InputObjectDefinition) -> Result<(), BuildError>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeDefinition {
    Object(ObjectTypeDefinition),
    InputObject(InputObjectDefinition),
}

impl TypeDefinition {
    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Object(object) => &object.name,
            TypeDefinition::InputObject(input_object) => &input_object.name,
        }
    }
}

/// A schema container keeping every type by name. Output and input types share one namespace.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    types: BTreeMap<String, TypeDefinition>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn object(&self, name: &str) -> Option<&ObjectTypeDefinition> {
        match self.types.get(name)? {
            TypeDefinition::Object(object) => Some(object),
            TypeDefinition::InputObject(_) => None,
        }
    }

    pub fn input_object(&self, name: &str) -> Option<&InputObjectDefinition> {
        match self.types.get(name)? {
            TypeDefinition::InputObject(input_object) => Some(input_object),
            TypeDefinition::Object(_) => None,
        }
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn insert(&mut self, definition: TypeDefinition) -> Result<(), BuildError> {
        let name = definition.name().to_string();
        if self.types.contains_key(&name) {
            return Err(BuildError::DuplicateType { name });
        }

        tracing::debug!(ty = %name, "type registered");
        self.types.insert(name, definition);
        Ok(())
    }

    /// Renders every registered type as SDL, ordered by type name.
    pub fn to_sdl(&self) -> String {
        let mut sdl = String::new();

        for definition in self.types.values() {
            match definition {
                TypeDefinition::Object(object) => export_object(object, &mut sdl),
                TypeDefinition::InputObject(input_object) => export_input_object(input_object, &mut sdl),
            }
        }

        sdl
    }
}

impl SchemaContainer for SchemaRegistry {
    fn add_object(&mut self, object: ObjectTypeDefinition) -> Result<(), BuildError> {
        self.insert(TypeDefinition::Object(object))
    }

    fn add_input_object(&mut self, input_object: InputObjectDefinition) -> Result<(), BuildError> {
        self.insert(TypeDefinition::InputObject(input_object))
    }
}

fn export_object(object: &ObjectTypeDefinition, sdl: &mut String) {
    if let Some(description) = &object.description {
        export_description(description, "", sdl);
    }
    writeln!(sdl, "type {} {{", object.name).ok();
    for field in &object.fields {
        export_field(field, sdl);
    }
    writeln!(sdl, "}}\n").ok();
}

fn export_field(field: &FieldDescriptor, sdl: &mut String) {
    if let Some(description) = &field.description {
        export_description(description, "\t", sdl);
    }

    if field.arguments.is_empty() {
        write!(sdl, "\t{}: {}", field.name, field.shape).ok();
    } else {
        write!(sdl, "\t{}(", field.name).ok();
        for (i, argument) in field.arguments.iter().enumerate() {
            if i != 0 {
                sdl.push_str(", ");
            }
            export_input_value(argument, sdl);
        }
        write!(sdl, "): {}", field.shape).ok();
    }

    if let Some(reason) = &field.deprecation_reason {
        write!(sdl, " @deprecated(reason: \"{}\")", reason.escape_default()).ok();
    }

    writeln!(sdl).ok();
}

fn export_input_object(input_object: &InputObjectDefinition, sdl: &mut String) {
    if let Some(description) = &input_object.description {
        export_description(description, "", sdl);
    }
    writeln!(sdl, "input {} {{", input_object.name).ok();
    for field in &input_object.fields {
        if let Some(description) = &field.description {
            export_description(description, "\t", sdl);
        }
        sdl.push('\t');
        export_input_value(field, sdl);
        writeln!(sdl).ok();
    }
    writeln!(sdl, "}}\n").ok();
}

/// Writes a block string. An embedded `"""` is escaped as `\"""` so it cannot close the block.
fn export_description(description: &str, indent: &str, sdl: &mut String) {
    let escaped = description.replace("\"\"\"", "\\\"\"\"");
    let body = escaped.replace('\n', &format!("\n{indent}"));
    writeln!(sdl, "{indent}\"\"\"\n{indent}{body}\n{indent}\"\"\"").ok();
}

fn export_input_value(value: &QueryArgumentDescriptor, sdl: &mut String) {
    write!(sdl, "{}: {}", value.name, value.shape).ok();
    if let Some(default_value) = &value.default_value {
        sdl.push_str(" = ");
        export_literal(default_value, sdl);
    }
}

/// Writes a JSON value as a GraphQL literal. Object keys are written as bare names.
fn export_literal(value: &Value, sdl: &mut String) {
    match value {
        Value::Array(items) => {
            sdl.push('[');
            for (i, item) in items.iter().enumerate() {
                if i != 0 {
                    sdl.push_str(", ");
                }
                export_literal(item, sdl);
            }
            sdl.push(']');
        }
        Value::Object(entries) => {
            sdl.push('{');
            for (i, (key, item)) in entries.iter().enumerate() {
                if i != 0 {
                    sdl.push_str(", ");
                }
                write!(sdl, "{key}: ").ok();
                export_literal(item, sdl);
            }
            sdl.push('}');
        }
        scalar => {
            write!(sdl, "{scalar}").ok();
        }
    }
}
