//! Applies declarative markers on top of inferred identities and shapes.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::{BuildError, ElementType, Marker, ShapeDescriptor, ShapeError};

#[derive(Debug)]
pub(crate) enum OverrideError {
    Shape(ShapeError),
    ConflictingNullability,
    GraphType { graph_type: String, reason: String },
}

impl OverrideError {
    pub(crate) fn at(self, location: String) -> BuildError {
        match self {
            OverrideError::Shape(source) => BuildError::MalformedShape { location, source },
            OverrideError::ConflictingNullability => BuildError::ConflictingNullability { location },
            OverrideError::GraphType { graph_type, reason } => BuildError::IncompatibleGraphType {
                location,
                graph_type,
                reason,
            },
        }
    }
}

/// Whether the markers remove the member altogether. A null name wins over any other name.
pub(crate) fn is_dropped(markers: &[Marker]) -> bool {
    markers.contains(&Marker::Ignore) || markers.contains(&Marker::Name(None))
}

/// The last `Name` marker: `Some(None)` for the null sentinel, `None` without any.
pub(crate) fn explicit_name(markers: &[Marker]) -> Option<Option<&str>> {
    markers.iter().rev().find_map(|marker| match marker {
        Marker::Name(name) => Some(name.as_deref()),
        _ => None,
    })
}

/// Final identity of a member, `None` when it is dropped.
pub(crate) fn identity(markers: &[Marker], derived: impl FnOnce() -> String) -> Option<String> {
    if is_dropped(markers) {
        return None;
    }

    match explicit_name(markers) {
        Some(name) => name.map(str::to_string),
        None => Some(derived()),
    }
}

/// Computes the final shape. Inference only runs when no custom graph type replaces it.
pub(crate) fn shape(
    markers: &[Marker],
    infer: impl FnOnce() -> Result<ShapeDescriptor, ShapeError>,
) -> Result<ShapeDescriptor, OverrideError> {
    let required = markers.contains(&Marker::Required);
    let optional = markers.contains(&Marker::Optional);
    if required && optional {
        return Err(OverrideError::ConflictingNullability);
    }

    let custom = markers.iter().rev().find_map(|marker| match marker {
        Marker::GraphType(graph_type) => Some(graph_type),
        _ => None,
    });

    let mut shape = match custom {
        Some(graph_type) => graph_type
            .parse::<ShapeDescriptor>()
            .map_err(|reason| OverrideError::GraphType {
                graph_type: graph_type.clone(),
                reason,
            })?,
        None => {
            let shape = infer().map_err(OverrideError::Shape)?;
            if markers.contains(&Marker::Id) {
                shape.with_element_type(ElementType::Id)
            } else {
                shape
            }
        }
    };

    if required {
        shape = shape.with_nullable(false);
    } else if optional {
        shape = shape.with_nullable(true);
    }

    Ok(shape)
}

/// Shape-neutral information carried by markers.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Annotations {
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
    pub metadata: BTreeMap<String, Value>,
}

pub(crate) fn annotations(markers: &[Marker]) -> Annotations {
    let mut annotations = Annotations::default();

    for marker in markers {
        match marker {
            Marker::Description(description) => annotations.description = Some(description.clone()),
            Marker::Deprecated(reason) => annotations.deprecation_reason = Some(reason.clone()),
            Marker::Metadata { key, value } => {
                annotations.metadata.insert(key.clone(), value.clone());
            }
            _ => {}
        }
    }

    annotations
}
