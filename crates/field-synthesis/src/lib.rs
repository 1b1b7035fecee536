//! Synthesizes GraphQL object and input types from described source types.
//!
//! A host describes its types with [`SourceTypeDescriptor`]s: the members they declare, the
//! declared type of every member and parameter (including per-position nullability), and the
//! [`Marker`]s attached to them. The [`GraphTypeAssembler`] turns such a description into
//! [`FieldDescriptor`]s with executable [`FieldResolver`]s, and hands them over to a
//! [`SchemaContainer`].
//!
//! How parameters are bound and whether a resolver runs in its own service scope are decided
//! internally and only observable through [`FieldDescriptor`] and [`FieldResolver::is_scoped`]:
//!
//! ```compile_fail
//! use graphql_field_synthesis::Binding;
//! ```
//!
//! ```compile_fail
//! use graphql_field_synthesis::ResolverPolicy;
//! ```

mod assembler;
mod binding;
mod cache;
mod context;
mod descriptor;
mod error;
mod metadata;
mod options;
mod overrides;
mod registry;
mod resolver;
mod selector;
mod services;
mod shape;

pub use assembler::GraphTypeAssembler;
pub use context::{Argument, Invocation, ResolveContext};
pub use descriptor::{FieldDescriptor, InputObjectDefinition, ObjectTypeDefinition, QueryArgumentDescriptor};
pub use error::{BuildError, ResolverError, ShapeError};
pub use metadata::{
    CollectionKind, Instance, Marker, MemberBody, MemberCandidate, MemberKind, NamedType, Nullability,
    ParameterDescriptor, SourceTypeDescriptor, TypeKind, TypeRef, Visibility,
};
pub use options::{InstanceSource, NameCase, SynthesisOptions};
pub use registry::{SchemaContainer, SchemaRegistry, TypeDefinition};
pub use resolver::{FieldResolver, Resolved};
pub use services::{ServiceKey, ServiceProvider, ServiceScope};
pub use shape::{ElementType, ShapeDescriptor};

use binding::Binding;
use resolver::ResolverPolicy;
