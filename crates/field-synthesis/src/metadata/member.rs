use std::{any::Any, fmt, future::Future, sync::Arc};

use futures_util::{future::BoxFuture, FutureExt};
use serde_json::Value;

use super::{Marker, TypeRef};
use crate::{Invocation, ResolverError};

/// An object a member is invoked on, or a service handed to a member.
pub type Instance = Arc<dyn Any + Send + Sync>;

type SyncBody = dyn Fn(Invocation) -> Result<Value, ResolverError> + Send + Sync;
type AsyncBody = dyn Fn(Invocation) -> BoxFuture<'static, Result<Value, ResolverError>> + Send + Sync;

/// The executable part of a member.
#[derive(Clone)]
pub enum MemberBody {
    Sync(Arc<SyncBody>),
    Async(Arc<AsyncBody>),
}

impl MemberBody {
    pub fn is_async(&self) -> bool {
        matches!(self, MemberBody::Async(_))
    }

    pub(crate) fn kind(&self) -> &'static str {
        if self.is_async() {
            "asynchronous"
        } else {
            "synchronous"
        }
    }
}

impl fmt::Debug for MemberBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MemberBody::Sync(_) => "MemberBody::Sync",
            MemberBody::Async(_) => "MemberBody::Async",
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MemberKind {
    Method { parameters: Vec<ParameterDescriptor> },
    Property { readable: bool, writable: bool },
}

/// A declared type whose members are turned into fields.
#[derive(Clone, Debug)]
pub struct SourceTypeDescriptor {
    pub(crate) name: String,
    pub(crate) markers: Vec<Marker>,
    pub(crate) members: Vec<MemberCandidate>,
}

impl SourceTypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        SourceTypeDescriptor {
            name: name.into(),
            markers: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Adds a member. Members without an explicit declaring type are declared by this type.
    pub fn member(mut self, mut member: MemberCandidate) -> Self {
        if member.declaring_type.is_none() {
            member.declaring_type = Some(self.name.clone());
        }
        self.members.push(member);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn members(&self) -> &[MemberCandidate] {
        &self.members
    }
}

/// A method or property of a source type.
#[derive(Clone, Debug)]
pub struct MemberCandidate {
    pub(crate) name: String,
    pub(crate) declaring_type: Option<String>,
    pub(crate) kind: MemberKind,
    pub(crate) ty: TypeRef,
    pub(crate) is_static: bool,
    pub(crate) visibility: Visibility,
    pub(crate) synthetic: bool,
    pub(crate) open_generic: bool,
    pub(crate) markers: Vec<Marker>,
    pub(crate) body: Option<MemberBody>,
}

impl MemberCandidate {
    pub fn method(name: impl Into<String>, return_type: TypeRef) -> Self {
        Self::new(name.into(), MemberKind::Method { parameters: Vec::new() }, return_type)
    }

    /// A readable and writable property.
    pub fn property(name: impl Into<String>, ty: TypeRef) -> Self {
        Self::new(
            name.into(),
            MemberKind::Property {
                readable: true,
                writable: true,
            },
            ty,
        )
    }

    fn new(name: String, kind: MemberKind, ty: TypeRef) -> Self {
        MemberCandidate {
            name,
            declaring_type: None,
            kind,
            ty,
            is_static: false,
            visibility: Visibility::Public,
            synthetic: false,
            open_generic: false,
            markers: Vec::new(),
            body: None,
        }
    }

    pub fn parameter(mut self, parameter: ParameterDescriptor) -> Self {
        if let MemberKind::Method { parameters } = &mut self.kind {
            parameters.push(parameter);
        }
        self
    }

    pub fn read_only(mut self) -> Self {
        if let MemberKind::Property { writable, .. } = &mut self.kind {
            *writable = false;
        }
        self
    }

    pub fn write_only(mut self) -> Self {
        if let MemberKind::Property { readable, .. } = &mut self.kind {
            *readable = false;
        }
        self
    }

    pub fn into_static(self) -> Self {
        MemberCandidate {
            is_static: true,
            ..self
        }
    }

    pub fn private(self) -> Self {
        MemberCandidate {
            visibility: Visibility::Private,
            ..self
        }
    }

    /// Marks a member generated by structural equality or cloning support.
    pub fn synthetic(self) -> Self {
        MemberCandidate { synthetic: true, ..self }
    }

    /// Marks a member with unbound generic parameters.
    pub fn open_generic(self) -> Self {
        MemberCandidate {
            open_generic: true,
            ..self
        }
    }

    pub fn declared_by(self, declaring_type: impl Into<String>) -> Self {
        MemberCandidate {
            declaring_type: Some(declaring_type.into()),
            ..self
        }
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn resolve_sync<F>(self, body: F) -> Self
    where
        F: Fn(Invocation) -> Result<Value, ResolverError> + Send + Sync + 'static,
    {
        MemberCandidate {
            body: Some(MemberBody::Sync(Arc::new(body))),
            ..self
        }
    }

    pub fn resolve_async<F, Fut>(self, body: F) -> Self
    where
        F: Fn(Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ResolverError>> + Send + 'static,
    {
        MemberCandidate {
            body: Some(MemberBody::Async(Arc::new(move |invocation: Invocation| body(invocation).boxed()))),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> Option<&str> {
        self.declaring_type.as_deref()
    }

    pub fn kind(&self) -> &MemberKind {
        &self.kind
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn parameters(&self) -> &[ParameterDescriptor] {
        match &self.kind {
            MemberKind::Method { parameters } => parameters,
            MemberKind::Property { .. } => &[],
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method { .. })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParameterDescriptor {
    pub(crate) name: String,
    pub(crate) ty: TypeRef,
    pub(crate) default_value: Option<Value>,
    pub(crate) markers: Vec<Marker>,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        ParameterDescriptor {
            name: name.into(),
            ty,
            default_value: None,
            markers: Vec::new(),
        }
    }

    /// Makes the parameter optional, defaulting to `value`.
    pub fn default_value(self, value: impl Into<Value>) -> Self {
        ParameterDescriptor {
            default_value: Some(value.into()),
            ..self
        }
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn is_optional(&self) -> bool {
        self.default_value.is_some()
    }
}
