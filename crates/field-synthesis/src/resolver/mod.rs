//! Compiled field resolvers and the policy deciding how they may run.

mod scope;

use std::{fmt, sync::Arc};

use futures_util::{future::BoxFuture, FutureExt};
use serde_json::Value;

use crate::{
    services::required_service, Argument, Binding, InstanceSource, Invocation, Marker, MemberBody, ResolveContext,
    ResolverError, ServiceKey, ServiceProvider,
};

/// How a compiled resolver runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ResolverPolicy {
    pub concurrent: bool,
    pub requires_scope: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ConcurrencyMarker {
    concurrent: bool,
    create_scope: bool,
}

/// The last concurrency marker in `markers`.
pub(crate) fn concurrency_marker(markers: &[Marker]) -> Option<ConcurrencyMarker> {
    markers.iter().rev().find_map(|marker| match *marker {
        Marker::Concurrent {
            concurrent,
            create_scope,
        } => Some(ConcurrencyMarker {
            concurrent,
            create_scope,
        }),
        _ => None,
    })
}

impl ResolverPolicy {
    const SERIAL: ResolverPolicy = ResolverPolicy {
        concurrent: false,
        requires_scope: false,
    };

    pub(crate) fn decide(
        is_async: bool,
        is_static: bool,
        uses_services: bool,
        member_marker: Option<ConcurrencyMarker>,
        type_marker: Option<ConcurrencyMarker>,
    ) -> Self {
        // Static asynchronous members without services share no state with anything.
        if is_async && is_static && !uses_services {
            return ResolverPolicy {
                concurrent: true,
                requires_scope: false,
            };
        }

        match member_marker.or(type_marker) {
            Some(marker) if is_async && marker.concurrent => ResolverPolicy {
                concurrent: true,
                requires_scope: marker.create_scope,
            },
            _ => Self::SERIAL,
        }
    }
}

/// Everything needed to call a member body, captured once when the field is synthesized.
pub(crate) struct CompiledMember {
    pub field: Arc<str>,
    pub declaring_type: ServiceKey,
    pub is_static: bool,
    pub instance_source: InstanceSource,
    pub bindings: Vec<Binding>,
    pub body: MemberBody,
}

impl CompiledMember {
    fn invoke(&self, ctx: &ResolveContext) -> Resolved {
        let invocation = match self.invocation(ctx) {
            Ok(invocation) => invocation,
            Err(err) => return Resolved::Ready(Err(err)),
        };

        match &self.body {
            MemberBody::Sync(body) => Resolved::Ready(body(invocation)),
            MemberBody::Async(body) => Resolved::Pending(body(invocation)),
        }
    }

    fn invocation(&self, ctx: &ResolveContext) -> Result<Invocation, ResolverError> {
        let instance = self.instance(ctx)?;
        let arguments = self
            .bindings
            .iter()
            .map(|binding| self.bind(binding, ctx))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Invocation {
            field: self.field.clone(),
            instance,
            arguments,
        })
    }

    fn instance(&self, ctx: &ResolveContext) -> Result<Option<crate::Instance>, ResolverError> {
        if self.is_static {
            return Ok(None);
        }

        match self.instance_source {
            InstanceSource::Source => ctx
                .source()
                .cloned()
                .map(Some)
                .ok_or_else(|| ResolverError::MissingSource {
                    field: self.field.to_string(),
                }),
            InstanceSource::Services => {
                required_service(self.services(ctx)?.as_ref(), &self.declaring_type, &self.field).map(Some)
            }
        }
    }

    fn bind(&self, binding: &Binding, ctx: &ResolveContext) -> Result<Argument, ResolverError> {
        Ok(match binding {
            Binding::Context | Binding::TypedContext => Argument::Context(ctx.clone()),
            Binding::CancellationSignal => Argument::Cancellation(ctx.cancellation().clone()),
            Binding::SourceValue => Argument::Source(ctx.source().cloned()),
            Binding::ServiceContainer => Argument::Services(self.services(ctx)?.clone()),
            Binding::NamedService(key) => {
                Argument::Service(required_service(self.services(ctx)?.as_ref(), key, &self.field)?)
            }
            Binding::LiteralDefault(value) => Argument::Value(value.clone()),
            Binding::QueryArgument(argument) => Argument::Value(
                ctx.argument(&argument.name)
                    .or(argument.default_value.as_ref())
                    .cloned()
                    .unwrap_or(Value::Null),
            ),
        })
    }

    fn services<'ctx>(&self, ctx: &'ctx ResolveContext) -> Result<&'ctx Arc<dyn ServiceProvider>, ResolverError> {
        ctx.services().ok_or_else(|| ResolverError::MissingServiceProvider {
            field: self.field.to_string(),
        })
    }
}

/// Outcome of calling a resolver: synchronous members are ready immediately.
pub enum Resolved {
    Ready(Result<Value, ResolverError>),
    Pending(BoxFuture<'static, Result<Value, ResolverError>>),
}

impl Resolved {
    pub fn is_pending(&self) -> bool {
        matches!(self, Resolved::Pending(_))
    }

    pub async fn into_value(self) -> Result<Value, ResolverError> {
        match self {
            Resolved::Ready(result) => result,
            Resolved::Pending(future) => future.await,
        }
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Resolved::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// The executable part of a [`FieldDescriptor`](crate::FieldDescriptor). Cheap to clone and
/// safe to call from many tasks at once.
#[derive(Clone)]
pub struct FieldResolver {
    member: Arc<CompiledMember>,
    scoped: bool,
}

impl FieldResolver {
    pub(crate) fn new(member: CompiledMember, policy: ResolverPolicy) -> Self {
        FieldResolver {
            member: Arc::new(member),
            scoped: policy.requires_scope,
        }
    }

    pub fn resolve(&self, ctx: ResolveContext) -> Resolved {
        if self.scoped {
            Resolved::Pending(scope::resolve_scoped(self.member.clone(), ctx).boxed())
        } else {
            self.member.invoke(&ctx)
        }
    }

    pub async fn resolve_value(&self, ctx: ResolveContext) -> Result<Value, ResolverError> {
        self.resolve(ctx).into_value().await
    }

    pub fn is_scoped(&self) -> bool {
        self.scoped
    }
}

impl fmt::Debug for FieldResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldResolver")
            .field("field", &self.member.field)
            .field("scoped", &self.scoped)
            .finish_non_exhaustive()
    }
}
