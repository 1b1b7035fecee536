use std::sync::Arc;

use serde_json::Value;

use super::{CompiledMember, Resolved};
use crate::{ResolveContext, ResolverError, ServiceScope};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
enum ScopePhase {
    Idle,
    ScopeOpen,
    Invoking,
    Completing,
    Closed,
}

struct PhaseTracker<'a> {
    field: &'a str,
    current: ScopePhase,
}

impl PhaseTracker<'_> {
    fn advance(&mut self, next: ScopePhase) {
        tracing::trace!(field = self.field, from = %self.current, to = %next, "scoped resolution");
        self.current = next;
    }
}

/// Resolves an asynchronous member within its own service scope. The scope is released exactly
/// once whatever the outcome, including when this future is dropped before completion.
pub(super) async fn resolve_scoped(member: Arc<CompiledMember>, ctx: ResolveContext) -> Result<Value, ResolverError> {
    let field = member.field.clone();
    let mut phase = PhaseTracker {
        field: &field,
        current: ScopePhase::Idle,
    };

    let scope = ctx
        .services()
        .ok_or_else(|| ResolverError::MissingServiceProvider {
            field: field.to_string(),
        })?
        .create_scope()
        .map_err(|source| ResolverError::ScopeCreation {
            field: field.to_string(),
            source,
        })?;
    let scoped_services = scope.services();
    let guard = ScopeGuard {
        scope: Some(scope),
        field: field.clone(),
    };
    phase.advance(ScopePhase::ScopeOpen);

    let cancellation = ctx.cancellation().clone();
    let scoped_ctx = ctx.with_services(scoped_services);
    phase.advance(ScopePhase::Invoking);

    let outcome = match member.invoke(&scoped_ctx) {
        Resolved::Ready(result) => result,
        Resolved::Pending(future) => {
            tokio::select! {
                biased;
                () = cancellation.cancelled() => Err(ResolverError::Cancelled { field: field.to_string() }),
                result = future => result,
            }
        }
    };
    phase.advance(ScopePhase::Completing);

    let outcome = guard.release(outcome);
    phase.advance(ScopePhase::Closed);

    outcome
}

struct ScopeGuard {
    scope: Option<Box<dyn ServiceScope>>,
    field: Arc<str>,
}

impl ScopeGuard {
    /// Releases the scope and hands back the outcome. A release failure only surfaces when the
    /// resolution itself succeeded.
    fn release(mut self, outcome: Result<Value, ResolverError>) -> Result<Value, ResolverError> {
        let Some(scope) = self.scope.take() else {
            return outcome;
        };

        match (scope.release(), outcome) {
            (Ok(()), outcome) => outcome,
            (Err(source), Ok(_)) => Err(ResolverError::ScopeRelease {
                field: self.field.to_string(),
                source,
            }),
            (Err(source), Err(err)) => {
                tracing::warn!(field = %self.field, "could not release service scope after a failed resolution: {source:#}");
                Err(err)
            }
        }
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if let Some(scope) = self.scope.take() {
            tracing::debug!(field = %self.field, "resolution dropped before completion, releasing its service scope");
            if let Err(err) = scope.release() {
                tracing::warn!(field = %self.field, "could not release service scope: {err:#}");
            }
        }
    }
}
