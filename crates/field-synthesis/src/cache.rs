use std::sync::{PoisonError, RwLock};

use fxhash::FxHashMap;

use crate::{shape, ShapeDescriptor, ShapeError, TypeRef};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct MemberKey {
    declaring_type: String,
    member: String,
}

/// Memoized shape inference per (declaring type, member). Entries are only reused while the
/// declared type they were computed for is unchanged.
#[derive(Debug, Default)]
pub(crate) struct ShapeCache {
    entries: RwLock<FxHashMap<MemberKey, (TypeRef, Result<ShapeDescriptor, ShapeError>)>>,
}

impl ShapeCache {
    pub(crate) fn infer(&self, declaring_type: &str, member: &str, ty: &TypeRef) -> Result<ShapeDescriptor, ShapeError> {
        let key = MemberKey {
            declaring_type: declaring_type.to_string(),
            member: member.to_string(),
        };

        if let Some((cached_ty, shape)) = self.entries.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
            if cached_ty == ty {
                return shape.clone();
            }
        }

        let shape = shape::infer(ty);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, (ty.clone(), shape.clone()));

        shape
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
