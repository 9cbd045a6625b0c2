//! Prototype registry: the process-wide mapping from tag identifiers to the
//! value types that own them.
//!
//! A [`TagRegistry`] is an explicit object, not a global: hosts construct one,
//! register every prototype during startup, then [`seal`](TagRegistry::seal)
//! it before serving. Registration conflicts (duplicate paths, identifier
//! collisions) are hard errors at registration time, never at lookup time.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::builtins::META_NODE_ID;
use crate::error::TagError;
use crate::expr::TagExpr;
use crate::id::TagId;

/// A type that owns a canonical tag expression and can stamp out default
/// instances of itself.
///
/// Usually implemented via `#[derive(Prototype)]` with a `#[tag(...)]`
/// attribute; `tag_expr()` must return the same expression on every call.
pub trait Prototype: Any + Default {
    /// The canonical tag expression this type is addressed by.
    fn tag_expr() -> TagExpr;

    /// The bare type name, as reflected into the expression path.
    fn type_label() -> &'static str;
}

/// A registered prototype: the resolved expression plus the means to
/// instantiate the owning type without knowing it statically.
#[derive(Clone)]
pub struct PrototypeDef {
    expr: TagExpr,
    type_id: TypeId,
    label: &'static str,
    make: fn() -> Box<dyn Any>,
}

impl PrototypeDef {
    fn of<T: Prototype>() -> Self {
        PrototypeDef {
            expr: T::tag_expr(),
            type_id: TypeId::of::<T>(),
            label: T::type_label(),
            make: || Box::new(T::default()),
        }
    }

    pub fn expr(&self) -> &TagExpr {
        &self.expr
    }

    pub fn id(&self) -> TagId {
        self.expr.id()
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Instantiates a fresh default value of the registered type.
    pub fn make_value(&self) -> Box<dyn Any> {
        (self.make)()
    }
}

impl fmt::Debug for PrototypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrototypeDef")
            .field("canonic", &self.expr.canonic())
            .field("id", &self.expr.id())
            .field("label", &self.label)
            .finish()
    }
}

/// The registry proper. Insertion order is preserved; lookups are by
/// identifier or by Rust type.
#[derive(Default)]
pub struct TagRegistry {
    sealed: bool,
    defs: Vec<PrototypeDef>,
    by_id: HashMap<TagId, usize>,
    by_type: HashMap<TypeId, usize>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Closes the registry to further registration. Idempotent.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Registered prototypes, in registration order.
    pub fn defs(&self) -> impl Iterator<Item = &PrototypeDef> {
        self.defs.iter()
    }

    /// Registers `T` under its declared tag expression, returning the
    /// resolved expression.
    ///
    /// Re-registering the same type under the same path is a no-op. A
    /// different type on an occupied path, or a path whose identifier is
    /// already taken (or reserved), is rejected.
    pub fn register_prototype<T: Prototype>(&mut self) -> Result<TagExpr, TagError> {
        let def = PrototypeDef::of::<T>();
        let expr = def.expr.clone();
        self.insert(def)?;
        Ok(expr)
    }

    fn insert(&mut self, def: PrototypeDef) -> Result<(), TagError> {
        let canonic = def.expr.canonic();
        let id = def.expr.id();

        if self.sealed {
            return Err(TagError::RegistryClosed {
                canonic: canonic.to_owned(),
            });
        }
        if id.is_nil() || id.is_wildcard() || id == META_NODE_ID {
            return Err(TagError::ReservedId {
                canonic: canonic.to_owned(),
            });
        }

        if let Some(&at) = self.by_type.get(&def.type_id) {
            let held = &self.defs[at];
            if held.expr.canonic() == canonic {
                return Ok(()); // idempotent re-registration
            }
            return Err(TagError::DuplicateRegistration {
                canonic: canonic.to_owned(),
                existing: held.label,
                incoming: def.label,
            });
        }

        if let Some(&at) = self.by_id.get(&id) {
            let held = &self.defs[at];
            if held.expr.canonic() != canonic {
                return Err(TagError::IdCollision {
                    a: held.expr.canonic().to_owned(),
                    b: canonic.to_owned(),
                });
            }
            return Err(TagError::DuplicateRegistration {
                canonic: canonic.to_owned(),
                existing: held.label,
                incoming: def.label,
            });
        }

        let at = self.defs.len();
        self.by_id.insert(id, at);
        self.by_type.insert(def.type_id, at);
        self.defs.push(def);
        Ok(())
    }

    /// Looks up the prototype registered under the given identifier.
    pub fn lookup_id(&self, id: TagId) -> Option<&PrototypeDef> {
        self.by_id.get(&id).map(|&at| &self.defs[at])
    }

    pub fn contains_id(&self, id: TagId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Looks up the registration of a statically known type.
    pub fn lookup<T: Prototype>(&self) -> Option<&PrototypeDef> {
        self.by_type.get(&TypeId::of::<T>()).map(|&at| &self.defs[at])
    }

    /// Instantiates a default value of the type registered under `id`.
    pub fn make_value(&self, id: TagId) -> Option<Box<dyn Any>> {
        self.lookup_id(id).map(PrototypeDef::make_value)
    }

    /// Merges another registry's prototypes into this one, in the other's
    /// registration order. The first conflict aborts the merge.
    pub fn import(&mut self, other: &TagRegistry) -> Result<(), TagError> {
        for def in &other.defs {
            self.insert(def.clone())?;
        }
        Ok(())
    }
}

impl fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagRegistry")
            .field("sealed", &self.sealed)
            .field("len", &self.defs.len())
            .finish()
    }
}
