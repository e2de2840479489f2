//! Lexically nested environments.
//!
//! Scopes are shared: closures alias their capture frame, pointers
//! alias the frame that owns their binding, and spawned evaluators
//! keep reachable frames alive. Frames therefore sit behind `Arc`
//! with an `RwLock` around the binding table.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::Error;
use crate::heap::Heap;
use crate::value::Value;

pub type ScopeRef = Arc<Scope>;

pub struct Scope {
  parent: Option<ScopeRef>,
  bindings: RwLock<IndexMap<String, Binding>>,
}

struct Binding {
  value: Value,
  mutable: bool,
  /// Type tag inferred at definition time. A binding keeps it for
  /// the rest of its life.
  ty: String,
}

impl Scope {
  pub fn root() -> ScopeRef {
    Arc::new(Scope {
      parent: None,
      bindings: RwLock::new(IndexMap::new()),
    })
  }

  pub fn child(parent: &ScopeRef) -> ScopeRef {
    Arc::new(Scope {
      parent: Some(parent.clone()),
      bindings: RwLock::new(IndexMap::new()),
    })
  }

  /// Store a copied, retained duplicate of `value` under `name`,
  /// locking the value's inferred type into the binding. A prior
  /// binding at this level is evicted and released; redefinition is
  /// not an error.
  pub fn define(
    &self,
    heap: &Heap,
    name: impl Into<String>,
    value: &Value,
    mutable: bool,
  ) -> Result<(), Error> {
    let stored = value.copy();
    stored.retain(heap)?;
    let ty = stored.type_tag().to_owned();
    let old = self.bindings.write().insert(
      name.into(),
      Binding {
        value: stored,
        mutable,
        ty,
      },
    );
    if let Some(old) = old {
      old.value.release(heap)?;
    }
    Ok(())
  }

  /// Read a binding, walking outward through the scope chain.
  pub fn get(&self, name: &str) -> Result<Value, Error> {
    let mut scope = self;
    loop {
      if let Some(binding) = scope.bindings.read().get(name) {
        return Ok(binding.value.clone());
      }
      match &scope.parent {
        Some(parent) => scope = parent.as_ref(),
        None => return Err(undefined(name)),
      }
    }
  }

  /// Read a binding owned by this scope directly; pointers read this
  /// way, and report the binding as undefined once its frame has been
  /// torn down.
  pub fn get_local(&self, name: &str) -> Result<Value, Error> {
    match self.bindings.read().get(name) {
      Some(binding) => Ok(binding.value.clone()),
      None => Err(undefined(name)),
    }
  }

  /// Walk outward to the scope owning `name`.
  pub fn resolve(self: &Arc<Self>, name: &str) -> Option<ScopeRef> {
    let mut scope = self.clone();
    loop {
      if scope.bindings.read().contains_key(name) {
        return Some(scope);
      }
      let parent = scope.parent.clone()?;
      scope = parent;
    }
  }

  /// Replace the value of an existing binding, walking outward to its
  /// owner. Rejects writes to immutable bindings and values whose
  /// inferred type differs from the locked tag; the binding is left
  /// unchanged in both cases.
  pub fn assign(self: &Arc<Self>, heap: &Heap, name: &str, value: &Value) -> Result<(), Error> {
    match self.resolve(name) {
      Some(owner) => owner.assign_local(heap, name, value),
      None => Err(undefined(name)),
    }
  }

  /// [`Scope::assign`] against this scope's own binding table.
  pub fn assign_local(&self, heap: &Heap, name: &str, value: &Value) -> Result<(), Error> {
    {
      let bindings = self.bindings.read();
      let binding = bindings.get(name).ok_or_else(|| undefined(name))?;
      if !binding.mutable {
        return Err(Error::immutable(format!(
          "Cannot assign to immutable variable '{name}'."
        )));
      }
      let ty = value.type_tag();
      if ty != binding.ty {
        return Err(Error::ty(format!(
          "Cannot assign value of type '{}' to variable '{name}' of type '{}'.",
          ty, binding.ty
        )));
      }
    }

    let stored = value.copy();
    stored.retain(heap)?;
    let old = {
      let mut bindings = self.bindings.write();
      // The binding could have been torn down between the check and
      // the write; surface that the same way a stale pointer read
      // would.
      let binding = bindings.get_mut(name).ok_or_else(|| undefined(name))?;
      std::mem::replace(&mut binding.value, stored)
    };
    old.release(heap)?;
    Ok(())
  }

  /// Run `f` over the mutable slot of a binding owned by this scope.
  /// Used for in-place writes into struct interiors.
  pub(crate) fn update<R>(
    &self,
    name: &str,
    f: impl FnOnce(&mut Value, bool) -> Result<R, Error>,
  ) -> Result<R, Error> {
    let mut bindings = self.bindings.write();
    let binding = bindings.get_mut(name).ok_or_else(|| undefined(name))?;
    f(&mut binding.value, binding.mutable)
  }

  /// Snapshot of this scope's direct bindings, in definition order.
  pub fn exports(&self) -> Vec<(String, Value)> {
    self
      .bindings
      .read()
      .iter()
      .map(|(name, binding)| (name.clone(), binding.value.clone()))
      .collect()
  }

  /// Tear the frame down: every local value is released and the
  /// binding table emptied. Pointers into this frame keep a handle to
  /// it, but their reads fail from here on.
  pub fn destroy(&self, heap: &Heap) -> Result<(), Error> {
    let locals: Vec<Binding> = {
      let mut bindings = self.bindings.write();
      bindings.drain(..).map(|(_, binding)| binding).collect()
    };
    for binding in locals {
      binding.value.release(heap)?;
    }
    Ok(())
  }
}

fn undefined(name: &str) -> Error {
  Error::name(format!("Undefined variable '{name}'."))
}

#[cfg(test)]
mod tests;
