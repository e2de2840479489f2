use super::*;

/// Where an assignable container lives: a scope binding or a heap
/// payload, plus a path of struct fields leading into its interior.
pub(super) enum Place {
  Binding {
    scope: ScopeRef,
    name: String,
    path: Vec<String>,
  },
  Object {
    addr: crate::heap::Addr,
    path: Vec<String>,
  },
}

impl Interp {
  /// `obj.name = value`.
  ///
  /// Writing through a class reference mutates the shared heap
  /// payload and ignores binding mutability; writing into a struct
  /// mutates the binding's interior in place and therefore requires
  /// the binding to be mutable.
  pub(super) fn set_field(&mut self, s: &ast::Set) -> Result<Value, Control> {
    let place = self.resolve_place(&s.obj)?;
    let value = self.eval(&s.value)?;
    self.write_place(place, &s.name, &value)?;
    Ok(value)
  }

  fn resolve_place(&mut self, expr: &Expr) -> Result<Place, Control> {
    match expr {
      Expr::Variable(name) => {
        let scope = self
          .scope
          .resolve(name)
          .ok_or_else(|| Error::name(format!("Undefined variable '{name}'.")))?;
        Ok(Place::Binding {
          scope,
          name: name.clone(),
          path: Vec::new(),
        })
      }
      Expr::This => {
        let scope = self
          .scope
          .resolve("this")
          .ok_or_else(|| Error::name("Undefined variable 'this'."))?;
        Ok(Place::Binding {
          scope,
          name: String::from("this"),
          path: Vec::new(),
        })
      }
      Expr::Grouping(inner) => self.resolve_place(inner),
      Expr::Deref(inner) => {
        let value = self.eval(inner)?;
        match value {
          Value::Pointer(p) => Ok(Place::Binding {
            scope: p.scope,
            name: p.name,
            path: Vec::new(),
          }),
          _ => Err(Error::ty("Can only dereference pointers.").into()),
        }
      }
      Expr::Get(g) => {
        let place = self.resolve_place(&g.obj)?;
        let current = self.read_place(&place)?;
        match current {
          // An instance reached along the way re-roots the place in
          // the heap; everything behind the handle is shared.
          Value::Instance(r) => Ok(Place::Object {
            addr: r.addr,
            path: vec![g.name.clone()],
          }),
          Value::Struct(_) => Ok(match place {
            Place::Binding {
              scope,
              name,
              mut path,
            } => {
              path.push(g.name.clone());
              Place::Binding { scope, name, path }
            }
            Place::Object { addr, mut path } => {
              path.push(g.name.clone());
              Place::Object { addr, path }
            }
          }),
          _ => Err(Error::ty("Only structs and class instances have properties.").into()),
        }
      }
      // Any other expression can still denote an instance (a call
      // returning a class reference, say); writes through it are
      // visible. A struct temporary is not a place.
      other => {
        let value = self.eval(other)?;
        match value {
          Value::Instance(r) => Ok(Place::Object {
            addr: r.addr,
            path: Vec::new(),
          }),
          _ => Err(Error::ty("Invalid assignment target.").into()),
        }
      }
    }
  }

  fn read_place(&mut self, place: &Place) -> Result<Value, Control> {
    match place {
      Place::Binding { scope, name, path } => {
        let mut value = scope.get_local(name)?;
        for seg in path {
          value = self.field_of(value, seg)?;
        }
        Ok(value)
      }
      Place::Object { addr, path } => {
        let payload = self.shared.heap.dereference(*addr)?;
        if path.is_empty() {
          return Ok(Value::Instance(ClassRef {
            addr: *addr,
            type_name: payload.type_name,
          }));
        }
        let mut value = match payload.fields.get(&path[0]) {
          Some(value) => value.clone(),
          None => return Err(Error::name(format!("Undefined property '{}'.", path[0])).into()),
        };
        for seg in &path[1..] {
          value = self.field_of(value, seg)?;
        }
        Ok(value)
      }
    }
  }

  fn field_of(&mut self, value: Value, name: &str) -> Result<Value, Control> {
    match value {
      Value::Struct(s) => match s.fields.get(name) {
        Some(value) => Ok(value.clone()),
        None => Err(Error::name(format!("Undefined property '{name}'.")).into()),
      },
      Value::Instance(r) => Ok(self.shared.heap.read_field(r.addr, name)?),
      _ => Err(Error::ty("Only structs and class instances have properties.").into()),
    }
  }

  fn write_place(&mut self, place: Place, field: &str, value: &Value) -> Result<(), Control> {
    let container = self.read_place(&place)?;
    let heap = &self.shared.heap;
    match container {
      Value::Instance(r) => {
        let stored = value.copy();
        stored.retain(heap)?;
        let mut cell = Some(stored);
        let result = heap.update(r.addr, |payload| {
          match payload.fields.get_mut(field) {
            Some(slot) => Ok(mem::replace(
              slot,
              cell.take().expect("field write consumed twice"),
            )),
            None => Err(Error::name(format!("Undefined property '{field}'."))),
          }
        });
        finish_write(heap, cell, result)
      }
      Value::Struct(_) => {
        let stored = value.copy();
        stored.retain(heap)?;
        let mut cell = Some(stored);
        let result = match place {
          Place::Binding { scope, name, path } => scope.update(&name, |slot, mutable| {
            if !mutable {
              return Err(Error::immutable(format!(
                "Cannot assign to immutable variable '{name}'."
              )));
            }
            let container = navigate(slot, &path)?;
            swap_field(container, field, &mut cell)
          }),
          Place::Object { addr, path } => heap.update(addr, |payload| {
            let Some((first, rest)) = path.split_first() else {
              return Err(Error::ty(
                "Only structs and class instances have properties.",
              ));
            };
            let root = payload
              .fields
              .get_mut(first)
              .ok_or_else(|| Error::name(format!("Undefined property '{first}'.")))?;
            let container = navigate(root, rest)?;
            swap_field(container, field, &mut cell)
          }),
        };
        finish_write(heap, cell, result)
      }
      _ => Err(Error::ty("Only structs and class instances have properties.").into()),
    }
  }
}

/// Release the evicted occupant on success; on failure, release the
/// never-stored duplicate so counts stay balanced.
fn finish_write(
  heap: &Heap,
  cell: Option<Value>,
  result: Result<Value, Error>,
) -> Result<(), Control> {
  match result {
    Ok(old) => {
      old.release(heap)?;
      Ok(())
    }
    Err(e) => {
      if let Some(stored) = cell {
        stored.release(heap)?;
      }
      Err(e.into())
    }
  }
}

fn swap_field(
  container: &mut Value,
  field: &str,
  stored: &mut Option<Value>,
) -> Result<Value, Error> {
  match container {
    Value::Struct(s) => match s.fields.get_mut(field) {
      Some(slot) => Ok(mem::replace(
        slot,
        stored.take().expect("field write consumed twice"),
      )),
      None => Err(Error::name(format!("Undefined property '{field}'."))),
    },
    _ => Err(Error::ty(
      "Only structs and class instances have properties.",
    )),
  }
}

fn navigate<'a>(slot: &'a mut Value, path: &[String]) -> Result<&'a mut Value, Error> {
  let Some((first, rest)) = path.split_first() else {
    return Ok(slot);
  };
  match slot {
    Value::Struct(s) => {
      let next = s
        .fields
        .get_mut(first)
        .ok_or_else(|| Error::name(format!("Undefined property '{first}'.")))?;
      navigate(next, rest)
    }
    _ => Err(Error::ty(
      "Only structs and class instances have properties.",
    )),
  }
}
