use super::*;

impl Interp {
  pub(super) fn eval_call(&mut self, c: &ast::Call) -> Result<Value, Control> {
    // `obj.name(args)` goes through method resolution, not through a
    // plain field read.
    if let Expr::Get(g) = &c.callee {
      return self.call_attr(g, &c.args);
    }
    let callee = self.eval(&c.callee)?;
    let args = self.eval_args(&c.args)?;
    self.call_value(callee, args)
  }

  fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, Control> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
      out.push(self.eval(arg)?);
    }
    Ok(out)
  }

  fn call_value(&mut self, callee: Value, args: Vec<Value>) -> Result<Value, Control> {
    match callee {
      Value::Func(f) => self.call_function(&f, args),
      Value::Native(n) => self.call_native(&n, args),
      _ => Err(Error::ty("Can only call functions.").into()),
    }
  }

  /// Method resolution for `obj.name(args)`:
  /// 1. a callable field named `name` on `obj` wins,
  /// 2. otherwise the method table for `obj`'s type, with `this`
  ///    bound to a copy of `obj`,
  /// 3. otherwise the method is undefined.
  fn call_attr(&mut self, g: &ast::Get, args: &[Expr]) -> Result<Value, Control> {
    let obj = self.eval(&g.obj)?;

    let field = match &obj {
      Value::Struct(s) => s.fields.get(&g.name).cloned(),
      Value::Instance(r) => self
        .shared
        .heap
        .dereference(r.addr)?
        .fields
        .get(&g.name)
        .cloned(),
      _ => None,
    };
    if let Some(callable @ (Value::Func(_) | Value::Native(_))) = field {
      let args = self.eval_args(args)?;
      return self.call_value(callable, args);
    }

    let type_name = obj.type_tag().to_owned();
    let method = self
      .shared
      .methods
      .get(&type_name)
      .and_then(|table| table.get(&g.name).cloned());
    match method {
      Some(def) => {
        let args = self.eval_args(args)?;
        self.call_method(&def, &obj, args)
      }
      None => Err(
        Error::name(format!(
          "Method '{}' not defined for type '{}'.",
          g.name, type_name
        ))
        .into(),
      ),
    }
  }

  /// Call a function value: arguments bind into a fresh scope whose
  /// parent is the closure's captured scope.
  pub(crate) fn call_function(&mut self, f: &FuncValue, args: Vec<Value>) -> Result<Value, Control> {
    if args.len() != f.def.params.len() {
      return Err(Error::ty(format!("Lambda expects {} args.", f.def.params.len())).into());
    }
    let scope = Scope::child(&f.scope);
    for (param, arg) in f.def.params.iter().zip(&args) {
      scope.define(&self.shared.heap, param.clone(), arg, true)?;
    }
    self.run_body(&f.def.body, scope)
  }

  /// Call a method out of the method table: `this` and the parameters
  /// bind into a fresh scope parented to the current evaluator scope.
  fn call_method(
    &mut self,
    def: &Arc<ast::FuncDef>,
    this: &Value,
    args: Vec<Value>,
  ) -> Result<Value, Control> {
    if args.len() != def.params.len() {
      return Err(Error::ty(format!("Method expects {} args.", def.params.len())).into());
    }
    let scope = Scope::child(&self.scope);
    scope.define(&self.shared.heap, "this", this, true)?;
    for (param, arg) in def.params.iter().zip(&args) {
      scope.define(&self.shared.heap, param.clone(), arg, true)?;
    }
    self.run_body(&def.body, scope)
  }

  fn call_native(&mut self, native: &NativeFn, args: Vec<Value>) -> Result<Value, Control> {
    if args.len() != native.arity {
      return Err(
        Error::ty(format!(
          "Function '{}' expects {} args.",
          native.name, native.arity
        ))
        .into(),
      );
    }
    let result = (native.call)(self, args)?;
    // Same contract as a user call: the result is parked in the pool
    // until the statement completes.
    result.retain(&self.shared.heap)?;
    self.temps.push(result.clone());
    Ok(result)
  }

  /// Run a call body against `scope`, consuming the nearest `return`.
  ///
  /// The result is retained before the frame is torn down (a `return`
  /// already parked one count for it in this frame's pool) and handed
  /// to the caller through its pool, so returning the only handle to
  /// an instance can never dangle.
  fn run_body(&mut self, body: &[Stmt], scope: ScopeRef) -> Result<Value, Control> {
    let floor = mem::replace(&mut self.floor, self.temps.len());
    let prev = mem::replace(&mut self.scope, scope);

    let mut outcome: Result<Value, Control> = Ok(Value::Null);
    for stmt in body {
      match self.execute(stmt) {
        Ok(()) => {
          if let Err(e) = self.drain() {
            outcome = Err(e.into());
            break;
          }
        }
        Err(Control::Return(value)) => {
          outcome = Ok(value);
          break;
        }
        Err(c) => {
          outcome = Err(c);
          break;
        }
      }
    }

    let scope = mem::replace(&mut self.scope, prev);
    let retained = match &outcome {
      Ok(result) => result.retain(&self.shared.heap),
      Err(_) => Ok(()),
    };
    if let Err(e) = retained {
      outcome = Err(e.into());
    }
    if let Err(e) = scope.destroy(&self.shared.heap) {
      if outcome.is_ok() {
        outcome = Err(e.into());
      }
    }
    if let Err(e) = self.drain() {
      if outcome.is_ok() {
        outcome = Err(e.into());
      }
    }
    self.floor = floor;

    let result = outcome?;
    self.temps.push(result.clone());
    Ok(result)
  }
}
