use std::sync::Arc;

use super::*;

impl<'src> Parser<'src> {
  pub(super) fn decl(&mut self) -> Result<ast::Stmt> {
    check_recursion_limit(self.current().line)?;
    match self.current().kind {
      Kw_Let => self.let_decl(),
      Kw_Type => self.type_decl(),
      Kw_Impl => self.impl_decl(),
      Kw_Import => self.import_decl(),
      Kw_Delete => self.delete_stmt(),
      Lit_Ident if self.at_func_decl() => self.func_decl(),
      _ => self.stmt(),
    }
  }

  fn stmt(&mut self) -> Result<ast::Stmt> {
    match self.current().kind {
      Kw_If => self.if_stmt(),
      Kw_While => self.while_stmt(),
      Kw_Print => self.print_stmt(),
      Kw_Return => self.return_stmt(),
      Tok_Indent => {
        self.bump();
        let body = self.block()?;
        Ok(ast::Stmt::Block(body))
      }
      _ => self.expr_stmt(),
    }
  }

  /// Statements up to the matching dedent. The caller has consumed
  /// the indent.
  pub(super) fn block(&mut self) -> Result<Vec<ast::Stmt>> {
    let mut body = Vec::new();
    while !self.current().is(Tok_Dedent) && !self.current().is(Tok_Eof) {
      if self.bump_if(Tok_Newline) {
        continue;
      }
      match self.decl() {
        Ok(stmt) => body.push(stmt),
        Err(e) => {
          self.errors.push(e);
          self.sync();
        }
      }
    }
    self.bump_if(Tok_Dedent);
    Ok(body)
  }

  fn let_decl(&mut self) -> Result<ast::Stmt> {
    self.expect(Kw_Let)?;
    let mutable = self.bump_if(Kw_Mutable);
    let name = self.ident()?;
    self.expect(Op_Equal)?;
    let init = self.expr()?;
    self.terminator()?;
    Ok(ast::let_stmt(name, init, mutable))
  }

  fn type_decl(&mut self) -> Result<ast::Stmt> {
    self.expect(Kw_Type)?;
    let name = self.ident()?;
    self.expect(Op_Equal)?;
    let kind = if self.bump_if(Kw_Struct) {
      ast::TypeKind::Struct
    } else if self.bump_if(Kw_Class) {
      ast::TypeKind::Class
    } else {
      let current = self.current();
      return Err(Error::new(
        format!(
          "expected `struct` or `class`, found `{}`",
          current.kind.name()
        ),
        current.line,
      ));
    };
    self.expect(Brk_CurlyL)?;
    let mut fields = Vec::new();
    loop {
      self.skip_structural();
      if self.current().is(Brk_CurlyR) || self.current().is(Tok_Eof) {
        break;
      }
      let field = self.ident()?;
      self.expect(Tok_Colon)?;
      self.ident()?; // field type annotation, surface syntax only
      fields.push(field);
      if !self.bump_if(Tok_Comma) {
        self.bump_if(Tok_Semicolon);
      }
    }
    self.expect(Brk_CurlyR)?;
    self.terminator()?;
    Ok(ast::type_decl_stmt(name, kind, fields))
  }

  fn impl_decl(&mut self) -> Result<ast::Stmt> {
    self.expect(Kw_Impl)?;
    let type_name = self.ident()?;
    self.expect(Tok_Colon)?;
    self.expect(Tok_Newline)?;
    self.expect(Tok_Indent)?;
    let mut methods = Vec::new();
    loop {
      if self.bump_if(Tok_Newline) {
        continue;
      }
      if !self.bump_if(Kw_Fun) {
        break;
      }
      let name = self.ident()?;
      let def = self.func_def(Some(name))?;
      methods.push(def);
    }
    if methods.is_empty() {
      let current = self.current();
      return Err(Error::new(
        format!("expected `fun`, found `{}`", current.kind.name()),
        current.line,
      ));
    }
    if !self.current().is(Tok_Eof) {
      self.expect(Tok_Dedent)?;
    }
    Ok(ast::impl_stmt(type_name, methods))
  }

  /// Statement-initial `IDENT ( params ) : NEWLINE` introduces a
  /// function declaration; anything else falls through to an
  /// expression statement. Decided by scanning ahead without
  /// consuming tokens.
  fn at_func_decl(&self) -> bool {
    if !matches!(self.peek(0), Lit_Ident) || !matches!(self.peek(1), Brk_ParenL) {
      return false;
    }
    let mut i = 2;
    if matches!(self.peek(i), Lit_Ident) {
      i += 1;
      while matches!(self.peek(i), Tok_Comma) && matches!(self.peek(i + 1), Lit_Ident) {
        i += 2;
      }
    }
    matches!(self.peek(i), Brk_ParenR)
      && matches!(self.peek(i + 1), Tok_Colon)
      && matches!(self.peek(i + 2), Tok_Newline)
  }

  fn func_decl(&mut self) -> Result<ast::Stmt> {
    let name = self.ident()?;
    let def = self.func_def(Some(name))?;
    Ok(ast::Stmt::Func(def))
  }

  /// `( params ) : NEWLINE INDENT block DEDENT`, shared by function
  /// declarations, methods and lambdas.
  pub(super) fn func_def(&mut self, name: Option<String>) -> Result<Arc<ast::FuncDef>> {
    self.expect(Brk_ParenL)?;
    let mut params = Vec::new();
    if !self.current().is(Brk_ParenR) {
      params.push(self.ident()?);
      while self.bump_if(Tok_Comma) {
        params.push(self.ident()?);
      }
    }
    self.expect(Brk_ParenR)?;
    self.expect(Tok_Colon)?;
    self.expect(Tok_Newline)?;
    self.expect(Tok_Indent)?;
    let body = self.block()?;
    Ok(Arc::new(ast::FuncDef { name, params, body }))
  }

  fn if_stmt(&mut self) -> Result<ast::Stmt> {
    self.expect(Kw_If)?;
    let cond = self.expr()?;
    self.expect(Tok_Colon)?;
    self.expect(Tok_Newline)?;
    let then = self.stmt()?;

    // The `else` arm sits after the dedent separator, possibly with
    // blank lines in between; only commit to skipping them when it is
    // actually there.
    let mut otherwise = None;
    let mut i = 0;
    while matches!(self.peek(i), Tok_Newline) {
      i += 1;
    }
    if matches!(self.peek(i), Kw_Else) {
      for _ in 0..=i {
        self.bump();
      }
      self.expect(Tok_Colon)?;
      self.expect(Tok_Newline)?;
      otherwise = Some(self.stmt()?);
    }

    Ok(ast::if_stmt(cond, then, otherwise))
  }

  fn while_stmt(&mut self) -> Result<ast::Stmt> {
    self.expect(Kw_While)?;
    let cond = self.expr()?;
    self.expect(Tok_Colon)?;
    self.expect(Tok_Newline)?;
    let body = self.stmt()?;
    Ok(ast::while_stmt(cond, body))
  }

  fn print_stmt(&mut self) -> Result<ast::Stmt> {
    self.expect(Kw_Print)?;
    let value = self.expr()?;
    self.terminator()?;
    Ok(ast::print_stmt(value))
  }

  fn return_stmt(&mut self) -> Result<ast::Stmt> {
    self.expect(Kw_Return)?;
    let value = match self.current().kind {
      Tok_Newline | Tok_Dedent | Tok_Eof => None,
      _ => Some(self.expr()?),
    };
    self.terminator()?;
    Ok(ast::return_stmt(value))
  }

  fn import_decl(&mut self) -> Result<ast::Stmt> {
    self.expect(Kw_Import)?;
    let path = self.string()?;
    self.expect(Kw_As)?;
    let alias = self.ident()?;
    self.terminator()?;
    Ok(ast::import_stmt(path, alias))
  }

  fn delete_stmt(&mut self) -> Result<ast::Stmt> {
    self.expect(Kw_Delete)?;
    let name = self.ident()?;
    self.terminator()?;
    Ok(ast::Stmt::Delete(name))
  }

  fn expr_stmt(&mut self) -> Result<ast::Stmt> {
    let value = self.expr()?;
    self.terminator()?;
    Ok(ast::expr_stmt(value))
  }

  fn skip_structural(&mut self) {
    while matches!(self.current().kind, Tok_Newline | Tok_Indent | Tok_Dedent) {
      self.bump();
    }
  }
}
