use super::*;
use crate::ast::{BinaryOp, UnaryOp};

impl<'src> Parser<'src> {
  pub(super) fn expr(&mut self) -> Result<ast::Expr> {
    check_recursion_limit(self.current().line)?;
    self.assign_expr()
  }

  fn assign_expr(&mut self) -> Result<ast::Expr> {
    let target = self.eq_expr()?;
    if self.bump_if(Op_Equal) {
      let line = self.previous().line;
      let value = self.assign_expr()?;
      return match ast::assign(target, value) {
        Some(expr) => Ok(expr),
        None => Err(Error::new("Invalid assignment target.", line)),
      };
    }
    Ok(target)
  }

  fn eq_expr(&mut self) -> Result<ast::Expr> {
    let mut left = self.comp_expr()?;
    loop {
      let op = match self.current().kind {
        Op_EqualEqual => BinaryOp::Eq,
        Op_BangEqual => BinaryOp::Neq,
        _ => break,
      };
      self.bump(); // bump operator
      let right = self.comp_expr()?;
      left = ast::expr_binary(op, left, right);
    }
    Ok(left)
  }

  fn comp_expr(&mut self) -> Result<ast::Expr> {
    let mut left = self.add_expr()?;
    loop {
      let op = match self.current().kind {
        Op_Less => BinaryOp::Less,
        Op_LessEqual => BinaryOp::LessEq,
        Op_More => BinaryOp::More,
        Op_MoreEqual => BinaryOp::MoreEq,
        _ => break,
      };
      self.bump(); // bump operator
      let right = self.add_expr()?;
      left = ast::expr_binary(op, left, right);
    }
    Ok(left)
  }

  fn add_expr(&mut self) -> Result<ast::Expr> {
    let mut left = self.mul_expr()?;
    loop {
      let op = match self.current().kind {
        Op_Plus => BinaryOp::Add,
        Op_Minus => BinaryOp::Sub,
        _ => break,
      };
      self.bump(); // bump operator
      let right = self.mul_expr()?;
      left = ast::expr_binary(op, left, right);
    }
    Ok(left)
  }

  fn mul_expr(&mut self) -> Result<ast::Expr> {
    let mut left = self.unary_expr()?;
    loop {
      let op = match self.current().kind {
        Op_Star => BinaryOp::Mul,
        Op_Slash => BinaryOp::Div,
        _ => break,
      };
      self.bump(); // bump operator
      let right = self.unary_expr()?;
      left = ast::expr_binary(op, left, right);
    }
    Ok(left)
  }

  fn unary_expr(&mut self) -> Result<ast::Expr> {
    match self.current().kind {
      Op_Bang => {
        self.bump();
        let right = self.unary_expr()?;
        Ok(ast::expr_unary(UnaryOp::Not, right))
      }
      Op_Minus => {
        self.bump();
        let right = self.unary_expr()?;
        Ok(ast::expr_unary(UnaryOp::Neg, right))
      }
      // `*x` takes the address of a binding; only a bare identifier
      // is a valid operand.
      Op_Star => {
        self.bump();
        let name = self.ident()?;
        Ok(ast::Expr::AddressOf(name))
      }
      // `&p` reads through the pointer binding `p`, same as `p.*`.
      Op_Amp => {
        self.bump();
        let name = self.ident()?;
        Ok(ast::expr_deref(ast::Expr::Variable(name)))
      }
      _ => self.postfix_expr(),
    }
  }

  fn postfix_expr(&mut self) -> Result<ast::Expr> {
    let mut expr = self.primary_expr()?;
    loop {
      match self.current().kind {
        Brk_ParenL => {
          self.bump();
          let args = self.call_args()?;
          expr = ast::expr_call(expr, args);
        }
        Op_Dot => {
          self.bump();
          if self.bump_if(Op_Star) {
            expr = ast::expr_deref(expr);
          } else {
            let name = self.ident()?;
            expr = ast::expr_get(expr, name);
          }
        }
        _ => break,
      }
    }
    Ok(expr)
  }

  /// Arguments up to and including the closing paren. A closing paren
  /// may sit on its own line after a lambda-body dedent.
  fn call_args(&mut self) -> Result<Vec<ast::Expr>> {
    let mut args = Vec::new();
    self.newlines_before_paren_r();
    if !self.current().is(Brk_ParenR) {
      args.push(self.expr()?);
      self.newlines_before_paren_r();
      while self.bump_if(Tok_Comma) {
        args.push(self.expr()?);
        self.newlines_before_paren_r();
      }
    }
    self.expect(Brk_ParenR)?;
    Ok(args)
  }

  fn newlines_before_paren_r(&mut self) {
    let mut i = 0;
    while matches!(self.peek(i), Tok_Newline) {
      i += 1;
    }
    if i > 0 && matches!(self.peek(i), Brk_ParenR) {
      for _ in 0..i {
        self.bump();
      }
    }
  }

  fn primary_expr(&mut self) -> Result<ast::Expr> {
    match self.current().kind {
      Kw_This => {
        self.bump();
        Ok(ast::Expr::This)
      }
      Kw_New => {
        self.bump();
        let type_name = self.ident()?;
        self.expect(Brk_ParenL)?;
        let args = self.call_args()?;
        Ok(ast::expr_new(type_name, args))
      }
      Lit_Int => {
        let span = self.current().span;
        let line = self.current().line;
        self.bump();
        let lexeme = &self.lex.src()[span.range()];
        match lexeme.parse::<i32>() {
          Ok(value) => Ok(ast::Expr::Int(value)),
          Err(_) => Err(Error::new(
            format!("number literal `{lexeme}` out of range"),
            line,
          )),
        }
      }
      Lit_Str => {
        let span = self.current().span;
        self.bump();
        let lexeme = &self.lex.src()[span.range()];
        // Strip the quotes; escape sequences are kept verbatim.
        Ok(ast::Expr::Str(lexeme[1..lexeme.len() - 1].to_owned()))
      }
      Lit_Atom => {
        let span = self.current().span;
        self.bump();
        let lexeme = &self.lex.src()[span.range()];
        Ok(ast::Expr::Atom(lexeme[1..].to_owned()))
      }
      Lit_Ident => {
        let name = self.ident()?;
        Ok(ast::Expr::Variable(name))
      }
      Brk_ParenL => {
        self.bump();
        let inner = self.expr()?;
        self.expect(Brk_ParenR)?;
        Ok(ast::Expr::Grouping(Box::new(inner)))
      }
      Brk_SquareL => {
        if self.at_lambda() {
          self.lambda_expr()
        } else {
          self.list_expr()
        }
      }
      Brk_CurlyL => {
        self.bump();
        let mut elems = Vec::new();
        if !self.current().is(Brk_CurlyR) {
          elems.push(self.expr()?);
          while self.bump_if(Tok_Comma) {
            elems.push(self.expr()?);
          }
        }
        self.expect(Brk_CurlyR)?;
        Ok(ast::Expr::Tuple(elems))
      }
      Brk_Map => {
        self.bump();
        let mut entries = Vec::new();
        if !self.current().is(Brk_CurlyR) {
          entries.push(self.map_entry()?);
          while self.bump_if(Tok_Comma) {
            entries.push(self.map_entry()?);
          }
        }
        self.expect(Brk_CurlyR)?;
        Ok(ast::Expr::Map(entries))
      }
      kind => {
        let line = self.current().line;
        Err(Error::new(
          format!("unexpected token `{}`", kind.name()),
          line,
        ))
      }
    }
  }

  fn map_entry(&mut self) -> Result<(ast::Expr, ast::Expr)> {
    let key = self.expr()?;
    self.expect(Op_Arrow)?;
    let value = self.expr()?;
    Ok((key, value))
  }

  /// `[` opens a lambda iff a scan of `*?IDENT (, *?IDENT)*` is
  /// terminated by `] (`. Anything else is a list literal.
  fn at_lambda(&self) -> bool {
    debug_assert!(matches!(self.peek(0), Brk_SquareL));
    let mut i = 1;
    if !matches!(self.peek(i), Brk_SquareR) {
      loop {
        if matches!(self.peek(i), Op_Star) {
          i += 1;
        }
        if !matches!(self.peek(i), Lit_Ident) {
          return false;
        }
        i += 1;
        if matches!(self.peek(i), Tok_Comma) {
          i += 1;
          continue;
        }
        break;
      }
      if !matches!(self.peek(i), Brk_SquareR) {
        return false;
      }
    }
    matches!(self.peek(i + 1), Brk_ParenL)
  }

  fn lambda_expr(&mut self) -> Result<ast::Expr> {
    self.expect(Brk_SquareL)?;
    let mut captures = Vec::new();
    if !self.current().is(Brk_SquareR) {
      captures.push(self.capture()?);
      while self.bump_if(Tok_Comma) {
        captures.push(self.capture()?);
      }
    }
    self.expect(Brk_SquareR)?;
    let def = self.func_def(None)?;
    Ok(ast::expr_lambda(captures, def))
  }

  fn capture(&mut self) -> Result<ast::Capture> {
    if self.bump_if(Op_Star) {
      Ok(ast::Capture::Address(self.ident()?))
    } else {
      Ok(ast::Capture::Value(self.ident()?))
    }
  }

  fn list_expr(&mut self) -> Result<ast::Expr> {
    self.expect(Brk_SquareL)?;
    let mut elems = Vec::new();
    if !self.current().is(Brk_SquareR) {
      elems.push(self.expr()?);
      while self.bump_if(Tok_Comma) {
        elems.push(self.expr()?);
      }
    }
    self.expect(Brk_SquareR)?;
    Ok(ast::Expr::List(elems))
  }

  pub(super) fn string(&mut self) -> Result<String> {
    if self.current().is(Lit_Str) {
      let span = self.current().span;
      self.bump();
      let lexeme = &self.lex.src()[span.range()];
      Ok(lexeme[1..lexeme.len() - 1].to_owned())
    } else {
      let current = self.current();
      Err(Error::new(
        format!("expected string, found `{}`", current.kind.name()),
        current.line,
      ))
    }
  }
}
