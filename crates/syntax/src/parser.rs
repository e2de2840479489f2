#![deny(unused_must_use)]

use crate::lexer::TokenKind::*;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::{ast, Error, Result};

/// Parse a full program into a statement list.
///
/// Errors do not stop the parse: the parser reports the offending
/// token, skips to the next statement boundary and resumes, so a
/// single pass surfaces every diagnostic. Lexer errors are folded
/// into the same list.
pub fn parse(src: &str) -> Result<Vec<ast::Stmt>, Vec<Error>> {
  let lexer = Lexer::lex(src);
  let parser = Parser::new(lexer);
  parser.program()
}

struct Parser<'src> {
  lex: Lexer<'src>,
  pos: usize,
  errors: Vec<Error>,
}

impl<'src> Parser<'src> {
  fn new(mut lex: Lexer<'src>) -> Self {
    let errors = lex.take_errors();
    Self {
      lex,
      pos: 0,
      errors,
    }
  }

  fn program(mut self) -> Result<Vec<ast::Stmt>, Vec<Error>> {
    let mut body = Vec::new();
    while !self.current().is(Tok_Eof) {
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
    if self.errors.is_empty() {
      Ok(body)
    } else {
      Err(self.errors)
    }
  }

  #[inline]
  fn current(&self) -> &Token {
    // The buffer always ends with `Tok_Eof`.
    &self.lex.tokens()[self.pos.min(self.lex.tokens().len() - 1)]
  }

  #[inline]
  fn previous(&self) -> &Token {
    &self.lex.tokens()[self.pos.saturating_sub(1)]
  }

  /// Token kind `n` positions ahead of the cursor, saturating at EOF.
  #[inline]
  fn peek(&self, n: usize) -> TokenKind {
    let tokens = self.lex.tokens();
    let at = (self.pos + n).min(tokens.len() - 1);
    tokens[at].kind
  }

  /// Move forward by one token, returning the previous one.
  #[inline]
  fn bump(&mut self) -> &Token {
    if self.pos < self.lex.tokens().len() - 1 {
      self.pos += 1;
    }
    self.previous()
  }

  #[inline]
  fn bump_if(&mut self, kind: TokenKind) -> bool {
    if self.current().is(kind) {
      self.bump();
      true
    } else {
      false
    }
  }

  #[inline]
  fn expect(&mut self, kind: TokenKind) -> Result<()> {
    if self.bump_if(kind) {
      Ok(())
    } else {
      let current = self.current();
      Err(Error::new(
        format!(
          "expected `{}`, found `{}`",
          kind.name(),
          current.kind.name()
        ),
        current.line,
      ))
    }
  }

  fn ident(&mut self) -> Result<String> {
    if self.current().is(Lit_Ident) {
      let span = self.current().span;
      self.bump();
      Ok(self.lex.src()[span.range()].to_owned())
    } else {
      let current = self.current();
      Err(Error::new(
        format!("expected identifier, found `{}`", current.kind.name()),
        current.line,
      ))
    }
  }

  /// Consume a statement terminator. A dedent or the end of input
  /// counts but is left for the enclosing block to consume.
  fn terminator(&mut self) -> Result<()> {
    if self.bump_if(Tok_Newline) {
      return Ok(());
    }
    if self.current().is(Tok_Eof) || self.current().is(Tok_Dedent) {
      return Ok(());
    }
    let current = self.current();
    Err(Error::new(
      format!("expected end of statement, found `{}`", current.kind.name()),
      current.line,
    ))
  }

  /// Skip to the next statement boundary after an error.
  fn sync(&mut self) {
    self.bump();
    while !self.current().is(Tok_Eof) {
      match self.current().kind {
        Tok_Newline => {
          self.bump();
          return;
        }
        // Leave block closing to the enclosing block parser.
        Tok_Dedent => return,
        // Break on keywords that begin statements.
        Kw_Let | Kw_Type | Kw_Impl | Kw_Import | Kw_Delete | Kw_Fun | Kw_If | Kw_While
        | Kw_Print | Kw_Return => return,
        _ => {
          self.bump();
        }
      }
    }
  }
}

mod expr;
mod stmt;

// On average, a single parse_XXX() method consumes between 10 and 700
// bytes of stack space. Assuming ~50 recursive calls per dive and 700
// bytes of stack space per call, we'll require 50 * 700 = 35k bytes of
// stack space in order to dive. For future proofing, we round this
// value up to 64k bytes.
#[cfg(feature = "check-recursion-limit")]
const MINIMUM_STACK_REQUIRED: usize = 64_000;

#[cfg(feature = "check-recursion-limit")]
fn check_recursion_limit(line: u32) -> Result<()> {
  if stacker::remaining_stack()
    .map(|available| available > MINIMUM_STACK_REQUIRED)
    .unwrap_or(true)
  {
    Ok(())
  } else {
    Err(Error::new("nesting limit reached", line))
  }
}

#[cfg(not(feature = "check-recursion-limit"))]
fn check_recursion_limit(_line: u32) -> Result<()> {
  Ok(())
}
