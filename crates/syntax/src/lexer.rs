#![allow(non_camel_case_types)]

use std::borrow::Borrow;
use std::fmt;
use std::mem::discriminant;
use std::ops::Range;

use logos::Logos;
use span::Span;

use crate::Error;

#[derive(Clone, Debug)]
pub struct Token {
  pub kind: TokenKind,
  pub span: Span,
  pub line: u32,
}

impl Token {
  pub fn is(&self, kind: impl Borrow<TokenKind>) -> bool {
    discriminant(&self.kind) == discriminant(kind.borrow())
  }
}

/// Token buffer over a source string.
///
/// The raw scan comes from `logos`; a second pass measures the
/// indentation at the start of every line and synthesizes the
/// structural `Tok_Newline`, `Tok_Indent` and `Tok_Dedent` tokens the
/// grammar is written in terms of. Blank lines and comment-only lines
/// produce no structural tokens. The buffer always ends with a single
/// `Tok_Eof`.
pub struct Lexer<'src> {
  src: &'src str,
  tokens: Vec<Token>,
  errors: Vec<Error>,
}

impl<'src> Lexer<'src> {
  pub fn lex(src: &'src str) -> Self {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    // Indentation levels currently open. Level 0 is never popped.
    let mut levels: Vec<u32> = vec![0];
    let mut line: u32 = 1;
    // Set after a line break (or at position 0 for a leading-whitespace
    // first line): the width of the upcoming line's indentation, the
    // line the previous statement ended on, and whether a statement
    // separator is owed for that line.
    let mut pending: Option<LineStart> = None;
    let mut at_start = true;

    let mut inner = logos::Lexer::<TokenKind>::new(src);
    while let Some(kind) = inner.next() {
      let lexeme = inner.slice();
      let span: Span = inner.span().into();

      match kind {
        TokenKind::_Indent => {
          let sep_line = pending.map(|p| p.sep_line).unwrap_or(line);
          let terminated = pending.map(|p| p.terminated).unwrap_or(!tokens.is_empty());
          line += count_newlines(lexeme);
          pending = Some(LineStart {
            width: measure_indent(trailing_segment(lexeme)),
            sep_line,
            terminated,
          });
          at_start = false;
        }
        TokenKind::_Whitespace => {
          if at_start {
            // Indentation of the very first line in the file.
            pending = Some(LineStart {
              width: measure_indent(lexeme),
              sep_line: line,
              terminated: false,
            });
            at_start = false;
          }
        }
        TokenKind::_Comment => {
          at_start = false;
        }
        TokenKind::Tok_Error => {
          let message = if lexeme.starts_with('"') {
            String::from("unterminated string")
          } else {
            format!("unexpected character `{}`", lexeme.escape_default())
          };
          errors.push(Error::new(message, line));
          line += count_newlines(lexeme);
          at_start = false;
        }
        _ => {
          if let Some(start) = pending.take() {
            balance(&mut tokens, &mut errors, &mut levels, start, line, span.start);
          }
          at_start = false;
          let token_line = line;
          line += count_newlines(lexeme);
          tokens.push(Token {
            kind,
            span,
            line: token_line,
          });
        }
      }
    }

    let end = src.len();
    if let Some(start) = pending.take() {
      if start.terminated {
        tokens.push(Token {
          kind: TokenKind::Tok_Newline,
          span: Span::empty(end),
          line: start.sep_line,
        });
      }
    }
    while *levels.last().unwrap() > 0 {
      levels.pop();
      tokens.push(Token {
        kind: TokenKind::Tok_Dedent,
        span: Span::empty(end),
        line,
      });
    }
    tokens.push(Token {
      kind: TokenKind::Tok_Eof,
      span: Span::empty(end),
      line,
    });

    Lexer {
      src,
      tokens,
      errors,
    }
  }

  #[inline]
  pub fn src(&self) -> &'src str {
    self.src
  }

  #[inline]
  pub fn tokens(&self) -> &[Token] {
    &self.tokens
  }

  /// Errors encountered while scanning. Scanning continues past them,
  /// so the token buffer is always fully populated.
  pub fn take_errors(&mut self) -> Vec<Error> {
    std::mem::take(&mut self.errors)
  }

  #[inline]
  pub fn lexeme(&self, token: &Token) -> &'src str {
    &self.src[Range::from(token.span)]
  }
}

#[derive(Clone, Copy)]
struct LineStart {
  width: u32,
  sep_line: u32,
  terminated: bool,
}

/// Compare the indentation of a fresh line against the open levels and
/// synthesize the structural tokens for it.
fn balance(
  tokens: &mut Vec<Token>,
  errors: &mut Vec<Error>,
  levels: &mut Vec<u32>,
  start: LineStart,
  line: u32,
  pos: usize,
) {
  let span = Span::empty(pos);
  if start.terminated {
    tokens.push(Token {
      kind: TokenKind::Tok_Newline,
      span,
      line: start.sep_line,
    });
  }

  let top = *levels.last().unwrap();
  if start.width > top {
    levels.push(start.width);
    tokens.push(Token {
      kind: TokenKind::Tok_Indent,
      span,
      line,
    });
  } else if start.width < top {
    while *levels.last().unwrap() > start.width {
      levels.pop();
      tokens.push(Token {
        kind: TokenKind::Tok_Dedent,
        span,
        line,
      });
    }
    tokens.push(Token {
      kind: TokenKind::Tok_Newline,
      span,
      line,
    });
    if *levels.last().unwrap() != start.width {
      errors.push(Error::new("inconsistent indentation", line));
    }
  }
}

fn count_newlines(s: &str) -> u32 {
  s.bytes().filter(|b| *b == b'\n').count() as u32
}

fn trailing_segment(s: &str) -> &str {
  match s.rfind('\n') {
    Some(pos) => &s[pos + 1..],
    None => s,
  }
}

/// A tab counts as four spaces; a stray carriage return has no width.
fn measure_indent(s: &str) -> u32 {
  s.bytes()
    .map(|b| match b {
      b'\t' => 4,
      b'\r' => 0,
      _ => 1,
    })
    .sum()
}

// When adding a token matched with a `token` directive, also add it to
// `TokenKind::name` below.
#[derive(Clone, Copy, Debug, Logos, PartialEq)]
pub enum TokenKind {
  // Keywords
  #[token("let")]
  Kw_Let,
  #[token("mutable")]
  Kw_Mutable,
  #[token("type")]
  Kw_Type,
  #[token("struct")]
  Kw_Struct,
  #[token("class")]
  Kw_Class,
  #[token("new")]
  Kw_New,
  #[token("delete")]
  Kw_Delete,
  #[token("if")]
  Kw_If,
  #[token("then")]
  Kw_Then,
  #[token("else")]
  Kw_Else,
  #[token("print")]
  Kw_Print,
  #[token("impl")]
  Kw_Impl,
  #[token("fun")]
  Kw_Fun,
  #[token("return")]
  Kw_Return,
  #[token("this")]
  Kw_This,
  #[token("while")]
  Kw_While,
  #[token("import")]
  Kw_Import,
  #[token("as")]
  Kw_As,

  // Brackets
  #[token("(")]
  Brk_ParenL,
  #[token(")")]
  Brk_ParenR,
  #[token("[")]
  Brk_SquareL,
  #[token("]")]
  Brk_SquareR,
  #[token("{")]
  Brk_CurlyL,
  #[token("}")]
  Brk_CurlyR,
  /// `#{`, opens a map literal
  #[token("#{")]
  Brk_Map,

  // Misc characters
  #[token(".")]
  Op_Dot,
  #[token(",")]
  Tok_Comma,
  #[token(";")]
  Tok_Semicolon,
  #[token(":")]
  Tok_Colon,
  /// `=>`, the map arrow
  #[token("=>")]
  Op_Arrow,

  // Operators
  #[token("=")]
  Op_Equal,
  #[token("==")]
  Op_EqualEqual,
  #[token("!=")]
  Op_BangEqual,
  #[token("<")]
  Op_Less,
  #[token("<=")]
  Op_LessEqual,
  #[token(">")]
  Op_More,
  #[token(">=")]
  Op_MoreEqual,
  #[token("+")]
  Op_Plus,
  #[token("-")]
  Op_Minus,
  #[token("*")]
  Op_Star,
  #[token("/")]
  Op_Slash,
  #[token("!")]
  Op_Bang,
  #[token("&")]
  Op_Amp,

  // Literals
  /// `0`, `42`, etc.
  #[regex(r"[0-9]+")]
  Lit_Int,
  /// `"..."`; no escape processing at lex time, newlines allowed
  #[regex(r#""[^"]*""#)]
  Lit_Str,
  /// `@ok`, `@error`, etc.
  #[regex(r"@[a-zA-Z_][a-zA-Z0-9_]*")]
  Lit_Atom,
  /// `a`, `b_c`, `__x0`, etc.
  #[regex("[a-zA-Z_][a-zA-Z0-9_]*")]
  Lit_Ident,

  #[doc(hidden)]
  #[regex(r"(\r?\n[ \t]*)+", priority = 10)]
  _Indent,
  #[doc(hidden)]
  #[regex(r"[ \t\r]+")]
  _Whitespace,
  #[doc(hidden)]
  #[regex(r"//[^\n]*")]
  _Comment,

  #[error]
  Tok_Error,

  // Synthesized by the indentation pass
  Tok_Newline,
  Tok_Indent,
  Tok_Dedent,
  Tok_Eof,
}

impl TokenKind {
  pub fn name(&self) -> &'static str {
    use TokenKind::*;
    match self {
      Kw_Let => "let",
      Kw_Mutable => "mutable",
      Kw_Type => "type",
      Kw_Struct => "struct",
      Kw_Class => "class",
      Kw_New => "new",
      Kw_Delete => "delete",
      Kw_If => "if",
      Kw_Then => "then",
      Kw_Else => "else",
      Kw_Print => "print",
      Kw_Impl => "impl",
      Kw_Fun => "fun",
      Kw_Return => "return",
      Kw_This => "this",
      Kw_While => "while",
      Kw_Import => "import",
      Kw_As => "as",
      Brk_ParenL => "(",
      Brk_ParenR => ")",
      Brk_SquareL => "[",
      Brk_SquareR => "]",
      Brk_CurlyL => "{",
      Brk_CurlyR => "}",
      Brk_Map => "#{",
      Op_Dot => ".",
      Tok_Comma => ",",
      Tok_Semicolon => ";",
      Tok_Colon => ":",
      Op_Arrow => "=>",
      Op_Equal => "=",
      Op_EqualEqual => "==",
      Op_BangEqual => "!=",
      Op_Less => "<",
      Op_LessEqual => "<=",
      Op_More => ">",
      Op_MoreEqual => ">=",
      Op_Plus => "+",
      Op_Minus => "-",
      Op_Star => "*",
      Op_Slash => "/",
      Op_Bang => "!",
      Op_Amp => "&",
      Lit_Int => "int",
      Lit_Str => "string",
      Lit_Atom => "atom",
      Lit_Ident => "identifier",
      _Indent | _Whitespace | _Comment => "whitespace",
      Tok_Error => "error",
      Tok_Newline => "newline",
      Tok_Indent => "indent",
      Tok_Dedent => "dedent",
      Tok_Eof => "eof",
    }
  }
}

pub struct DebugToken<'a>(pub &'a Token, pub &'a str);

impl<'a> fmt::Debug for DebugToken<'a> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let kind = self.0.kind;
    let line = self.0.line;
    let lexeme = self.1;
    match kind {
      TokenKind::Lit_Ident | TokenKind::Lit_Int | TokenKind::Lit_Atom => {
        write!(f, "({kind:?} `{lexeme}` L{line})")
      }
      _ => write!(f, "({kind:?} L{line})"),
    }
  }
}

impl<'src> fmt::Debug for Lexer<'src> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list()
      .entries(self.tokens.iter().map(|t| DebugToken(t, self.lexeme(t))))
      .finish()
  }
}

#[cfg(test)]
mod tests;
