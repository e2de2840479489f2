use indoc::indoc;

use super::TokenKind::*;
use super::*;

fn kinds(src: &str) -> Vec<TokenKind> {
  let mut lexer = Lexer::lex(src);
  let errors = lexer.take_errors();
  assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
  lexer.tokens().iter().map(|t| t.kind).collect()
}

#[test]
fn block_boundaries() {
  let src = indoc! {r#"
    if x:
        print 1
    print 2
  "#};
  assert_eq!(
    kinds(src),
    [
      Kw_If,
      Lit_Ident,
      Tok_Colon,
      Tok_Newline,
      Tok_Indent,
      Kw_Print,
      Lit_Int,
      Tok_Newline,
      Tok_Dedent,
      Tok_Newline,
      Kw_Print,
      Lit_Int,
      Tok_Newline,
      Tok_Eof,
    ]
  );
}

#[test]
fn nested_blocks_balance() {
  let src = indoc! {r#"
    while a:
        while b:
            print 1
        print 2
    print 3
  "#};
  let kinds = kinds(src);
  let indents = kinds.iter().filter(|k| matches!(k, Tok_Indent)).count();
  let dedents = kinds.iter().filter(|k| matches!(k, Tok_Dedent)).count();
  assert_eq!(indents, 2);
  assert_eq!(dedents, 2);
}

#[test]
fn dedent_through_two_levels() {
  let src = indoc! {r#"
    if a:
        if b:
            print 1
    print 2
  "#};
  let kinds = kinds(src);
  // Both levels close at once: DEDENT DEDENT then a single separator.
  let tail = &kinds[kinds.len() - 7..];
  assert_eq!(
    tail,
    [
      Tok_Dedent,
      Tok_Dedent,
      Tok_Newline,
      Kw_Print,
      Lit_Int,
      Tok_Newline,
      Tok_Eof
    ]
  );
}

#[test]
fn blank_and_comment_lines_are_transparent() {
  let src = indoc! {r#"
    let a = 1

    // comment
    let b = 2
  "#};
  assert_eq!(
    kinds(src),
    [
      Kw_Let,
      Lit_Ident,
      Op_Equal,
      Lit_Int,
      Tok_Newline,
      Kw_Let,
      Lit_Ident,
      Op_Equal,
      Lit_Int,
      Tok_Newline,
      Tok_Eof,
    ]
  );
}

#[test]
fn indented_comment_does_not_open_a_block() {
  let src = "let a = 1\n        // indented comment\nlet b = 2\n";
  let kinds = kinds(src);
  assert!(!kinds.contains(&Tok_Indent));
  assert!(!kinds.contains(&Tok_Dedent));
}

#[test]
fn leading_indentation_on_first_line() {
  let src = "\tprint 1\n";
  assert_eq!(
    kinds(src),
    [
      Tok_Indent,
      Kw_Print,
      Lit_Int,
      Tok_Newline,
      Tok_Dedent,
      Tok_Eof
    ]
  );
}

#[test]
fn tab_counts_as_four_spaces() {
  // The tab-indented continuation sits at the same level as the
  // four-space line before it.
  let src = "if x:\n    print 1\n\tprint 2\n";
  let kinds = kinds(src);
  let indents = kinds.iter().filter(|k| matches!(k, Tok_Indent)).count();
  assert_eq!(indents, 1);
}

#[test]
fn inconsistent_indentation_is_reported_and_lexing_continues() {
  let src = "if x:\n        print 1\n    print 2\n";
  let mut lexer = Lexer::lex(src);
  let errors = lexer.take_errors();
  assert_eq!(errors.len(), 1);
  assert_eq!(errors[0].line, 3);
  assert!(errors[0].message.contains("inconsistent indentation"));
  // The buffer is still terminated properly.
  assert!(matches!(
    lexer.tokens().last().map(|t| t.kind),
    Some(Tok_Eof)
  ));
}

#[test]
fn crlf_line_endings() {
  let src = "let a = 1\r\nprint a\r\n";
  assert_eq!(
    kinds(src),
    [
      Kw_Let,
      Lit_Ident,
      Op_Equal,
      Lit_Int,
      Tok_Newline,
      Kw_Print,
      Lit_Ident,
      Tok_Newline,
      Tok_Eof,
    ]
  );
}

#[test]
fn newline_inside_string_advances_line_counter() {
  let src = "let s = \"a\nb\"\nprint s\n";
  let lexer = Lexer::lex(src);
  let print = lexer
    .tokens()
    .iter()
    .find(|t| t.is(Kw_Print))
    .expect("print token");
  assert_eq!(print.line, 3);
}

#[test]
fn atoms_and_map_literals() {
  assert_eq!(
    kinds("print #{@a => 1}\n"),
    [
      Kw_Print,
      Brk_Map,
      Lit_Atom,
      Op_Arrow,
      Lit_Int,
      Brk_CurlyR,
      Tok_Newline,
      Tok_Eof,
    ]
  );
}

#[test]
fn keywords_do_not_swallow_identifiers() {
  assert_eq!(
    kinds("lettuce classy\n"),
    [Lit_Ident, Lit_Ident, Tok_Newline, Tok_Eof]
  );
}

#[test]
fn operators() {
  assert_eq!(
    kinds("a == b != c <= d >= e => f & g\n"),
    [
      Lit_Ident,
      Op_EqualEqual,
      Lit_Ident,
      Op_BangEqual,
      Lit_Ident,
      Op_LessEqual,
      Lit_Ident,
      Op_MoreEqual,
      Lit_Ident,
      Op_Arrow,
      Lit_Ident,
      Op_Amp,
      Lit_Ident,
      Tok_Newline,
      Tok_Eof,
    ]
  );
}

#[test]
fn bad_character_is_reported() {
  let mut lexer = Lexer::lex("let a = $\n");
  let errors = lexer.take_errors();
  assert_eq!(errors.len(), 1);
  assert!(errors[0].message.contains("unexpected character"));
}

#[test]
fn no_trailing_newline() {
  assert_eq!(kinds("print 1"), [Kw_Print, Lit_Int, Tok_Eof]);
}

#[test]
fn eof_closes_open_blocks() {
  let src = "if x:\n    print 1";
  assert_eq!(
    kinds(src),
    [
      Kw_If,
      Lit_Ident,
      Tok_Colon,
      Tok_Newline,
      Tok_Indent,
      Kw_Print,
      Lit_Int,
      Tok_Dedent,
      Tok_Eof,
    ]
  );
}
