#[path = "common/common.rs"]
#[macro_use]
mod common;

check! {
  mutable_rebinding,
  r#"
    let mutable x = 1
    x = 2
    x = x + 3
    print x
  "#,
  "5\n"
}

check_error! {
  immutable_bindings_reject_assignment,
  r#"
    let x = 1
    x = 2
  "#,
  "Cannot assign to immutable variable 'x'."
}

check_error! {
  type_tag_locks_at_definition,
  r#"
    let mutable x = 1
    x = "s"
  "#,
  "Cannot assign value of type 'string' to variable 'x' of type 'int'."
}

check! {
  failed_assignment_leaves_binding_unchanged,
  r#"
    let mutable x = 1
    if 0:
        x = 2
    print x
  "#,
  "1\n"
}

check! {
  unknown_tagged_values_are_interchangeable,
  r#"
    let mutable x = {1, 2}
    x = [3, 4]
    print x
  "#,
  "[3, 4]\n"
}

check! {
  blocks_scope_and_shadow,
  r#"
    let x = 1
    if 1:
        let x = 2
        print x
    print x
  "#,
  "2\n1\n"
}

check! {
  assignment_writes_through_to_the_owner,
  r#"
    let mutable x = 1
    if 1:
        x = 42
    print x
  "#,
  "42\n"
}

check! {
  assignment_is_an_expression,
  r#"
    let mutable x = 1
    let y = x = 5
    print x
    print y
  "#,
  "5\n5\n"
}

check! {
  delete_is_ignored_under_arc,
  r#"
    let x = 1
    delete x
    print x
  "#,
  "1\n"
}

check! {
  list_assignment_copies,
  r#"
    let mutable a = [1, 2]
    let mutable b = a
    b = push(b, 3)
    print a
    print b
  "#,
  "[1, 2]\n[1, 2, 3]\n"
}

check! {
  comments_and_blank_lines,
  r#"
    // leading comment
    let x = 1

    // between statements
    print x
  "#,
  "1\n"
}
