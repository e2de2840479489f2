#[path = "common/common.rs"]
#[macro_use]
mod common;

check! {
  address_of_and_dereference,
  r#"
    let mutable x = 10
    let p = *x
    print p.*
    print &p
  "#,
  "10\n10\n"
}

check! {
  pointer_writes_alias_the_binding,
  r#"
    let mutable x = 1
    let p = *x
    p.* = 42
    print x
  "#,
  "42\n"
}

check! {
  pointers_track_the_binding_not_the_value,
  r#"
    let mutable x = 1
    let p = *x
    x = 2
    print p.*
  "#,
  "2\n"
}

check! {
  pointer_equality_is_per_binding,
  r#"
    let mutable x = 1
    let mutable y = 1
    print *x == *x
    print *x == *y
  "#,
  "true\nfalse\n"
}

check! {
  pointers_into_enclosing_frames,
  r#"
    let mutable total = 0
    add(n):
        let p = *total
        p.* = p.* + n
    add(2)
    add(40)
    print total
  "#,
  "42\n"
}

check_error! {
  pointer_writes_respect_mutability,
  r#"
    let x = 1
    let p = *x
    p.* = 2
  "#,
  "Cannot assign to immutable variable 'x'."
}

check_error! {
  pointer_writes_respect_the_type_tag,
  r#"
    let mutable x = 1
    let p = *x
    p.* = "s"
  "#,
  "Cannot assign value of type 'string' to variable 'x' of type 'int'."
}

check_error! {
  dangling_pointers_report_the_dead_binding,
  r#"
    escape():
        let mutable local = 5
        return *local
    let p = escape()
    print p.*
  "#,
  "Undefined variable 'local'."
}

check_error! {
  dereferencing_a_non_pointer,
  r#"
    let x = 1
    print x.*
  "#,
  "Can only dereference pointers."
}

check_error! {
  address_of_undefined_variable,
  r#"
    let p = *nope
  "#,
  "Undefined variable 'nope'."
}
