#[path = "common/common.rs"]
#[macro_use]
mod common;

check! {
  capture_by_copy,
  r#"
    let factor = 3
    let f = [factor](n):
        return n * factor
    print f(4)
  "#,
  "12\n"
}

check! {
  captures_snapshot_at_creation,
  r#"
    let mutable x = 1
    let f = [x]():
        return x
    x = 2
    print f()
    print x
  "#,
  "1\n2\n"
}

check! {
  lambdas_are_first_class,
  r#"
    apply(f, n):
        return f(n)
    let double = [](n):
        return n + n
    print apply(double, 21)
  "#,
  "42\n"
}

check! {
  lambdas_close_over_the_defining_scope,
  r#"
    adder(n):
        return [n](m):
            return n + m
    let add2 = adder(2)
    let add10 = adder(10)
    print add2(5)
    print add10(5)
  "#,
  "7\n15\n"
}

check! {
  capture_by_address_aliases_the_binding,
  r#"
    let mutable x = 1
    let bump = [*x]():
        &x = &x + 1
    bump()
    print x
  "#,
  "2\n"
}

check! {
  pointer_captures_see_later_writes,
  r#"
    let mutable x = 1
    let read = [*x]():
        return &x
    x = 41
    print read()
  "#,
  "41\n"
}

check! {
  captured_class_references_share_state,
  r#"
    type Cell = class { v: int }
    let c = new Cell(0)
    let set = [c](n):
        c.v = n
    set(7)
    print c.v
  "#,
  "7\n"
}

check! {
  multiple_captures,
  r#"
    let a = 2
    let mutable b = 0
    let f = [a, *b](n):
        &b = a * n
    f(21)
    print b
  "#,
  "42\n"
}

check! {
  lambda_body_is_a_full_block,
  r#"
    let classify = [](n):
        if n < 0:
            return @negative
        let mutable total = 0
        while total < n:
            total = total + 1
        return total
    print classify(-5)
    print classify(3)
  "#,
  "@negative\n3\n"
}

check_error! {
  lambda_arity_is_checked,
  r#"
    let f = [](a, b):
        return a + b
    f(1)
  "#,
  "Lambda expects 2 args."
}

check_error! {
  captures_are_immutable_snapshots,
  r#"
    let x = 1
    let f = [x]():
        x = 2
    f()
  "#,
  "Cannot assign to immutable variable 'x'."
}
