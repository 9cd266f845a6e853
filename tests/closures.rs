mod common;

use common::{lines_of, output_of};
use pretty_assertions::assert_eq;

#[test]
fn test_closures_capture_by_reference() {
    let source = "
        let greeting = \"hello\";
        func greet() { return greeting; }
        greeting = \"goodbye\";
        print(greet());
    ";
    assert_eq!(output_of(source), "goodbye\n");
}

#[test]
fn test_counter_keeps_private_state() {
    let source = "
        func make_counter() {
            let count = 0;
            func next() { count = count + 1; return count; }
            return next;
        }
        let a = make_counter();
        let b = make_counter();
        a(); a();
        print(a(), b());
    ";
    assert_eq!(output_of(source), "3 1\n");
}

#[test]
fn test_closures_share_enclosing_frame() {
    let source = "
        let get = 0;
        let set = 0;
        func make() {
            let value = 1;
            func read() { return value; }
            func write(v) { value = v; }
            get = read;
            set = write;
        }
        make();
        set(42);
        print(get());
    ";
    assert_eq!(output_of(source), "42\n");
}

#[test]
fn test_assignment_to_unknown_name_stays_local() {
    let source = "
        func f() { fresh = 1; return fresh; }
        print(f());
        print(fresh);
    ";
    let run = common::run(source);
    assert_eq!(run.stdout, "1\n");
    assert!(matches!(
        run.result,
        Err(serpent::InterpreterError::UndefinedVariable { ref name, .. }) if name == "fresh"
    ));
}

#[test]
fn test_assignment_updates_global_from_function() {
    let source = "
        let total = 0;
        func add(n) { total = total + n; }
        add(2); add(3);
        print(total);
    ";
    assert_eq!(output_of(source), "5\n");
}

#[test]
fn test_parameters_shadow_globals() {
    let source = "
        let x = \"global\";
        func show(x) { return x; }
        print(show(\"param\"), x);
    ";
    assert_eq!(output_of(source), "param global\n");
}

#[test]
fn test_let_in_function_does_not_leak() {
    let source = "
        let x = 1;
        func f() { let x = 2; return x; }
        print(f(), x);
    ";
    assert_eq!(output_of(source), "2 1\n");
}

#[test]
fn test_functions_are_values() {
    let source = "
        func twice(f, v) { return f(f(v)); }
        func inc(n) { return n + 1; }
        print(twice(inc, 5));
        print(twice);
    ";
    assert_eq!(lines_of(source), vec!["7", "<func twice>"]);
}

#[test]
fn test_mutual_recursion() {
    let source = "
        func is_even(n) { if n == 0 { return true; } return is_odd(n - 1); }
        func is_odd(n) { if n == 0 { return false; } return is_even(n - 1); }
        print(is_even(10), is_odd(7));
    ";
    assert_eq!(output_of(source), "true true\n");
}

#[test]
fn test_lexical_not_dynamic_scope() {
    let source = "
        let name = \"outer\";
        func read() { return name; }
        func call_with_local() { let name = \"inner\"; return read(); }
        print(call_with_local());
    ";
    assert_eq!(output_of(source), "outer\n");
}
