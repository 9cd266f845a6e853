mod common;

use common::{error_of, lines_of, output_of, value_of};
use pretty_assertions::assert_eq;
use serpent::{InterpreterError, Value};

#[test]
fn test_initialize_receives_arguments() {
    let source = "
        class Point {
            func initialize(x, y) { self.x = x; self.y = y; }
            func length_squared() { return self.x * self.x + self.y * self.y; }
        }
        let p = Point(3, 4);
        print(p.x, p.y, p.length_squared());
    ";
    assert_eq!(output_of(source), "3 4 25\n");
}

#[test]
fn test_initialize_return_value_is_ignored() {
    let source = "
        class Weird { func initialize() { return 5; } }
        print(Weird());
    ";
    assert_eq!(output_of(source), "<Weird instance>\n");
}

#[test]
fn test_class_without_initialize() {
    let source = "
        class Bag { }
        let b = Bag(1, 2, 3);
        b.item = \"apple\";
        print(b.item);
    ";
    assert_eq!(output_of(source), "apple\n");
}

#[test]
fn test_instances_have_separate_fields() {
    let source = "
        class Counter {
            func initialize() { self.n = 0; }
            func bump() { self.n = self.n + 1; return self; }
        }
        let a = Counter();
        let b = Counter();
        a.bump().bump();
        b.bump();
        print(a.n, b.n);
    ";
    assert_eq!(output_of(source), "2 1\n");
}

#[test]
fn test_methods_call_each_other_through_self() {
    let source = "
        class Greeter {
            func initialize(name) { self.name = name; }
            func greeting() { return \"Hello, \" + self.name; }
            func shout() { return self.greeting() + \"!\"; }
        }
        print(Greeter(\"Ada\").shout());
    ";
    assert_eq!(output_of(source), "Hello, Ada!\n");
}

#[test]
fn test_bound_method_keeps_receiver() {
    let source = "
        class Box {
            func initialize(v) { self.v = v; }
            func get() { return self.v; }
        }
        let getter = Box(7).get;
        print(getter());
    ";
    assert_eq!(output_of(source), "7\n");
}

#[test]
fn test_field_shadows_method_per_instance() {
    let source = "
        class Animal { func sound() { return \"...\"; } }
        let a = Animal();
        let b = Animal();
        a.sound = \"woof\";
        print(a.sound, b.sound());
    ";
    assert_eq!(output_of(source), "woof ...\n");
}

#[test]
fn test_missing_property_is_undefined() {
    assert_eq!(output_of("class E { } print(E().nothing);"), "undefined\n");
}

#[test]
fn test_methods_close_over_declaration_scope() {
    let source = "
        func make_class(prefix) {
            class Tagged { func tag(v) { return prefix + v; } }
            return Tagged;
        }
        let T = make_class(\"#\");
        print(T().tag(1));
    ";
    assert_eq!(output_of(source), "#1\n");
}

#[test]
fn test_instance_stored_in_field() {
    let source = "
        class Node {
            func initialize(value, next) { self.value = value; self.next = next; }
        }
        let list = Node(1, Node(2, Node(3, undefined)));
        let sum = 0;
        let cursor = list;
        while cursor { sum = sum + cursor.value; cursor = cursor.next; }
        print(sum);
    ";
    assert_eq!(output_of(source), "6\n");
}

#[test]
fn test_class_and_instance_display() {
    assert_eq!(
        lines_of("class Shape { } print(Shape); print(Shape());"),
        vec!["<class Shape>", "<Shape instance>"]
    );
}

#[test]
fn test_class_declaration_value() {
    assert!(matches!(value_of("class K { }"), Value::Class(class) if &*class.name == "K"));
}

#[test]
fn test_member_access_on_non_instance_fails() {
    let err = error_of("let n = 5; n.field;");
    assert!(matches!(
        err,
        InterpreterError::InvalidMemberAccess { ref property, target: "number", .. } if property == "field"
    ));
    assert!(matches!(
        error_of("let s = \"x\"; s.len = 1;"),
        InterpreterError::InvalidMemberAccess { target: "string", .. }
    ));
}

#[test]
fn test_method_reads_compare_equal_per_instance() {
    let source = "
        class C { func m() { return 1; } }
        let c = C();
        let d = C();
        let saved = c.m;
        print(c.m == c.m, saved == c.m, c.m == d.m, c.m != d.m);
    ";
    assert_eq!(output_of(source), "true true false true\n");
}

#[test]
fn test_closures_from_separate_calls_are_distinct() {
    let source = "
        func make() { func inner() { return 1; } return inner; }
        let f = make();
        print(f == f, make() == make());
    ";
    assert_eq!(output_of(source), "true false\n");
}
