//! End-to-end tests: source text in, values and printed output out.
//!
//! Everything goes through the same pipeline the file runner and the REPL
//! use, with `print`/`println` captured through a shared buffer.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use wright::error::{Error, RuntimeErrorKind};
use wright::interpreter::Interpreter;
use wright::run::run_source;
use wright::value::Value;

/// An output sink the test can still read after handing it to the
/// interpreter.
#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

fn session() -> (Interpreter, SharedBuf) {
    let buf = SharedBuf::default();
    let interp = Interpreter::with_output(Box::new(buf.clone()));
    (interp, buf)
}

/// Run one program in a fresh session, returning the last statement's value.
fn eval(source: &str) -> Result<Value, Error> {
    let (mut interp, _) = session();
    run_source(&mut interp, source)
}

/// Run one program in a fresh session, returning everything it printed.
fn output_of(source: &str) -> String {
    let (mut interp, buf) = session();
    run_source(&mut interp, source).unwrap();
    buf.contents()
}

fn runtime_kind(result: Result<Value, Error>) -> RuntimeErrorKind {
    match result {
        Err(Error::Runtime(err)) => err.kind,
        other => panic!("expected runtime error, got {:?}", other),
    }
}

#[test]
fn arithmetic_precedence_and_grouping() {
    assert_eq!(eval("1 + 2 * 3;").unwrap(), Value::Int(7));
    assert_eq!(eval("(1 + 2) * 3;").unwrap(), Value::Int(9));
    assert_eq!(eval("10 - 4 - 3;").unwrap(), Value::Int(3));
    assert_eq!(eval("-2 * 3;").unwrap(), Value::Int(-6));
    assert_eq!(eval("7 % 3;").unwrap(), Value::Int(1));
}

#[test]
fn mixed_numerics_promote_to_float() {
    assert_eq!(eval("1 + 2.5;").unwrap(), Value::Float(3.5));
    assert_eq!(eval("10 / 4;").unwrap(), Value::Int(2));
    assert_eq!(eval("10 / 4.0;").unwrap(), Value::Float(2.5));
}

#[test]
fn float_division_by_zero_is_ieee() {
    assert_eq!(eval("1.0 / 0.0;").unwrap(), Value::Float(f64::INFINITY));
    assert_eq!(eval("-1.0 / 0.0;").unwrap(), Value::Float(f64::NEG_INFINITY));
    match eval("0.0 / 0.0;").unwrap() {
        Value::Float(n) => assert!(n.is_nan()),
        other => panic!("expected float, got {:?}", other),
    }
}

#[test]
fn integer_division_by_zero_is_an_error() {
    assert_eq!(runtime_kind(eval("1 / 0;")), RuntimeErrorKind::DivisionByZero);
    assert_eq!(runtime_kind(eval("1 % 0;")), RuntimeErrorKind::DivisionByZero);
}

#[test]
fn string_concat_and_ordering() {
    assert_eq!(eval("\"foo\" + \"bar\";").unwrap(), Value::Str("foobar".into()));
    assert_eq!(eval("\"abc\" < \"abd\";").unwrap(), Value::Bool(true));
    assert_eq!(eval("\"a\" == \"a\";").unwrap(), Value::Bool(true));
}

#[test]
fn adding_string_and_number_is_a_type_error() {
    match runtime_kind(eval("\"n = \" + 1;")) {
        RuntimeErrorKind::Type(_) => {}
        other => panic!("expected type error, got {:?}", other),
    }
}

#[test]
fn equality_is_total_across_types() {
    assert_eq!(eval("1 == 1.0;").unwrap(), Value::Bool(true));
    assert_eq!(eval("1 == \"1\";").unwrap(), Value::Bool(false));
    assert_eq!(eval("null == null;").unwrap(), Value::Bool(true));
    assert_eq!(eval("null != 0;").unwrap(), Value::Bool(true));
}

#[test]
fn logical_operators_short_circuit() {
    // The right side would be a name error if evaluated.
    assert_eq!(eval("false && missing;").unwrap(), Value::Bool(false));
    assert_eq!(eval("true || missing;").unwrap(), Value::Bool(true));
    assert_eq!(eval("1 && \"x\";").unwrap(), Value::Bool(true));
    assert_eq!(eval("0 || \"\";").unwrap(), Value::Bool(false));
}

#[test]
fn unary_operators() {
    assert_eq!(eval("!true;").unwrap(), Value::Bool(false));
    assert_eq!(eval("!0;").unwrap(), Value::Bool(true));
    assert_eq!(eval("!!\"x\";").unwrap(), Value::Bool(true));
    assert_eq!(eval("-(2 + 3);").unwrap(), Value::Int(-5));
    assert_eq!(eval("-1.5;").unwrap(), Value::Float(-1.5));
}

#[test]
fn let_assign_and_shadowing() {
    assert_eq!(eval("let x = 1; x = x + 1; x;").unwrap(), Value::Int(2));

    // Inner `let` shadows without touching the outer binding.
    let source = "
        let x = 1;
        {
            let x = 99;
        }
        x;
    ";
    assert_eq!(eval(source).unwrap(), Value::Int(1));

    // Plain assignment inside a block reaches the outer binding.
    let source = "
        let x = 1;
        {
            x = 2;
        }
        x;
    ";
    assert_eq!(eval(source).unwrap(), Value::Int(2));
}

#[test]
fn assignment_to_undefined_is_a_name_error() {
    assert_eq!(
        runtime_kind(eval("ghost = 1;")),
        RuntimeErrorKind::Name("ghost".into())
    );
    assert_eq!(
        runtime_kind(eval("ghost;")),
        RuntimeErrorKind::Name("ghost".into())
    );
}

#[test]
fn block_scoped_locals_do_not_leak() {
    let source = "
        if (true) {
            let inner = 1;
        }
        inner;
    ";
    assert_eq!(
        runtime_kind(eval(source)),
        RuntimeErrorKind::Name("inner".into())
    );
}

#[test]
fn if_else_if_else_chain() {
    let source = "
        fn grade(n) {
            if n >= 90 { return \"A\"; }
            else if n >= 80 { return \"B\"; }
            else { return \"C\"; }
        }
        grade(95) + grade(85) + grade(10);
    ";
    assert_eq!(eval(source).unwrap(), Value::Str("ABC".into()));
}

#[test]
fn while_loop_accumulates() {
    let source = "
        let total = 0;
        let i = 0;
        while i < 5 {
            total = total + i;
            i = i + 1;
        }
        total;
    ";
    assert_eq!(eval(source).unwrap(), Value::Int(10));
}

#[test]
fn for_loop_over_array_string_and_object() {
    let source = "
        let total = 0;
        for n in [1, 2, 3] {
            total = total + n;
        }
        total;
    ";
    assert_eq!(eval(source).unwrap(), Value::Int(6));

    let source = "
        let out = \"\";
        for ch in \"héllo\" {
            out = out + ch + \".\";
        }
        out;
    ";
    assert_eq!(eval(source).unwrap(), Value::Str("h.é.l.l.o.".into()));

    let source = "
        let seen = 0;
        for pair in {\"a\": 1, \"b\": 2} {
            seen = seen + pair[1];
        }
        seen;
    ";
    assert_eq!(eval(source).unwrap(), Value::Int(3));
}

#[test]
fn functions_return_and_default_to_null() {
    let source = "
        fn add(a, b) { return a + b; }
        add(2, 3);
    ";
    assert_eq!(eval(source).unwrap(), Value::Int(5));

    let source = "
        fn noop() { let x = 1; }
        noop();
    ";
    assert_eq!(eval(source).unwrap(), Value::Null);

    let source = "
        fn early(n) {
            if n > 0 { return \"pos\"; }
            return \"other\";
        }
        early(1);
    ";
    assert_eq!(eval(source).unwrap(), Value::Str("pos".into()));
}

#[test]
fn recursion_works() {
    let source = "
        fn fib(n) {
            if n < 2 { return n; }
            return fib(n - 1) + fib(n - 2);
        }
        fib(12);
    ";
    assert_eq!(eval(source).unwrap(), Value::Int(144));
}

#[test]
fn runaway_recursion_hits_the_depth_limit() {
    let source = "
        fn forever() { return forever(); }
        forever();
    ";
    match runtime_kind(eval(source)) {
        RuntimeErrorKind::RecursionLimit(_) => {}
        other => panic!("expected recursion limit, got {:?}", other),
    }
}

#[test]
fn wrong_arity_is_an_error_before_the_call() {
    let source = "
        fn add(a, b) { return a + b; }
        add(1);
    ";
    assert_eq!(
        runtime_kind(eval(source)),
        RuntimeErrorKind::Arity { expected: 2, got: 1 }
    );
}

#[test]
fn calling_a_non_function_is_a_type_error() {
    match runtime_kind(eval("let n = 3; n(1);")) {
        RuntimeErrorKind::Type(_) => {}
        other => panic!("expected type error, got {:?}", other),
    }
}

#[test]
fn closures_share_their_captured_environment() {
    let source = "
        fn make_counter() {
            let count = 0;
            fn next() {
                count = count + 1;
                return count;
            }
            return next;
        }
        let counter = make_counter();
        counter();
        counter();
        counter();
    ";
    assert_eq!(eval(source).unwrap(), Value::Int(3));
}

#[test]
fn closures_see_later_writes_to_outer_bindings() {
    let source = "
        let x = 1;
        fn read() { return x; }
        x = 2;
        read();
    ";
    assert_eq!(eval(source).unwrap(), Value::Int(2));
}

#[test]
fn anonymous_functions_are_values() {
    let source = "
        let twice = fn (f, x) { return f(f(x)); };
        twice(fn (n) { return n * 3; }, 2);
    ";
    assert_eq!(eval(source).unwrap(), Value::Int(18));
}

#[test]
fn return_at_top_level_is_an_error() {
    assert_eq!(
        runtime_kind(eval("return 1;")),
        RuntimeErrorKind::ReturnOutsideFunction
    );
}

#[test]
fn array_indexing_including_negative() {
    assert_eq!(eval("[10, 20, 30][0];").unwrap(), Value::Int(10));
    assert_eq!(eval("[10, 20, 30][-1];").unwrap(), Value::Int(30));
    assert_eq!(eval("\"héllo\"[1];").unwrap(), Value::Str("é".into()));
    assert_eq!(eval("\"héllo\"[-1];").unwrap(), Value::Str("o".into()));
}

#[test]
fn out_of_range_index_is_an_index_error() {
    match runtime_kind(eval("[1, 2][5];")) {
        RuntimeErrorKind::Index(_) => {}
        other => panic!("expected index error, got {:?}", other),
    }
    match runtime_kind(eval("[1, 2][-3];")) {
        RuntimeErrorKind::Index(_) => {}
        other => panic!("expected index error, got {:?}", other),
    }
}

#[test]
fn array_element_assignment() {
    let source = "
        let arr = [1, 2, 3];
        arr[1] = 20;
        arr[-1] = 30;
        arr;
    ";
    assert_eq!(
        eval(source).unwrap(),
        Value::arr(vec![Value::Int(1), Value::Int(20), Value::Int(30)])
    );
}

#[test]
fn arrays_have_reference_semantics() {
    let source = "
        let a = [1, 2];
        let b = a;
        b[0] = 99;
        a[0];
    ";
    assert_eq!(eval(source).unwrap(), Value::Int(99));
}

#[test]
fn object_member_access_and_update() {
    let source = "
        let point = {\"x\": 1, \"y\": 2};
        point.x = point.x + 10;
        point[\"y\"] = 20;
        point.x + point.y;
    ";
    assert_eq!(eval(source).unwrap(), Value::Int(31));
}

#[test]
fn missing_object_key_reads_null() {
    assert_eq!(eval("let o = {\"a\": 1}; o.b;").unwrap(), Value::Null);
    assert_eq!(eval("let o = {\"a\": 1}; o[\"b\"];").unwrap(), Value::Null);
}

#[test]
fn assigning_a_missing_key_creates_it() {
    let source = "
        let obj = {};
        obj.name = \"rose\";
        obj[\"kind\"] = \"black\";
        obj.name + obj.kind;
    ";
    assert_eq!(eval(source).unwrap(), Value::Str("roseblack".into()));
}

#[test]
fn nested_collections() {
    let source = "
        let grid = [[1, 2], [3, 4]];
        grid[1][0] = 30;
        grid[0][1] + grid[1][0];
    ";
    assert_eq!(eval(source).unwrap(), Value::Int(32));

    let source = "
        let db = {\"users\": [{\"name\": \"ada\"}]};
        db.users[0].name;
    ";
    assert_eq!(eval(source).unwrap(), Value::Str("ada".into()));
}

#[test]
fn print_builtins_write_to_the_session_sink() {
    let out = output_of("println(\"hello\"); print(1 + 1); println(\"!\");");
    assert_eq!(out, "hello\n2!\n");
}

#[test]
fn println_renders_values_like_the_repl() {
    let out = output_of("println([1, null, \"x\"]); println(1.0); println(null);");
    assert_eq!(out, "[1, null, x]\n1.0\nnull\n");
}

#[test]
fn core_builtins() {
    assert_eq!(eval("len([1, 2, 3]);").unwrap(), Value::Int(3));
    assert_eq!(eval("len(\"héllo\");").unwrap(), Value::Int(5));
    assert_eq!(eval("type(1.5);").unwrap(), Value::Str("float".into()));
    assert_eq!(eval("type(len);").unwrap(), Value::Str("function".into()));
    assert_eq!(eval("str(42);").unwrap(), Value::Str("42".into()));

    let source = "
        let arr = [1];
        push(arr, 2);
        arr;
    ";
    assert_eq!(
        eval(source).unwrap(),
        Value::arr(vec![Value::Int(1), Value::Int(2)])
    );
}

#[test]
fn eval_builtin_shares_the_global_environment() {
    let source = "
        let x = 20;
        eval(\"let y = x + 1;\");
        y + x;
    ";
    assert_eq!(eval(source).unwrap(), Value::Int(41));
}

#[test]
fn repl_style_session_keeps_state_between_inputs() {
    let (mut interp, buf) = session();

    run_source(&mut interp, "let total = 0;").unwrap();
    run_source(&mut interp, "fn bump(n) { total = total + n; return total; }").unwrap();
    assert_eq!(run_source(&mut interp, "bump(3);").unwrap(), Value::Int(3));
    assert_eq!(run_source(&mut interp, "bump(4);").unwrap(), Value::Int(7));

    // An error leaves the session usable with its environment intact.
    assert!(run_source(&mut interp, "bump(\"x\");").is_err());
    assert_eq!(run_source(&mut interp, "total;").unwrap(), Value::Int(7));

    run_source(&mut interp, "println(total);").unwrap();
    assert_eq!(buf.contents(), "7\n");
}

#[test]
fn comments_are_ignored() {
    let source = "
        // a line comment
        let x = 1; // trailing
        /* a block
           /* nested */
           comment */
        x + 1;
    ";
    assert_eq!(eval(source).unwrap(), Value::Int(2));
}

#[test]
fn parse_errors_carry_the_eof_flag_for_continuation() {
    match eval("fn partial(") {
        Err(Error::Parse(err)) => assert!(err.at_eof),
        other => panic!("expected parse error, got {:?}", other),
    }
    match eval("let = 1;") {
        Err(Error::Parse(err)) => assert!(!err.at_eof),
        other => panic!("expected parse error, got {:?}", other),
    }
}
