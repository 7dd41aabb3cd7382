//! End-to-end program tests: full source through parse and evaluation,
//! asserting on printed output and final values.

use std::cell::RefCell;
use std::rc::Rc;

use noocrush::{run_source, Console, Error, Value};

struct Capture {
    lines: Rc<RefCell<Vec<String>>>,
}

impl Console for Capture {
    fn print(&mut self, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }

    fn read_line(&mut self) -> String {
        String::new()
    }
}

fn run_program(source: &str) -> (Value, Vec<String>) {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let console = Capture {
        lines: lines.clone(),
    };
    let value = run_source("program.nc", source, Box::new(console))
        .unwrap_or_else(|e| panic!("{}", e.to_diagnostic()));
    let output = lines.borrow().clone();
    (value, output)
}

fn run_failure(source: &str) -> Error {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let console = Capture { lines };
    run_source("program.nc", source, Box::new(console)).expect_err("expected a failure")
}

#[test]
fn fizzbuzz() {
    let source = r#"
        for i in 1..=15 {
            let label = if i % 15 == 0 { "FizzBuzz" }
                else if i % 3 == 0 { "Fizz" }
                else if i % 5 == 0 { "Buzz" }
                else { `${i}` };
            print(label);
        }
    "#;
    let (_, output) = run_program(source);
    assert_eq!(output.len(), 15);
    assert_eq!(output[0], "1");
    assert_eq!(output[2], "Fizz");
    assert_eq!(output[4], "Buzz");
    assert_eq!(output[14], "FizzBuzz");
}

#[test]
fn inventory_report_with_structs_and_comprehensions() {
    let source = r#"
        struct Item { name: String, price: Number, mut stock: Number }

        let items = [
            Item { name: "apple", price: 0.5, stock: 10 },
            Item { name: "pear", price: 0.75, stock: 0 },
            Item { name: "plum", price: 1.25, stock: 4 },
        ];

        fn restock(item, amount) {
            item.stock = item.stock + amount;
        }

        restock(items[1], 6);

        let in_stock = [item.name for item in items if item.stock > 0];
        let total = items.map(item => item.price * item.stock).reduce((a, b) => a + b, 0);

        print(in_stock);
        print(`total value: ${total}`);
    "#;
    let (_, output) = run_program(source);
    assert_eq!(output[0], "[apple, pear, plum]");
    assert_eq!(output[1], "total value: 14.5");
}

#[test]
fn counters_are_independent() {
    let source = r#"
        fn make_counter() {
            let mut n = 0;
            () => { n = n + 1; n }
        }
        let a = make_counter();
        let b = make_counter();
        a();
        a();
        print(a(), b());
    "#;
    let (_, output) = run_program(source);
    assert_eq!(output, vec!["3 1"]);
}

#[test]
fn result_pipeline_with_match() {
    let source = r#"
        fn parse_age(input) {
            match input {
                n if n >= 0 && n <= 130 => Ok(n),
                _ => Err(`invalid age: ${input}`),
            }
        }

        for candidate in [30, -2, 200] {
            match parse_age(candidate) {
                Ok(age) => print(`age ${age}`),
                Err(message) => print(message),
            }
        }
    "#;
    let (_, output) = run_program(source);
    assert_eq!(output, vec!["age 30", "invalid age: -2", "invalid age: 200"]);
}

#[test]
fn async_pipeline_through_main() {
    let source = r#"
        async fn fetch_status(path) {
            let response = await http.get(path);
            response.status
        }

        async fn main() {
            let pending = fetch_status("/health");
            print("requested");
            print(await pending);
        }
    "#;
    let (_, output) = run_program(source);
    assert_eq!(output, vec!["requested", "200"]);
}

#[test]
fn program_value_is_the_last_expression() {
    let (value, _) = run_program("let xs = [1, 2, 3]; xs.map(x => x * 10)");
    assert_eq!(value.to_string(), "[10, 20, 30]");
}

#[test]
fn lex_failure_reports_an_l_code() {
    match run_failure("let § = 1;") {
        Error::Lex(diag) => assert_eq!(diag.code, "L0001"),
        other => panic!("expected lex failure, got {:?}", other),
    }
}

#[test]
fn parse_failure_reports_a_p_code_with_position() {
    match run_failure("let = 5;") {
        Error::Parse(diag) => {
            assert_eq!(diag.code, "P0001");
            assert_eq!(diag.span.line, 1);
        }
        other => panic!("expected parse failure, got {:?}", other),
    }
}

#[test]
fn runtime_failure_converts_to_a_diagnostic() {
    let err = run_failure("let x = 1;\nx = 2;");
    let diag = err.to_diagnostic();
    assert_eq!(diag.code, "R0002");
    assert_eq!(diag.span.line, 2);
}
