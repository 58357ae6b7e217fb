use pretty_assertions::assert_eq;
use talang::{ErrorKind, Interpreter, Result, Token, lex};

fn dec(n: i64) -> Token {
    Token::from(n)
}

fn strings(items: &[&str]) -> Token {
    Token::List(items.iter().map(|s| Token::string(*s)).collect())
}

// ============================================================================
// End-to-end Rules
// ============================================================================

#[test]
fn test_nested_arithmetic() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.lex_and_evaluate("(+ 1 (- 6 1))").unwrap(), dec(6));
}

#[test]
fn test_equality_over_canonical_text() {
    let mut interp = Interpreter::new();
    assert_eq!(
        interp.lex_and_evaluate("(= 1 \"1\")").unwrap(),
        Token::Boolean(true)
    );
}

#[test]
fn test_list_functions_leave_the_binding_alone() {
    let mut interp = Interpreter::new();
    interp.set("List", strings(&["Hello", "World"])).unwrap();

    assert_eq!(
        interp.lex_and_evaluate("(head (. List))").unwrap(),
        Token::string("Hello")
    );
    assert_eq!(
        interp.lex_and_evaluate("(tail (. List))").unwrap(),
        strings(&["World"])
    );
    assert_eq!(
        interp
            .lex_and_evaluate("(push (. List) And Universe)")
            .unwrap(),
        strings(&["Hello", "World", "And", "Universe"])
    );
    assert_eq!(
        interp.lex_and_evaluate("(. List)").unwrap(),
        strings(&["Hello", "World"])
    );
}

#[test]
fn test_map_builds_full_names() {
    let mut interp = Interpreter::new();
    interp
        .set(
            "List",
            Token::List(vec![
                Token::map([
                    ("Name", Token::string("Joe")),
                    ("Surname", Token::string("Doe")),
                ]),
                Token::map([
                    ("Name", Token::string("Alice")),
                    ("Surname", Token::string("Wonder")),
                ]),
            ]),
        )
        .unwrap();
    let result = interp
        .lex_and_evaluate("(map (. List) x (+ (. x Name) \" \" (. x Surname)))")
        .unwrap();
    assert_eq!(result, strings(&["Joe Doe", "Alice Wonder"]));
}

#[test]
fn test_template_multiplies() {
    let mut interp = Interpreter::new();
    interp
        .register_template("MultiplyWith2(Decimal)Decimal", lex("(* 2 (# 0))").unwrap())
        .unwrap();
    assert_eq!(
        interp.lex_and_evaluate("(+ 1 (! MultiplyWith2 4))").unwrap(),
        dec(9)
    );
    assert!(interp.lex_and_evaluate("(! MultiplyWith2 A)").is_err());
}

#[test]
fn test_catch_falls_back() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.lex_and_evaluate("(catch 22 (panic))").unwrap(), dec(22));
    assert_eq!(
        interp
            .lex_and_evaluate("(catch (+ 2 (* 5 (- 3 4))) (+ 2 (* 4 (panic))))")
            .unwrap(),
        dec(-3)
    );
}

#[test]
fn test_sequence_sets_then_reads() {
    let mut interp = Interpreter::new();
    assert_eq!(
        interp
            .lex_and_evaluate("((set Integer 2) (+ (. Integer) 1))")
            .unwrap(),
        dec(3)
    );
    assert_eq!(interp.get("Integer"), dec(2));
}

// ============================================================================
// Embedding
// ============================================================================

#[test]
fn test_child_scope_isolation() {
    let mut root = Interpreter::new();
    root.set("Shared", dec(1)).unwrap();
    let before = root.binding().clone();
    {
        let mut child = root.new_scope();
        child.set("Local", dec(2)).unwrap();
        assert_eq!(child.get("Shared"), dec(1));
        assert_eq!(
            child.lex_and_evaluate("(+ (. Shared) (. Local))").unwrap(),
            dec(3)
        );
        child.lex_and_evaluate("(set Shared 5)").unwrap();
        assert_eq!(child.get("Shared"), dec(5));
    }
    assert_eq!(root.binding(), &before);
    assert_eq!(root.get("Local"), Token::Null);
}

#[test]
fn test_child_scope_registrations_do_not_leak() {
    let root = Interpreter::new();
    let count = root.functions().len();
    {
        let mut child = root.new_scope();
        child
            .register_function("Local()Decimal", |_interp: &mut Interpreter<'_>, _args: Vec<Token>| {
                Ok(Token::from(7))
            })
            .unwrap();
        assert_eq!(child.lex_and_evaluate("(Local)").unwrap(), dec(7));
        assert_eq!(child.functions().len(), count + 1);
    }
    assert_eq!(root.functions().len(), count);
}

#[test]
fn test_host_function_calls_back_into_the_interpreter() {
    let mut interp = Interpreter::new();
    interp
        .register_function(
            "Discount(Decimal)Decimal",
            |interp: &mut Interpreter<'_>, args: Vec<Token>| -> Result<Token> {
                let mut scope = interp.new_scope();
                scope.set("Amount", args[0].clone())?;
                scope.lex_and_evaluate("(- (. Amount) (* (. Amount) (. Rate)))")
            },
        )
        .unwrap();
    interp.set("Rate", Token::from_text("0.1")).unwrap();
    assert_eq!(
        interp.lex_and_evaluate("(Discount 200)").unwrap(),
        dec(180)
    );
}

#[test]
fn test_set_binding_replaces_the_root() {
    let mut interp = Interpreter::new();
    interp.set_binding(Token::map([("Answer", dec(42))]));
    assert_eq!(interp.lex_and_evaluate("(. Answer)").unwrap(), dec(42));
}

#[test]
fn test_rules_run_inside_the_configured_span() {
    let span = tracing::info_span!("rules", tenant = "acme");
    let mut interp = Interpreter::builder().span(span).build();
    assert_eq!(interp.lex_and_evaluate("(* 6 7)").unwrap(), dec(42));
}

#[test]
fn test_syntax_errors_surface_from_lex_and_evaluate() {
    let mut interp = Interpreter::new();
    let err = interp.lex_and_evaluate("(+ 1 2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn test_pricing_rule() {
    let mut interp = Interpreter::builder()
        .binding(Token::map([(
            "Order",
            Token::map([
                ("Country", Token::string("NO")),
                (
                    "Lines",
                    Token::List(vec![
                        Token::map([("Price", dec(100)), ("Qty", dec(2))]),
                        Token::map([("Price", dec(50)), ("Qty", dec(1))]),
                    ]),
                ),
            ]),
        )]))
        .build();
    let rule = r#"
        (
            (set Subtotal (sum (. Order Lines) l (* (. l Price) (. l Qty))))
            (set Shipping (.| 49 (. Order Shipping)))
            (+ (. Subtotal) (. Shipping))
        )
    "#;
    assert_eq!(interp.lex_and_evaluate(rule).unwrap(), dec(299));
}
