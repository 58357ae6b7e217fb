use pretty_assertions::assert_eq;
use talang::{
    Decimal, Error, ErrorKind, Function, Interpreter, Kind, Result, Signature, Token, lex,
};

fn dec(n: i64) -> Token {
    Token::from(n)
}

fn returning(value: &'static str) -> impl Fn(&mut Interpreter<'_>, Vec<Token>) -> Result<Token> {
    move |_interp: &mut Interpreter<'_>, _args: Vec<Token>| Ok(Token::string(value))
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_unknown_head_is_left_unchanged() {
    let mut interp = Interpreter::new();
    let token = lex("(frobnicate 1 2)").unwrap();
    assert_eq!(interp.evaluate(token.clone()).unwrap(), token);
}

#[test]
fn test_bare_head_reads_as_an_atom() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.lex_and_evaluate("42").unwrap(), dec(42));
    assert_eq!(interp.lex_and_evaluate("(hello)").unwrap(), Token::string("hello"));
    assert_eq!(interp.lex_and_evaluate("true").unwrap(), Token::Boolean(true));
}

#[test]
fn test_atoms_evaluate_to_themselves() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.evaluate(dec(3)).unwrap(), dec(3));
    assert_eq!(interp.evaluate(Token::Null).unwrap(), Token::Null);
}

#[test]
fn test_names_match_case_insensitively() {
    let mut interp = Interpreter::new();
    interp
        .register_function("Shout(String)String", |_interp: &mut Interpreter<'_>, args: Vec<Token>| {
            Ok(Token::String(args[0].text().to_uppercase()))
        })
        .unwrap();
    assert_eq!(
        interp.lex_and_evaluate("(SHOUT \"hi\")").unwrap(),
        Token::string("HI")
    );
    assert_eq!(
        interp.lex_and_evaluate("(shout \"hi\")").unwrap(),
        Token::string("HI")
    );
}

#[test]
fn test_known_name_with_wrong_arity_is_an_error() {
    let mut interp = Interpreter::new();
    let err = interp.lex_and_evaluate("(floor 1 2)").unwrap_err();
    assert_eq!(
        err,
        Error::Arity {
            name: "floor".to_string(),
            count: 2
        }
    );
}

#[test]
fn test_known_name_with_wrong_kinds_is_left_unchanged() {
    let mut interp = Interpreter::new();
    let token = lex("(floor true)").unwrap();
    assert_eq!(interp.evaluate(token.clone()).unwrap(), token);
}

#[test]
fn test_overloads_select_by_kind() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.lex_and_evaluate("(+ 1 2)").unwrap(), dec(3));
    assert_eq!(
        interp.lex_and_evaluate("(+ \"n=\" 2)").unwrap(),
        Token::string("n=2")
    );
    assert_eq!(
        interp.lex_and_evaluate("(count \"héllo\")").unwrap(),
        dec(5)
    );
    assert_eq!(
        interp.lex_and_evaluate("(count (list 1 2))").unwrap(),
        dec(2)
    );
}

#[test]
fn test_look_ahead_uses_return_kinds() {
    let mut interp = Interpreter::new();
    // (list ...) returns a List, so the List overload of `reverse` is chosen
    assert_eq!(
        interp.lex_and_evaluate("(reverse (list 1 2 3))").unwrap(),
        Token::List(vec![dec(3), dec(2), dec(1)])
    );
    assert_eq!(
        interp.lex_and_evaluate("(reverse (+ \"ab\" \"c\"))").unwrap(),
        Token::string("cba")
    );
}

#[test]
fn test_redispatch_on_evaluated_kinds() {
    let mut interp = Interpreter::builder()
        .binding(Token::map([
            ("A", Token::from(1)),
            ("B", Token::from(2)),
            ("S", Token::string("x")),
        ]))
        .build();
    // `.` returns Value, so the string `+` is tried first and must give way
    assert_eq!(interp.lex_and_evaluate("(+ (. A) (. B))").unwrap(), dec(3));
    assert_eq!(
        interp.lex_and_evaluate("(+ (. S) (. A))").unwrap(),
        Token::string("x1")
    );
}

#[test]
fn test_redispatch_without_a_fit_is_a_kind_mismatch() {
    let mut interp = Interpreter::builder()
        .binding(Token::map([("Flag", Token::Boolean(true))]))
        .build();
    let err = interp.lex_and_evaluate("(floor (. Flag))").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KindMismatch);
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_later_registration_shadows_earlier() {
    let mut interp = Interpreter::new();
    interp.register_function("F(Decimal)String", returning("first")).unwrap();
    interp.register_function("F(Decimal)Value", returning("second")).unwrap();
    assert_eq!(interp.lex_and_evaluate("(F 1)").unwrap(), Token::string("second"));
}

#[test]
fn test_inner_scope_shadows_outer() {
    let mut outer = Interpreter::new();
    outer.register_function("F(Decimal)String", returning("outer")).unwrap();
    {
        let mut inner = outer.new_scope();
        inner.register_function("F(Decimal)Value", returning("inner")).unwrap();
        assert_eq!(inner.lex_and_evaluate("(F 1)").unwrap(), Token::string("inner"));
    }
    assert_eq!(outer.lex_and_evaluate("(F 1)").unwrap(), Token::string("outer"));
}

#[test]
fn test_register_conflict() {
    let mut interp = Interpreter::new();
    interp.register_function("G(Decimal)Decimal", returning("a")).unwrap();
    let err = interp
        .register_function("g(Decimal)Decimal", returning("b"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RegistryConflict);
}

#[test]
fn test_update_and_remove() {
    let mut interp = Interpreter::new();
    assert_eq!(
        interp
            .update_function("H(Decimal)String", returning("x"))
            .unwrap_err()
            .kind(),
        ErrorKind::RegistryConflict
    );
    interp.register_function("H(Decimal)String", returning("old")).unwrap();
    interp.update_function("H(Decimal)String", returning("new")).unwrap();
    assert_eq!(interp.lex_and_evaluate("(H 1)").unwrap(), Token::string("new"));

    interp.remove_function("H(Decimal)String").unwrap();
    let token = lex("(H 1)").unwrap();
    assert_eq!(interp.evaluate(token.clone()).unwrap(), token);
    assert!(interp.remove_function("H(Decimal)String").is_err());
}

#[test]
fn test_register_prebuilt_function() {
    let mut interp = Interpreter::builder().without_stdlib().build();
    let signature = Signature::new("Twice")
        .params([Kind::DECIMAL])
        .returns(Kind::DECIMAL)
        .describe("Double the argument")
        .example("(Twice 2)");
    interp
        .register(Function::new(signature, |_interp: &mut Interpreter<'_>, args: Vec<Token>| {
            let n = args[0].as_decimal().cloned().unwrap_or_else(Decimal::zero);
            Ok(Token::Decimal(n.add(&n)))
        }))
        .unwrap();
    assert_eq!(interp.lex_and_evaluate("(Twice 21)").unwrap(), dec(42));
    assert_eq!(interp.functions().len(), 1);
    assert_eq!(interp.functions()[0].description(), "Double the argument");
}

#[test]
fn test_invalid_signature_text() {
    let mut interp = Interpreter::new();
    let err = interp
        .register_function("Broken(Decimal", returning("x"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSignature);
}

#[test]
fn test_functions_lists_the_catalogue() {
    let interp = Interpreter::new();
    let signatures: Vec<String> = interp.functions().iter().map(|s| s.to_string()).collect();
    assert!(signatures.contains(&"+(Decimal, Decimal...)Decimal".to_string()));
    assert!(signatures.contains(&"!(String, Any...)Any".to_string()));
    assert!(interp.functions().iter().all(|s| !s.description().is_empty()));
}

// ============================================================================
// Errors, Depth and Dry Run
// ============================================================================

#[test]
fn test_errors_carry_the_call_trace() {
    let mut interp = Interpreter::new();
    let err = interp.lex_and_evaluate("(+ 1 (/ 1 0))").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decimal);
    assert_eq!(
        err.trace(),
        vec!["+(Decimal, Decimal...)Decimal", "/(Decimal, Decimal...)Decimal"]
    );
}

#[test]
fn test_recursion_limit() {
    let mut interp = Interpreter::builder().max_depth(8).build();
    let source = format!("{}1{}", "(+ 1 ".repeat(20), ")".repeat(20));
    let err = interp.lex_and_evaluate(&source).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RecursionLimit);

    let shallow = format!("{}1{}", "(+ 1 ".repeat(5), ")".repeat(5));
    assert_eq!(interp.lex_and_evaluate(&shallow).unwrap(), dec(6));
}

#[test]
fn test_dry_run_validates_without_calling() {
    let mut interp = Interpreter::builder().dry_run(true).build();
    let token = lex("(+ 1 (panic \"never\"))").unwrap();
    assert_eq!(interp.evaluate(token.clone()).unwrap(), token);

    let err = interp.lex_and_evaluate("(+ 1 (floor 1 2))").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Arity);
}

#[test]
fn test_without_stdlib_leaves_everything_unresolved() {
    let mut interp = Interpreter::builder().without_stdlib().build();
    let token = lex("(+ 1 2)").unwrap();
    assert_eq!(interp.evaluate(token.clone()).unwrap(), token);
    assert!(interp.functions().is_empty());
}
