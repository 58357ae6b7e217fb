use chrono::DateTime;
use pretty_assertions::assert_eq;
use talang::{Decimal, ErrorKind, Kind, Token, TokenMap, lex};

fn dec(text: &str) -> Token {
    Token::Decimal(text.parse::<Decimal>().unwrap())
}

fn cart() -> Token {
    Token::map([
        (
            "Items",
            Token::List(vec![
                Token::map([("Sku", Token::string("A1")), ("Price", dec("9.99"))]),
                Token::map([("Sku", Token::string("B2")), ("Price", dec("5"))]),
            ]),
        ),
        ("Total", dec("14.99")),
    ])
}

// ============================================================================
// Inference
// ============================================================================

#[test]
fn test_from_text_inference_order() {
    assert_eq!(Token::from_text("TRUE"), Token::Boolean(true));
    assert_eq!(Token::from_text("False"), Token::Boolean(false));
    assert_eq!(Token::from_text("-1.5e3"), dec("-1500"));
    assert_eq!(Token::from_text(".5"), dec("0.5"));
    assert_eq!(
        Token::from_text("2024-03-01T10:00:00+02:00").kind(),
        Kind::TIME
    );
    assert_eq!(Token::from_text("1.2.3"), Token::string("1.2.3"));
    assert_eq!(Token::from_text("0x10"), Token::string("0x10"));
    assert_eq!(Token::from_text(""), Token::string(""));
}

#[test]
fn test_kinds() {
    assert_eq!(Token::Null.kind(), Kind::NULL);
    assert_eq!(Token::default(), Token::Null);
    assert_eq!(Token::list(vec![]).kind(), Kind::LIST);
    assert_eq!(Token::map(Vec::<(&str, Token)>::new()).kind(), Kind::MAP);
    assert_eq!(Token::block("f", vec![]).kind(), Kind::TOKEN);
}

// ============================================================================
// Canonical Text and Stringify
// ============================================================================

#[test]
fn test_text_forms() {
    assert_eq!(dec("1.50").text(), "1.5");
    assert_eq!(Token::Boolean(true).text(), "true");
    assert_eq!(Token::Null.text(), "");
    assert_eq!(Token::block("head", vec![dec("1")]).text(), "head");
    assert_eq!(
        Token::from_text("2024-03-01T10:00:00+00:00").text(),
        "2024-03-01T10:00:00Z"
    );
    assert_eq!(
        Token::from_text("2024-03-01T10:00:00.250+02:00").text(),
        "2024-03-01T10:00:00.250+02:00"
    );
}

#[test]
fn test_stringify_collections() {
    let list = Token::List(vec![dec("1"), Token::string("a"), Token::Null]);
    assert_eq!(list.stringify(), "[1, \"a\", null]");

    let map = Token::map([("k", dec("1")), ("s", Token::string("x"))]);
    assert_eq!(map.stringify(), "{k:1, s:\"x\"}");
}

#[test]
fn test_stringify_escapes_double_quotes() {
    assert_eq!(Token::string("say \"hi\"").stringify(), r#""say \"hi\"""#);
}

#[test]
fn test_stringify_blocks() {
    let token = lex("(f 1 \"x y\" (g true))").unwrap();
    assert_eq!(token.stringify(), "(f 1 \"x y\" (g true))");

    let sequence = lex("((f) (g))").unwrap();
    assert_eq!(sequence.stringify(), "((f) (g))");
}

// ============================================================================
// Collections
// ============================================================================

#[test]
fn test_map_equality_ignores_order() {
    let a = Token::map([("x", dec("1")), ("y", dec("2"))]);
    let b = Token::map([("y", dec("2")), ("x", dec("1"))]);
    assert_eq!(a, b);
    assert_ne!(a, Token::map([("x", dec("1"))]));
}

#[test]
fn test_map_keeps_insertion_order() {
    let mut map = TokenMap::new();
    map.insert("b", dec("1"));
    map.insert("a", dec("2"));
    map.insert("b", dec("3"));
    assert_eq!(map.keys(), &["b".to_string(), "a".to_string()]);
    assert_eq!(map.get("b"), Some(&dec("3")));
    assert_eq!(map.remove("b"), Some(dec("3")));
    assert_eq!(map.len(), 1);
}

#[test]
fn test_map_get_and_set() {
    let mut token = Token::map([("a", dec("1"))]);
    assert_eq!(token.map_get("a"), dec("1"));
    assert_eq!(token.map_get("missing"), Token::Null);
    token.map_set("b", Token::Boolean(true)).unwrap();
    assert_eq!(token.keys(), &["a".to_string(), "b".to_string()]);

    let err = Token::string("x").map_set("b", Token::Null).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KindMismatch);
}

#[test]
fn test_dot_path_through_maps_and_lists() {
    let cart = cart();
    assert_eq!(
        cart.dot_path(&["Items", "1", "Sku"]).unwrap(),
        &Token::string("B2")
    );
    assert_eq!(cart.dot_path::<&str>(&[]).unwrap(), &cart);

    let err = cart.dot_path(&["Items", "7"]).unwrap_err();
    assert_eq!(err, talang::Error::UnboundName("Items.7".to_string()));
    assert!(cart.dot_path(&["Total", "x"]).is_err());
}

#[test]
fn test_set_path_creates_maps_for_null_slots() {
    let mut token = Token::Null;
    token
        .set_path(&["Customer", "Address", "City"], Token::string("Oslo"))
        .unwrap();
    assert_eq!(
        token.dot_path(&["Customer", "Address", "City"]).unwrap(),
        &Token::string("Oslo")
    );

    let mut cart = cart();
    cart.set_path(&["Items", "0", "Price"], dec("1")).unwrap();
    assert_eq!(cart.dot_path(&["Items", "0", "Price"]).unwrap(), &dec("1"));
    assert!(cart.set_path(&["Total", "x"], dec("1")).is_err());
}

#[test]
fn test_clone_is_deep() {
    let original = cart();
    let mut copy = original.clone();
    copy.set_path(&["Items", "0", "Sku"], Token::string("Z9"))
        .unwrap();
    assert_eq!(
        original.dot_path(&["Items", "0", "Sku"]).unwrap(),
        &Token::string("A1")
    );
}

#[test]
fn test_truthiness() {
    assert!(!Token::Null.is_truthy());
    assert!(!Token::Boolean(false).is_truthy());
    assert!(dec("0").is_truthy());
    assert!(Token::string("").is_truthy());
    assert!(Token::List(vec![]).is_truthy());
}

#[test]
fn test_time_equality_is_by_instant() {
    let utc = Token::Time(DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z").unwrap());
    let local = Token::Time(DateTime::parse_from_rfc3339("2024-03-01T12:00:00+02:00").unwrap());
    assert_eq!(utc, local);
}
