use criterion::{Criterion, black_box, criterion_group, criterion_main};
use talang::{Interpreter, Token, lex};

// ============================================================================
// Lexing Benchmarks
// ============================================================================

fn bench_lex_small(c: &mut Criterion) {
    c.bench_function("lex small expr", |b| {
        b.iter(|| black_box(lex("(+ 1 (- 6 1))").unwrap()))
    });
}

fn bench_lex_rule(c: &mut Criterion) {
    let rule = r#"
        (
            (set Subtotal (sum (. Order Lines) l (* (. l Price) (. l Qty))))
            (set Shipping (.| 49 (. Order Shipping)))
            (+ (. Subtotal) (. Shipping) " NOK")
        )
    "#;
    c.bench_function("lex pricing rule", |b| {
        b.iter(|| black_box(lex(rule).unwrap()))
    });
}

fn bench_lex_deep_nesting(c: &mut Criterion) {
    let mut expr = String::from("1");
    for _ in 0..100 {
        expr = format!("(+ {expr} 1)");
    }
    c.bench_function("lex deep nesting (100 levels)", |b| {
        b.iter(|| black_box(lex(&expr).unwrap()))
    });
}

// ============================================================================
// Evaluation Benchmarks
// ============================================================================

fn order(lines: usize) -> Token {
    let lines = (0..lines)
        .map(|i| {
            Token::map([
                ("Sku", Token::string(format!("SKU-{i}"))),
                ("Price", Token::from(i as i64 % 97 + 1)),
                ("Qty", Token::from(i as i64 % 5 + 1)),
            ])
        })
        .collect();
    Token::map([("Order", Token::map([("Lines", Token::List(lines))]))])
}

fn bench_eval_arithmetic(c: &mut Criterion) {
    let token = lex("(+ 1 (* 2 3) (- 10 4) (/ 9 3))").unwrap();
    let mut interp = Interpreter::new();
    c.bench_function("eval arithmetic", |b| {
        b.iter(|| black_box(interp.evaluate(token.clone()).unwrap()))
    });
}

fn bench_eval_overloaded_plus(c: &mut Criterion) {
    let token = lex("(+ (. Name) \" \" (. Surname))").unwrap();
    let mut interp = Interpreter::builder()
        .binding(Token::map([
            ("Name", Token::string("Ada")),
            ("Surname", Token::string("Lovelace")),
        ]))
        .build();
    c.bench_function("eval overloaded +", |b| {
        b.iter(|| black_box(interp.evaluate(token.clone()).unwrap()))
    });
}

fn bench_eval_sum_by(c: &mut Criterion) {
    let token = lex("(sum (. Order Lines) l (* (. l Price) (. l Qty)))").unwrap();
    let mut interp = Interpreter::builder().binding(order(1000)).build();
    c.bench_function("eval sum over 1000 lines", |b| {
        b.iter(|| black_box(interp.evaluate(token.clone()).unwrap()))
    });
}

fn bench_eval_template(c: &mut Criterion) {
    let mut interp = Interpreter::new();
    interp
        .register_template("MultiplyWith2(Decimal)Decimal", lex("(* 2 (# 0))").unwrap())
        .unwrap();
    let token = lex("(+ 1 (! MultiplyWith2 4))").unwrap();
    c.bench_function("eval template instantiation", |b| {
        b.iter(|| black_box(interp.evaluate(token.clone()).unwrap()))
    });
}

fn bench_interpreter_new(c: &mut Criterion) {
    c.bench_function("interpreter with stdlib", |b| {
        b.iter(|| black_box(Interpreter::new()))
    });
}

criterion_group!(
    benches,
    bench_lex_small,
    bench_lex_rule,
    bench_lex_deep_nesting,
    bench_eval_arithmetic,
    bench_eval_overloaded_plus,
    bench_eval_sum_by,
    bench_eval_template,
    bench_interpreter_new,
);
criterion_main!(benches);
