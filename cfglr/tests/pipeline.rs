use cfglr::{
    Action, Conventions, Grammar, ParseError, ParseTable, Parser, Step, Symbol, ValidationError,
    Validator,
};
use pretty_assertions::assert_eq;

const SUM: &str = "
# right recursive sums
<E> -> <T> + <E> | <T>
<T> -> id
";

fn t(s: &str) -> Symbol {
    Symbol::Terminal(s.to_owned())
}

#[test]
fn sum_vocabulary() {
    let grammar = Grammar::parse(SUM).unwrap();
    let terminals: Vec<_> = grammar.terminals().iter().cloned().collect();
    assert_eq!(terminals, vec![t("+"), t("id"), Symbol::End]);
    let first: Vec<_> = grammar.first("<E>").unwrap().iter().cloned().collect();
    assert_eq!(first, vec![t("id")]);
    let follow: Vec<_> = grammar.follow("<T>").unwrap().iter().cloned().collect();
    assert_eq!(follow, vec![t("+"), Symbol::End]);
}

#[test]
fn sum_codes() {
    let table = ParseTable::from_grammar(&Grammar::parse(SUM).unwrap());
    let codes = table.codes();
    assert_eq!(codes.len(), 6);
    assert_eq!(codes[0]["id"], "S3");
    assert_eq!(codes[0]["<E>"], "1");
    assert_eq!(codes[1]["$"], "ACC");
    assert_eq!(codes[2]["$"], "R2");
    for row in &codes {
        for code in row.values() {
            assert!(code.parse::<Action>().is_ok(), "{}", code);
        }
    }
}

#[test]
fn drive_step_by_step() {
    let table = ParseTable::from_grammar(&Grammar::parse(SUM).unwrap());
    let mut parser = Parser::new(&table, vec!["id", "+", "id"]);
    let mut reductions = Vec::new();
    loop {
        match parser.step() {
            Step::Reduce(rule) => reductions.push(rule),
            Step::Accept => break,
            Step::Error(e) => panic!("{}", e),
            Step::Shift(_) | Step::Goto(_) => (),
        }
    }
    assert_eq!(reductions, vec![3, 3, 2, 1]);
}

#[test]
fn left_recursion() {
    let grammar = Grammar::parse(
        "<E> -> <E> + <T> | <T>
         <T> -> <T> * <F> | <F>
         <F> -> ( <E> ) | id",
    )
    .unwrap();
    let table = ParseTable::from_grammar(&grammar);
    let words = "( id + id ) * id + id".split_whitespace();
    assert!(Parser::new(&table, words).run().is_ok());

    match Parser::new(&table, vec!["(", "id"]).run().unwrap_err() {
        ParseError::Unexpected {
            position,
            mut expected,
            got,
        } => {
            assert_eq!(position, 2);
            assert_eq!(got, "$");
            expected.sort();
            assert_eq!(expected, vec![")", "+"]);
        }
        e => panic!("unexpected error {:?}", e),
    }
}

#[test]
fn two_passes() {
    let grammar = Grammar::parse(
        "<prog> -> program <identifier> ; var <decs> begin <stats> end
         <decs> -> <identifier> ; <decs> | <identifier> ;
         <stats> -> <identifier> = <digit> ; <stats> | <identifier> = <digit> ;
         <identifier> -> <letter> <identifier> | <letter>
         <letter> -> a | b | c
         <digit> -> 0 | 1",
    )
    .unwrap();
    let validator = Validator::new(grammar, Conventions::default());

    let good: Vec<_> = "program abc ; var ab ; c ; begin ab = 1 ; c = 0 ; end"
        .split_whitespace()
        .collect();
    assert_eq!(validator.validate(&good).unwrap(), vec!["abc", "ab", "c"]);

    let shadowing: Vec<_> = "program ab ; var ab ; c ; begin ab = 1 ; end"
        .split_whitespace()
        .collect();
    assert_eq!(validator.validate(&shadowing).unwrap(), vec!["ab", "ab", "c"]);

    let bad: Vec<_> = "program abc ; var ab ; begin ba = 1 ; end"
        .split_whitespace()
        .collect();
    assert!(validator.check_syntax(&bad).is_ok());
    match validator.validate(&bad) {
        Err(ValidationError::Undeclared(e)) => assert_eq!(e.position(), Some(7)),
        other => panic!("unexpected result {:?}", other),
    }
}
