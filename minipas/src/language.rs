use cfglr::{Conventions, Grammar, GrammarError, Sections};

pub const PROGRAM: &str = "program";
pub const VAR: &str = "var";
pub const BEGIN: &str = "begin";
pub const END: &str = "end.";
pub const WRITE: &str = "write";

///! The language, with identifiers and numbers spelled out character by character
pub const GRAMMAR: &str = r#"
# minipas
<prog> -> program <identifier> ; var <dec-list> begin <stat-list> end.
<dec-list> -> <dec> : <type> ;
<dec> -> <identifier> , <dec> | <identifier>
<type> -> integer
<stat-list> -> <stat> <stat-list> | <stat>
<stat> -> <write> | <assign>
<write> -> write ( <str> <identifier> ) ; | write ( <identifier> ) ;
<str> -> "value=" ,
<assign> -> <identifier> = <expr> ;
<expr> -> <expr> + <term> | <expr> - <term> | <term>
<term> -> <term> * <factor> | <term> / <factor> | <factor>
<factor> -> <identifier> | <number> | ( <expr> )
<number> -> <sign> <digits> | <digits>
<sign> -> + | -
<digits> -> <digit> <digits> | <digit>
<digit> -> 0 | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 | 9
<identifier> -> <letter> <id-tail> | <letter>
<id-tail> -> <letter> <id-tail> | <digit> <id-tail> | <letter> | <digit>
<letter> -> a | b | c | d | e | f | g | h | i | j | k | l | m
<letter> -> n | o | p | q | r | s | t | u | v | w | x | y | z
"#;

pub fn grammar() -> Result<Grammar, GrammarError> {
    Grammar::parse(GRAMMAR)
}

pub fn conventions() -> Conventions {
    Conventions {
        sections: Sections {
            header: Some(PROGRAM.to_owned()),
            declarations: VAR.to_owned(),
            body: BEGIN.to_owned(),
        },
        ..Conventions::default()
    }
}

#[cfg(test)]
mod tests {
    use super::{conventions, grammar};
    use cfglr::{Action, ParseTable, Symbol};
    use pretty_assertions::assert_eq;

    #[test]
    fn builds() {
        let grammar = grammar().unwrap();
        assert_eq!(grammar.start(), "<prog>");
        assert_eq!(grammar.productions("<letter>").len(), 26);
        assert_eq!(grammar.productions("<digit>").len(), 10);
        assert!(grammar.terminals().contains(&Symbol::Terminal("end.".to_owned())));
        assert!(grammar
            .terminals()
            .contains(&Symbol::Terminal("\"value=\"".to_owned())));
    }

    #[test]
    fn starts_with_program() {
        let table = ParseTable::from_grammar(&grammar().unwrap());
        assert!(matches!(
            table.action(0, &Symbol::Terminal("program".to_owned())),
            Some(Action::Shift(_))
        ));
        assert_eq!(table.expected(0).len(), 1);
    }

    #[test]
    fn keywords() {
        let conventions = conventions();
        assert_eq!(conventions.identifier, "<identifier>");
        assert_eq!(conventions.sections.body, "begin");
    }
}
