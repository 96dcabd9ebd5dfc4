use crate::grammar::{Symbol, END_MARK};
use crate::parse_table::{Action, ParseTable};
use indexmap::IndexSet;
use std::collections::VecDeque;
use thiserror::Error;

///! Keywords around the declaration window of a program.
///! The window opens at `header` or `declarations` and closes at `body`.
///! The first identifier after `header` is the program name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sections {
    pub header: Option<String>,
    pub declarations: String,
    pub body: String,
}

impl Default for Sections {
    fn default() -> Self {
        Sections {
            header: Some("program".to_owned()),
            declarations: "var".to_owned(),
            body: "begin".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    ///! `position` is the index of the offending word, or the word count at end of input
    #[error("expected one of {expected:?}, but got \"{got}\" instead")]
    Unexpected {
        position: usize,
        expected: Vec<String>,
        got: String,
    },
    #[error("state {state} has no goto on {non_terminal}")]
    MissingGoto { state: usize, non_terminal: String },
    #[error("rule {0} cannot be reduced")]
    InvalidReduce(usize),
}

impl ParseError {
    ///! Index of the input word the error was detected on
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::Unexpected { position, .. } => Some(*position),
            _ => None,
        }
    }
}

///! What a single step of the parser did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Shift(usize),
    Reduce(usize),
    Goto(usize),
    Accept,
    Error(ParseError),
}

///! A successful parse, with the names seen in the declaration window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    ///! First identifier after the header keyword
    pub program_name: Option<String>,
    ///! Identifiers after the declarations keyword, and any later in the header
    pub identifiers: Vec<String>,
}

impl Accepted {
    ///! Program name first, then the declared identifiers. A declared
    ///! identifier may repeat the program name.
    pub fn names(self) -> Vec<String> {
        self.program_name.into_iter().chain(self.identifiers).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    Closed,
    Header,
    Declarations,
}

#[derive(Debug, Clone)]
struct Pending {
    symbol: Symbol,
    word: usize,
    scanned: bool,
}

///! A shift-reduce parser running a word stream against a ParseTable
pub struct Parser<'t> {
    table: &'t ParseTable,
    words: Vec<String>,
    input: VecDeque<Pending>,
    states: Vec<usize>,
    symbols: Vec<Symbol>,
    pending_goto: Option<String>,
    sections: Option<Sections>,
    window: Window,
    program_name: Option<String>,
    identifiers: IndexSet<String>,
    outcome: Option<Step>,
}

impl<'t> Parser<'t> {
    ///! The end of input marker is appended to `words`
    pub fn new<I, S>(table: &'t ParseTable, words: I) -> Parser<'t>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        let mut input: VecDeque<Pending> = words
            .iter()
            .enumerate()
            .map(|(word, text)| Pending {
                symbol: Symbol::Terminal(text.clone()),
                word,
                scanned: false,
            })
            .collect();
        input.push_back(Pending {
            symbol: Symbol::End,
            word: words.len(),
            scanned: true,
        });
        Parser {
            table,
            words,
            input,
            states: vec![0],
            symbols: Vec::new(),
            pending_goto: None,
            sections: None,
            window: Window::Closed,
            program_name: None,
            identifiers: IndexSet::new(),
            outcome: None,
        }
    }

    ///! Watch for the declaration window and record the identifiers declared in it
    pub fn with_sensing(mut self, sections: Sections) -> Self {
        self.sections = Some(sections);
        self
    }

    ///! Identifiers already known, typically harvested by an earlier parse
    pub fn with_known<I, S>(mut self, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifiers.extend(identifiers.into_iter().map(Into::into));
        self
    }

    ///! States of the stack, bottom first
    pub fn states(&self) -> &[usize] {
        &self.states
    }

    ///! Symbols of the stack, bottom first; they sit between consecutive states
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn program_name(&self) -> Option<&str> {
        self.program_name.as_deref()
    }

    pub fn identifiers(&self) -> &IndexSet<String> {
        &self.identifiers
    }

    pub fn run(mut self) -> Result<Accepted, ParseError> {
        loop {
            match self.step() {
                Step::Accept => {
                    return Ok(Accepted {
                        program_name: self.program_name,
                        identifiers: self.identifiers.into_iter().collect(),
                    })
                }
                Step::Error(e) => return Err(e),
                _ => (),
            }
        }
    }

    ///! Performs one action. Once the parse accepted or failed, the same
    ///! outcome is returned again.
    pub fn step(&mut self) -> Step {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        let step = match self.pending_goto.take() {
            Some(non_terminal) => self.goto(non_terminal),
            None => {
                self.scan();
                self.act()
            }
        };
        log::trace!("{:?} -> {:?}", self.states, step);
        if let Step::Accept | Step::Error(_) = step {
            self.outcome = Some(step.clone());
        }
        step
    }

    fn top(&self) -> usize {
        self.states.last().copied().unwrap_or(0)
    }

    fn act(&mut self) -> Step {
        let state = self.top();
        let lookahead = match self.input.front() {
            Some(pending) => pending.symbol.clone(),
            None => Symbol::End,
        };
        match self.table.action(state, &lookahead) {
            Some(Action::Shift(next)) => {
                self.input.pop_front();
                self.symbols.push(lookahead);
                self.states.push(next);
                Step::Shift(next)
            }
            Some(Action::Reduce(rule)) => self.reduce(rule),
            Some(Action::Accept) => Step::Accept,
            Some(Action::Goto(_)) | None => Step::Error(self.unexpected(state)),
        }
    }

    // The stack alternates states and symbols, so a rule of length n
    // takes n symbols and the n states above them.
    fn reduce(&mut self, index: usize) -> Step {
        let table = self.table;
        let rule = match table.rule(index) {
            Some(rule) if rule.rhs.len() <= self.symbols.len() => rule,
            _ => return Step::Error(ParseError::InvalidReduce(index)),
        };
        let keep = self.symbols.len() - rule.rhs.len();
        self.symbols.truncate(keep);
        self.states.truncate(keep + 1);
        self.symbols.push(Symbol::NonTerminal(rule.lhs.clone()));
        self.pending_goto = Some(rule.lhs.clone());
        Step::Reduce(index)
    }

    fn goto(&mut self, non_terminal: String) -> Step {
        let state = self.top();
        match self
            .table
            .action(state, &Symbol::NonTerminal(non_terminal.clone()))
        {
            Some(Action::Goto(next)) => {
                self.states.push(next);
                Step::Goto(next)
            }
            _ => Step::Error(ParseError::MissingGoto {
                state,
                non_terminal,
            }),
        }
    }

    fn unexpected(&self, state: usize) -> ParseError {
        let position = self.input.front().map_or(self.words.len(), |p| p.word);
        ParseError::Unexpected {
            position,
            expected: self
                .table
                .expected(state)
                .into_iter()
                .map(ToString::to_string)
                .collect(),
            got: self
                .words
                .get(position)
                .cloned()
                .unwrap_or_else(|| END_MARK.to_owned()),
        }
    }

    fn decomposing(&self) -> bool {
        self.window != Window::Closed
            || self.program_name.is_some()
            || !self.identifiers.is_empty()
    }

    ///! Looks at the next word the first time it comes up: follows the
    ///! declaration window, records identifiers, and splits words that are
    ///! not terminals into characters when decomposition is on.
    fn scan(&mut self) {
        let (word, index) = match self.input.front_mut() {
            Some(pending) if !pending.scanned => {
                pending.scanned = true;
                match &pending.symbol {
                    Symbol::Terminal(word) => (word.clone(), pending.word),
                    _ => return,
                }
            }
            _ => return,
        };
        let is_terminal = self.table.is_terminal(&word);

        if let Some(sections) = &self.sections {
            if sections.header.as_ref() == Some(&word) {
                self.window = Window::Header;
            } else if sections.declarations == word {
                self.window = Window::Declarations;
            } else if sections.body == word {
                self.window = Window::Closed;
            } else if self.window != Window::Closed && is_identifier(&word, is_terminal) {
                if self.window == Window::Header && self.program_name.is_none() {
                    log::debug!("recorded program name {}", word);
                    self.program_name = Some(word.clone());
                } else {
                    log::debug!("recorded identifier {}", word);
                    self.identifiers.insert(word.clone());
                }
            }
        }

        if !is_terminal && self.decomposing() && word.chars().count() > 1 {
            self.input.pop_front();
            for c in word.chars().rev() {
                self.input.push_front(Pending {
                    symbol: Symbol::Terminal(c.to_string()),
                    word: index,
                    scanned: true,
                });
            }
        }
    }
}

///! Identifiers are the words the grammar does not know as a whole,
///! and single letters or digits
fn is_identifier(word: &str, is_terminal: bool) -> bool {
    let mut chars = word.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.is_alphanumeric(),
        (Some(_), Some(_)) => !is_terminal,
        (None, _) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{is_identifier, Accepted, ParseError, Parser, Sections, Step};
    use crate::grammar::Symbol;
    use crate::parse_table::ParseTable;
    use lazy_static::lazy_static;
    use pretty_assertions::assert_eq;

    lazy_static! {
        static ref SUM_TABLE: ParseTable = ParseTable::from_rules(vec![
            ("<E>", vec!["<T>", "+", "<E>"]),
            ("<E>", vec!["<T>"]),
            ("<T>", vec!["id"]),
        ])
        .unwrap();
        static ref PROGRAM_TABLE: ParseTable = ParseTable::from_rules(vec![
            (
                "<prog>",
                vec!["program", "<identifier>", ";", "var", "<dec>", "begin", "<stats>", "end"],
            ),
            ("<dec>", vec!["<identifier>", ",", "<dec>"]),
            ("<dec>", vec!["<identifier>", ";"]),
            ("<stats>", vec!["<identifier>", ";", "<stats>"]),
            ("<stats>", vec!["<identifier>", ";"]),
            ("<identifier>", vec!["<letter>", "<identifier>"]),
            ("<identifier>", vec!["<letter>"]),
            ("<letter>", vec!["a"]),
            ("<letter>", vec!["b"]),
            ("<letter>", vec!["x"]),
            ("<letter>", vec!["y"]),
        ])
        .unwrap();
    }

    fn words(text: &str) -> Vec<&str> {
        text.split_whitespace().collect()
    }

    fn trace(parser: &mut Parser) -> Vec<Step> {
        let mut steps = Vec::new();
        loop {
            let step = parser.step();
            let done = matches!(step, Step::Accept | Step::Error(_));
            steps.push(step);
            if done {
                return steps;
            }
        }
    }

    #[test]
    fn shift_reduce_trace() {
        let mut parser = Parser::new(&SUM_TABLE, words("id + id"));
        assert_eq!(
            trace(&mut parser),
            vec![
                Step::Shift(3),
                Step::Reduce(3),
                Step::Goto(2),
                Step::Shift(4),
                Step::Shift(3),
                Step::Reduce(3),
                Step::Goto(2),
                Step::Reduce(2),
                Step::Goto(5),
                Step::Reduce(1),
                Step::Goto(1),
                Step::Accept,
            ]
        );
        assert_eq!(parser.states(), &[0, 1]);
        assert_eq!(parser.symbols(), &[Symbol::NonTerminal("<E>".to_owned())]);
        // finished parsers keep answering the same
        assert_eq!(parser.step(), Step::Accept);
    }

    #[test]
    fn unexpected_token() {
        let err = Parser::new(&SUM_TABLE, words("id id")).run().unwrap_err();
        assert_eq!(
            err,
            ParseError::Unexpected {
                position: 1,
                expected: vec!["+".to_owned(), "$".to_owned()],
                got: "id".to_owned(),
            }
        );
        assert_eq!(err.position(), Some(1));
        assert_eq!(
            err.to_string(),
            "expected one of [\"+\", \"$\"], but got \"id\" instead"
        );
    }

    #[test]
    fn unexpected_end() {
        let err = Parser::new(&SUM_TABLE, words("id +")).run().unwrap_err();
        assert_eq!(
            err,
            ParseError::Unexpected {
                position: 2,
                expected: vec!["id".to_owned()],
                got: "$".to_owned(),
            }
        );
        let empty: Vec<String> = Vec::new();
        assert!(Parser::new(&SUM_TABLE, empty).run().is_err());
    }

    #[test]
    fn derivations_are_accepted() {
        for input in &["id", "id + id", "id + id + id + id"] {
            assert_eq!(
                Parser::new(&SUM_TABLE, words(input)).run(),
                Ok(Accepted {
                    program_name: None,
                    identifiers: Vec::new()
                }),
                "{}",
                input
            );
        }
    }

    #[test]
    fn whole_words_without_sensing() {
        let err = Parser::new(&PROGRAM_TABLE, words("program ab ; var x ; begin x ; end"))
            .run()
            .unwrap_err();
        assert_eq!(err.position(), Some(1));
    }

    #[test]
    fn sensing_splits_and_records() {
        let accepted = Parser::new(
            &PROGRAM_TABLE,
            words("program ab ; var x , yy ; begin x ; yy ; xa ; end"),
        )
        .with_sensing(Sections::default())
        .run()
        .unwrap();
        assert_eq!(accepted.program_name.as_deref(), Some("ab"));
        assert_eq!(accepted.identifiers, vec!["x", "yy"]);
        assert_eq!(accepted.names(), vec!["ab", "x", "yy"]);
    }

    #[test]
    fn program_name_kept_apart() {
        let accepted = Parser::new(
            &PROGRAM_TABLE,
            words("program ab ; var ab , x ; begin ab ; x ; end"),
        )
        .with_sensing(Sections::default())
        .run()
        .unwrap();
        assert_eq!(accepted.program_name.as_deref(), Some("ab"));
        assert_eq!(accepted.identifiers, vec!["ab", "x"]);
        assert_eq!(accepted.names(), vec!["ab", "ab", "x"]);
    }

    #[test]
    fn error_reports_whole_word() {
        let err = Parser::new(
            &PROGRAM_TABLE,
            words("program ab ; var x ; begin x ; aq ; end"),
        )
        .with_sensing(Sections::default())
        .run()
        .unwrap_err();
        match err {
            ParseError::Unexpected { position, got, .. } => {
                assert_eq!(position, 9);
                assert_eq!(got, "aq");
            }
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn known_identifiers_enable_splitting() {
        let input = words("program ab ; var x ; begin ab ; end");
        assert!(Parser::new(&PROGRAM_TABLE, input.clone()).run().is_err());
        let mut parser = Parser::new(&PROGRAM_TABLE, input).with_known(vec!["ab"]);
        assert_eq!(parser.identifiers().len(), 1);
        assert!(trace(&mut parser).ends_with(&[Step::Accept]));
    }

    #[test]
    fn identifier_candidates() {
        assert!(is_identifier("a", true));
        assert!(is_identifier("7", true));
        assert!(is_identifier("abc", false));
        assert!(!is_identifier("integer", true));
        assert!(!is_identifier(";", true));
        assert!(!is_identifier("", false));
    }
}
