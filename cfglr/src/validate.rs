use crate::grammar::{Grammar, GrammarError};
use crate::parse_table::ParseTable;
use crate::parser::{Accepted, ParseError, Parser, Sections};
use thiserror::Error;

///! Names the two-pass check relies on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conventions {
    ///! Nonterminal scanning identifiers character by character
    pub identifier: String,
    ///! Nonterminal introduced for the program name in the second pass
    pub program_name: String,
    pub sections: Sections,
}

impl Default for Conventions {
    fn default() -> Self {
        Conventions {
            identifier: "<identifier>".to_owned(),
            program_name: "<program-name>".to_owned(),
            sections: Sections::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error("syntax error: {0}")]
    Syntax(ParseError),
    #[error("undeclared identifier: {0}")]
    Undeclared(ParseError),
}

impl ValidationError {
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            ValidationError::Syntax(e) | ValidationError::Undeclared(e) => Some(e),
            ValidationError::Grammar(_) => None,
        }
    }
}

///! Builds a new rule sequence where identifiers are the declared names.
///!
///! The first identifier is the program name: it replaces the identifier in
///! the first start rule through `conventions.program_name`. Every production
///! of `conventions.identifier` is dropped and replaced by one rule per
///! remaining identifier, the program name included if it was declared too.
pub fn specialize(
    grammar: &Grammar,
    conventions: &Conventions,
    identifiers: &[String],
) -> Result<Grammar, GrammarError> {
    let (program, declared) = identifiers
        .split_first()
        .ok_or_else(|| GrammarError::NoIdentifiers(conventions.program_name.clone()))?;
    if declared.is_empty() {
        return Err(GrammarError::NoIdentifiers(conventions.identifier.clone()));
    }

    let mut start_seen = false;
    let mut rules = Vec::new();
    for rule in grammar.rules() {
        if rule.lhs == conventions.identifier {
            continue;
        }
        let (lhs, mut rhs) = rule.to_strings();
        if !start_seen && lhs == grammar.start() {
            start_seen = true;
            if let Some(slot) = rhs.iter_mut().find(|s| **s == conventions.identifier) {
                *slot = conventions.program_name.clone();
            }
        }
        rules.push((lhs, rhs));
    }
    rules.push((conventions.program_name.clone(), vec![program.clone()]));
    rules.extend(
        declared
            .iter()
            .map(|name| (conventions.identifier.clone(), vec![name.clone()])),
    );
    Grammar::new(rules)
}

///! Checks programs in two passes: syntax against the grammar as written,
///! then identifiers against a grammar specialized to the declared names.
pub struct Validator {
    grammar: Grammar,
    table: ParseTable,
    conventions: Conventions,
}

impl Validator {
    pub fn new(grammar: Grammar, conventions: Conventions) -> Validator {
        let table = ParseTable::from_grammar(&grammar);
        Validator {
            grammar,
            table,
            conventions,
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    ///! Table of the first pass
    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    ///! First pass; returns the harvested identifiers, program name first
    pub fn check_syntax<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<String>, ParseError> {
        log::debug!("pass 1: {} words against {} states", words.len(), self.table.state_count());
        Parser::new(&self.table, words.iter().map(|w| w.as_ref()))
            .with_sensing(self.conventions.sections.clone())
            .run()
            .map(Accepted::names)
    }

    ///! Second pass, on a table rebuilt from the specialized grammar
    pub fn check_declarations<S: AsRef<str>>(
        &self,
        words: &[S],
        identifiers: &[String],
    ) -> Result<(), ValidationError> {
        let grammar = specialize(&self.grammar, &self.conventions, identifiers)?;
        let table = ParseTable::from_grammar(&grammar);
        log::debug!(
            "pass 2: {} identifiers, {} states",
            identifiers.len(),
            table.state_count()
        );
        Parser::new(&table, words.iter().map(|w| w.as_ref()))
            .with_known(identifiers.iter().cloned())
            .run()
            .map(|_| ())
            .map_err(ValidationError::Undeclared)
    }

    ///! Both passes; the second one only runs when the first one accepted
    pub fn validate<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<String>, ValidationError> {
        let identifiers = self.check_syntax(words).map_err(ValidationError::Syntax)?;
        self.check_declarations(words, &identifiers)?;
        Ok(identifiers)
    }
}
