//! SLR parse tables from context-free grammars, and a shift-reduce driver
//! that can harvest and then check the identifiers a program declares.
//!
//! The pipeline goes from rules to a [`Grammar`](grammar::Grammar), to the
//! [`Automaton`](automaton::Automaton) of its item sets, to a
//! [`ParseTable`](parse_table::ParseTable) a [`Parser`](parser::Parser) runs on.

pub mod automaton;
pub mod diagnostic;
pub mod grammar;
pub mod parse_table;
pub mod parser;
pub mod validate;

pub use crate::diagnostic::Diagnostic;
pub use crate::grammar::{Grammar, GrammarError, Rule, Symbol};
pub use crate::parse_table::{Action, ParseTable};
pub use crate::parser::{Accepted, ParseError, Parser, Sections, Step};
pub use crate::validate::{Conventions, ValidationError, Validator};
