//! A small pascal-like language checked with `cfglr` tables and compiled to python.
//!
//! Programs go through two passes: the first one checks the syntax and
//! collects the declared identifiers, the second one rejects identifiers that
//! were never declared. Only then is python generated.

pub mod codegen;
pub mod language;
pub mod lexer;

use cfglr::{Diagnostic, ParseError, ValidationError, Validator};
use codegen::{CompileError, PythonProgram};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("syntax {0}")]
    Syntax(Diagnostic),
    #[error("undeclared identifier, {0}")]
    Undeclared(Diagnostic),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

fn locate(
    error: &ParseError,
    source: &str,
    words: &[lexer::Word],
    texts: &[String],
) -> Option<Diagnostic> {
    Diagnostic::new(error, source, &lexer::lines(source, words), texts)
}

///! Runs both passes over `source`; returns its words
pub fn check(validator: &Validator, source: &str) -> Result<Vec<String>, Error> {
    let words = lexer::tokenize(source);
    let texts = lexer::texts(&words);
    match validator.validate(&texts) {
        Ok(identifiers) => {
            log::info!("declared identifiers: {:?}", identifiers);
            Ok(texts)
        }
        Err(ValidationError::Syntax(e)) => Err(match locate(&e, source, &words, &texts) {
            Some(diagnostic) => Error::Syntax(diagnostic),
            None => ValidationError::Syntax(e).into(),
        }),
        Err(ValidationError::Undeclared(e)) => Err(match locate(&e, source, &words, &texts) {
            Some(diagnostic) => Error::Undeclared(diagnostic),
            None => ValidationError::Undeclared(e).into(),
        }),
        Err(e) => Err(e.into()),
    }
}

pub fn compile(validator: &Validator, source: &str) -> Result<PythonProgram, Error> {
    let words = check(validator, source)?;
    Ok(PythonProgram::from_words(&words)?)
}
