use crate::parser::ParseError;
use std::fmt;

///! Finds the line of `words[position]` in a per-line tokenization of the source.
///!
///! The words around the failing one are used to tell apart several lines
///! holding the same word: a word alone on its line always matches, otherwise
///! the neighbours present on the line have to be the ones of the stream.
///! Returns the 0-based line index.
pub fn locate_line<L, W>(lines: &[Vec<L>], words: &[W], position: usize) -> Option<usize>
where
    L: AsRef<str>,
    W: AsRef<str>,
{
    let current = match words.get(position) {
        Some(word) => word.as_ref(),
        // end of input: the last line with something on it
        None => return lines.iter().rposition(|line| !line.is_empty()),
    };
    let previous = position
        .checked_sub(1)
        .and_then(|p| words.get(p))
        .map(AsRef::as_ref);
    let next = words.get(position + 1).map(AsRef::as_ref);

    let fits = |line: &[L], i: usize| {
        let before = i == 0 || Some(line[i - 1].as_ref()) == previous;
        let after = i + 1 == line.len() || Some(line[i + 1].as_ref()) == next;
        before && after
    };
    lines
        .iter()
        .position(|line| {
            line.iter()
                .enumerate()
                .any(|(i, w)| w.as_ref() == current && fits(&line[..], i))
        })
        .or_else(|| {
            lines
                .iter()
                .position(|line| line.iter().any(|w| w.as_ref() == current))
        })
}

///! A parse error tied to the source line it happened on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    ///! 1-based line number
    pub line: Option<usize>,
    pub source_line: String,
    pub expected: Vec<String>,
    pub got: String,
}

impl Diagnostic {
    ///! `lines` is the per-line tokenization of `source`, `words` the stream
    ///! that was parsed. Errors that do not point at a word give `None`.
    pub fn new<L, W>(
        error: &ParseError,
        source: &str,
        lines: &[Vec<L>],
        words: &[W],
    ) -> Option<Diagnostic>
    where
        L: AsRef<str>,
        W: AsRef<str>,
    {
        match error {
            ParseError::Unexpected {
                position,
                expected,
                got,
            } => {
                let line = locate_line(lines, words, *position);
                let source_line = line
                    .and_then(|l| source.lines().nth(l))
                    .unwrap_or_default()
                    .to_owned();
                Some(Diagnostic {
                    line: line.map(|l| l + 1),
                    source_line,
                    expected: expected.clone(),
                    got: got.clone(),
                })
            }
            ParseError::MissingGoto { .. } | ParseError::InvalidReduce(_) => None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.line {
            Some(line) => writeln!(f, "error on line {}:", line)?,
            None => writeln!(f, "error:")?,
        }
        writeln!(f, "{}", self.source_line)?;
        write!(
            f,
            "expected one of {:?}, but got \"{}\" instead.",
            self.expected, self.got
        )
    }
}
