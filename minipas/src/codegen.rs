use crate::language::{BEGIN, END, PROGRAM, VAR, WRITE};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("missing `{0}`")]
    MissingKeyword(&'static str),
    #[error("no program name after `program`")]
    MissingName,
}

///! Python translation of a validated program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonProgram {
    pub name: String,
    pub variables: Vec<String>,
    pub statements: Vec<String>,
}

fn position<S: AsRef<str>>(words: &[S], keyword: &'static str) -> Result<usize, CompileError> {
    words
        .iter()
        .position(|w| w.as_ref() == keyword)
        .ok_or(CompileError::MissingKeyword(keyword))
}

fn translate(word: &str) -> &str {
    match word {
        WRITE => "print",
        w => w,
    }
}

impl PythonProgram {
    ///! `words` must have been accepted by the grammar
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Result<PythonProgram, CompileError> {
        let program = position(words, PROGRAM)?;
        let name = words
            .get(program + 1)
            .ok_or(CompileError::MissingName)?
            .as_ref()
            .to_owned();

        let var = position(words, VAR)?;
        let begin = position(words, BEGIN)?;
        let variables = words
            .get(var + 1..begin)
            .unwrap_or(&[])
            .iter()
            .map(|w| w.as_ref())
            .take_while(|w| *w != ":")
            .filter(|w| *w != ",")
            .map(str::to_owned)
            .collect();

        let end = position(words, END)?;
        let body = words.get(begin + 1..end).unwrap_or(&[]);
        let statements = body
            .split(|w| w.as_ref() == ";")
            .filter(|statement| !statement.is_empty())
            .map(|statement| {
                statement
                    .iter()
                    .map(|w| translate(w.as_ref()))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        Ok(PythonProgram {
            name,
            variables,
            statements,
        })
    }

    pub fn file_name(&self) -> String {
        format!("{}.py", self.name)
    }
}

impl fmt::Display for PythonProgram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "# declare variables")?;
        for variable in &self.variables {
            writeln!(f, "{} = int()", variable)?;
        }
        writeln!(f)?;
        writeln!(f, "# logic")?;
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CompileError, PythonProgram};
    use pretty_assertions::assert_eq;

    fn words(text: &str) -> Vec<&str> {
        text.split_whitespace().collect()
    }

    #[test]
    fn translation() {
        let program = PythonProgram::from_words(&words(
            "program p1 ; var a , bb : integer ; begin a = 1 ; bb = a * 2 ; write ( \"value=\" , bb ) ; end.",
        ))
        .unwrap();
        assert_eq!(program.file_name(), "p1.py");
        assert_eq!(program.variables, vec!["a", "bb"]);
        assert_eq!(
            program.to_string(),
            "# declare variables
a = int()
bb = int()

# logic
a = 1
bb = a * 2
print ( \"value=\" , bb )
"
        );
    }

    #[test]
    fn only_whole_words_are_renamed() {
        let program = PythonProgram::from_words(&words(
            "program p ; var rewrite : integer ; begin rewrite = 1 ; write ( rewrite ) ; end.",
        ))
        .unwrap();
        assert_eq!(program.statements, vec!["rewrite = 1", "print ( rewrite )"]);
    }

    #[test]
    fn missing_sections() {
        assert_eq!(
            PythonProgram::from_words(&words("program p ; begin end.")),
            Err(CompileError::MissingKeyword("var"))
        );
        assert_eq!(
            PythonProgram::from_words(&words("program")),
            Err(CompileError::MissingName)
        );
    }
}
