///! A word of the source and the 0-based line it starts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub text: String,
    pub line: usize,
}

impl Word {
    fn new(text: impl Into<String>, line: usize) -> Self {
        Word {
            text: text.into(),
            line,
        }
    }
}

///! Opens and closes comments
pub const COMMENT: &str = "**";

fn is_blank(c: char) -> bool {
    match c {
        ' ' | '\t' | '\r' | '\n' => true,
        _ => false,
    }
}

fn is_quote(s: &str) -> bool {
    match s {
        "\"" | "\u{201c}" | "\u{201d}" => true,
        _ => false,
    }
}

///! Alphanumeric runs are words, any other character but blanks is a word by itself
fn split_words(source: &str) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut line = 0;
    for c in source.chars() {
        if c.is_alphanumeric() {
            current.push(c);
            continue;
        }
        if !current.is_empty() {
            words.push(Word::new(std::mem::take(&mut current), line));
        }
        if c == '\n' {
            line += 1;
        } else if !is_blank(c) {
            words.push(Word::new(c.to_string(), line));
        }
    }
    if !current.is_empty() {
        words.push(Word::new(current, line));
    }
    words
}

///! `*` `*` becomes `**`, pairing stars from the left
fn merge_stars(words: Vec<Word>) -> Vec<Word> {
    let mut merged: Vec<Word> = Vec::with_capacity(words.len());
    let mut pending_star = false;
    for word in words {
        if word.text == "*" {
            if pending_star {
                if let Some(star) = merged.last_mut() {
                    star.text = COMMENT.to_owned();
                }
                pending_star = false;
                continue;
            }
            pending_star = true;
        } else {
            pending_star = false;
        }
        merged.push(word);
    }
    merged
}

///! Drops everything between two `**`. An unterminated comment runs to the end.
fn strip_comments(words: Vec<Word>) -> Vec<Word> {
    let mut in_comment = false;
    words
        .into_iter()
        .filter(|word| {
            if word.text == COMMENT {
                in_comment = !in_comment;
                return false;
            }
            !in_comment
        })
        .collect()
}

///! Puts back together the words the splitting broke: `"value="` and `end.`
fn fix_literals(words: Vec<Word>) -> Vec<Word> {
    let mut fixed: Vec<Word> = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        let text = |offset: usize| words.get(i + offset).map(|w| w.text.as_str());
        if is_quote(&words[i].text)
            && text(1) == Some("value")
            && text(2) == Some("=")
            && text(3).map_or(false, is_quote)
        {
            fixed.push(Word::new("\"value=\"", words[i].line));
            i += 4;
        } else if words[i].text == "end" && text(1) == Some(".") {
            fixed.push(Word::new("end.", words[i].line));
            i += 2;
        } else {
            fixed.push(words[i].clone());
            i += 1;
        }
    }
    fixed
}

///! Splits a program into the words the grammar is written in
pub fn tokenize(source: &str) -> Vec<Word> {
    let words = fix_literals(strip_comments(merge_stars(split_words(source))));
    log::debug!("{} words", words.len());
    words
}

pub fn texts(words: &[Word]) -> Vec<String> {
    words.iter().map(|w| w.text.clone()).collect()
}

///! The words of each line of `source`, commented lines left empty
pub fn lines(source: &str, words: &[Word]) -> Vec<Vec<String>> {
    let count = words
        .last()
        .map_or(0, |w| w.line + 1)
        .max(source.lines().count());
    let mut lines = vec![Vec::new(); count];
    for word in words {
        lines[word.line].push(word.text.clone());
    }
    lines
}

///! One line of space separated words per source line holding any
pub fn render(lines: &[Vec<String>]) -> String {
    lines
        .iter()
        .filter(|line| !line.is_empty())
        .map(|line| line.join(" ") + "\n")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{lines, merge_stars, render, split_words, texts, tokenize, Word};
    use pretty_assertions::assert_eq;

    fn words(source: &str) -> Vec<String> {
        texts(&tokenize(source))
    }

    #[test]
    fn alphanumeric_runs() {
        assert_eq!(
            texts(&split_words("lorem ipsum;dolor 100 sit*amet200")),
            vec!["lorem", "ipsum", ";", "dolor", "100", "sit", "*", "amet200"]
        );
    }

    #[test]
    fn line_numbers() {
        assert_eq!(
            split_words("a\n\nb c\n"),
            vec![Word::new("a", 0), Word::new("b", 2), Word::new("c", 2)]
        );
    }

    #[test]
    fn stars() {
        let merged = merge_stars(split_words("lorem *** ipsum * x"));
        assert_eq!(texts(&merged), vec!["lorem", "**", "*", "ipsum", "*", "x"]);
    }

    #[test]
    fn comments() {
        assert_eq!(words("a ** note ** b"), vec!["a", "b"]);
        assert_eq!(words("a **note\nmore** b ; ** open"), vec!["a", "b", ";"]);
        assert_eq!(words("a * b"), vec!["a", "*", "b"]);
    }

    #[test]
    fn literals() {
        assert_eq!(
            words("write(\"value=\", x);\nend."),
            vec!["write", "(", "\"value=\"", ",", "x", ")", ";", "end."]
        );
        assert_eq!(
            words("write(\u{201c}value=\u{201d}, x);"),
            vec!["write", "(", "\"value=\"", ",", "x", ")", ";"]
        );
        assert_eq!(words("end ; end"), vec!["end", ";", "end"]);
    }

    #[test]
    fn words_per_line() {
        let source = "program p ;\n** header\nstill comment **\nvar a : integer ;";
        let tokens = tokenize(source);
        assert_eq!(
            lines(source, &tokens),
            vec![
                vec!["program", "p", ";"],
                vec![],
                vec![],
                vec!["var", "a", ":", "integer", ";"],
            ]
        );
    }

    #[test]
    fn rendered_words() {
        let source = "program p;\n** note **\nvar a:integer;\nbegin\nwrite(\"value=\",a);\nend.";
        assert_eq!(
            render(&lines(source, &tokenize(source))),
            "program p ;\nvar a : integer ;\nbegin\nwrite ( \"value=\" , a ) ;\nend.\n"
        );
    }
}
