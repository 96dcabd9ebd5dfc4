use indexmap::{IndexMap, IndexSet};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

///! Text used for the end of input marker when it has to be shown
pub const END_MARK: &str = "$";

///! Symbols in a grammar
#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Symbol {
    NonTerminal(String),
    Terminal(String),
    ///! End of input, never written in a rule
    End,
}

impl Symbol {
    ///! `End` counts as a terminal: it is a column of the action table
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Symbol::NonTerminal(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Symbol::NonTerminal(s) | Symbol::Terminal(s) => s,
            Symbol::End => END_MARK,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///! A numbered rule (or production) of a grammar, of the form `lhs -> rhs`.
///! `index` starts at 1 and is the number used by reduce actions.
#[derive(Hash, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rule {
    pub index: usize,
    pub lhs: String,
    pub rhs: Vec<Symbol>,
}

impl Rule {
    ///! The rule as plain strings, the shape accepted by `Grammar::new`
    pub fn to_strings(&self) -> (String, Vec<String>) {
        (
            self.lhs.clone(),
            self.rhs.iter().map(|s| s.as_str().to_owned()).collect(),
        )
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        for symbol in &self.rhs {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

pub type SymbolSet = IndexSet<Symbol>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("the grammar has no productions")]
    Empty,
    #[error("nonterminal {0} is used but has no production")]
    UndefinedNonTerminal(String),
    #[error("grammar line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("no identifier available to bind {0}")]
    NoIdentifiers(String),
}

///! Nonterminal labels are written between angle brackets, like `<prog>`
pub fn is_bracketed(label: &str) -> bool {
    label.len() > 2 && label.starts_with('<') && label.ends_with('>')
}

///! A context free grammar with its vocabularies and FIRST/FOLLOW sets.
///!
///! The start nonterminal is the left hand side of the first rule.
#[derive(Clone, Debug)]
pub struct Grammar {
    rules: Vec<Rule>,
    non_terminals: IndexSet<String>,
    terminals: SymbolSet,
    productions: IndexMap<String, Vec<usize>>,
    first: IndexMap<String, SymbolSet>,
    follow: IndexMap<String, SymbolSet>,
    augmented: Vec<Symbol>,
}

impl Grammar {
    pub fn new<I, L, R, S>(rules: I) -> Result<Grammar, GrammarError>
    where
        I: IntoIterator<Item = (L, R)>,
        L: Into<String>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let raw: Vec<(String, Vec<String>)> = rules
            .into_iter()
            .map(|(lhs, rhs)| (lhs.into(), rhs.into_iter().map(Into::into).collect()))
            .collect();
        if raw.is_empty() {
            return Err(GrammarError::Empty);
        }

        let non_terminals: IndexSet<String> = raw.iter().map(|(lhs, _)| lhs.clone()).collect();
        let rules: Vec<Rule> = raw
            .into_iter()
            .enumerate()
            .map(|(position, (lhs, rhs))| Rule {
                index: position + 1,
                lhs,
                rhs: rhs
                    .into_iter()
                    .map(|s| {
                        if non_terminals.contains(&s) {
                            Symbol::NonTerminal(s)
                        } else {
                            Symbol::Terminal(s)
                        }
                    })
                    .collect(),
            })
            .collect();
        sanity_check(&rules)?;

        let mut terminals = SymbolSet::new();
        for rule in &rules {
            terminals.extend(rule.rhs.iter().filter(|s| s.is_terminal()).cloned());
        }
        terminals.insert(Symbol::End);

        let productions = fold_rules(&rules);
        let first = non_terminals
            .iter()
            .map(|nt| (nt.clone(), first_of(&rules, &productions, nt)))
            .collect();
        let follow = follow_sets(&rules, &non_terminals, &first);
        log::debug!(
            "grammar: {} rules, {} nonterminals, {} terminals",
            rules.len(),
            non_terminals.len(),
            terminals.len()
        );

        let augmented = vec![Symbol::NonTerminal(rules[0].lhs.clone())];
        Ok(Grammar {
            augmented,
            rules,
            non_terminals,
            terminals,
            productions,
            first,
            follow,
        })
    }

    ///! Reads one production per line: `<lhs> -> a <b> c | d`.
    ///! `#` starts a comment line and a lone `|` separates alternatives.
    pub fn parse(text: &str) -> Result<Grammar, GrammarError> {
        let mut rules = Vec::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let syntax = |message: &str| GrammarError::Syntax {
                line: number + 1,
                message: message.to_owned(),
            };
            let (lhs, rhs) = line
                .split_once("->")
                .or_else(|| line.split_once('→'))
                .ok_or_else(|| syntax("expected `->`"))?;
            let lhs = lhs.trim();
            if !is_bracketed(lhs) {
                return Err(syntax("left hand side must look like `<name>`"));
            }
            let mut alternative = Vec::new();
            for word in rhs.split_whitespace() {
                if word == "|" {
                    rules.push((lhs.to_owned(), std::mem::take(&mut alternative)));
                } else {
                    alternative.push(word.to_owned());
                }
            }
            rules.push((lhs.to_owned(), alternative));
        }
        Grammar::new(rules)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    ///! Rule by its 1-based number
    pub fn rule(&self, index: usize) -> Option<&Rule> {
        index.checked_sub(1).and_then(|i| self.rules.get(i))
    }

    ///! Right hand side of rule `index`, rule `0` being the augmented `START -> <start>`
    pub fn right_hand_side(&self, index: usize) -> &[Symbol] {
        match index {
            0 => &self.augmented,
            i => self.rule(i).map(|r| r.rhs.as_slice()).unwrap_or(&[]),
        }
    }

    pub fn start(&self) -> &str {
        &self.rules[0].lhs
    }

    pub fn non_terminals(&self) -> &IndexSet<String> {
        &self.non_terminals
    }

    pub fn terminals(&self) -> &SymbolSet {
        &self.terminals
    }

    pub fn is_non_terminal(&self, label: &str) -> bool {
        self.non_terminals.contains(label)
    }

    ///! Numbers of the rules deriving `non_terminal`, in declaration order
    pub fn productions(&self, non_terminal: &str) -> &[usize] {
        self.productions
            .get(non_terminal)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn first(&self, non_terminal: &str) -> Option<&SymbolSet> {
        self.first.get(non_terminal)
    }

    pub fn follow(&self, non_terminal: &str) -> Option<&SymbolSet> {
        self.follow.get(non_terminal)
    }

    ///! The rules as plain strings, to build a new grammar from
    pub fn to_strings(&self) -> Vec<(String, Vec<String>)> {
        self.rules.iter().map(Rule::to_strings).collect()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{:>3}. {}", rule.index, rule)?;
        }
        Ok(())
    }
}

fn sanity_check(rules: &[Rule]) -> Result<(), GrammarError> {
    for rule in rules {
        for symbol in &rule.rhs {
            if let Symbol::Terminal(t) = symbol {
                if is_bracketed(t) {
                    return Err(GrammarError::UndefinedNonTerminal(t.clone()));
                }
            }
        }
    }
    Ok(())
}

fn fold_rules(rules: &[Rule]) -> IndexMap<String, Vec<usize>> {
    let mut folded = IndexMap::new();
    for rule in rules {
        folded
            .entry(rule.lhs.clone())
            .or_insert_with(Vec::new)
            .push(rule.index);
    }
    folded
}

// Only the leftmost symbol of each alternative is looked at. Nonterminals
// already on the way are not expanded again, which covers direct and
// indirect left recursion.
fn first_of<'a>(
    rules: &'a [Rule],
    productions: &IndexMap<String, Vec<usize>>,
    nt: &'a str,
) -> SymbolSet {
    let mut first = SymbolSet::new();
    let mut visited = IndexSet::new();
    visited.insert(nt);
    let mut stack = vec![(nt, 0)];
    while let Some((current, position)) = stack.pop() {
        let rule = match productions.get(current).and_then(|p| p.get(position)) {
            Some(&rule) => &rules[rule - 1],
            None => continue,
        };
        stack.push((current, position + 1));
        match rule.rhs.first() {
            Some(Symbol::NonTerminal(next)) => {
                if visited.insert(next.as_str()) {
                    stack.push((next.as_str(), 0));
                }
            }
            Some(symbol) => {
                first.insert(symbol.clone());
            }
            None => (),
        }
    }
    first
}

fn follow_sets(
    rules: &[Rule],
    non_terminals: &IndexSet<String>,
    first: &IndexMap<String, SymbolSet>,
) -> IndexMap<String, SymbolSet> {
    let mut sets: IndexMap<String, SymbolSet> = non_terminals
        .iter()
        .map(|nt| (nt.clone(), SymbolSet::new()))
        .collect();
    if let Some((_, start)) = sets.get_index_mut(0) {
        start.insert(Symbol::End);
    }
    loop {
        let mut added_to_set = false;
        for nt in non_terminals {
            let mut to_add = Vec::new();
            for rule in rules {
                for (index, symbol) in rule.rhs.iter().enumerate() {
                    match symbol {
                        Symbol::NonTerminal(s) if s == nt => (),
                        _ => continue,
                    }
                    match rule.rhs.get(index + 1) {
                        None => to_add.extend(sets[&rule.lhs].iter().cloned()),
                        Some(Symbol::NonTerminal(next)) => {
                            to_add.extend(first[next].iter().cloned())
                        }
                        Some(terminal) => to_add.push(terminal.clone()),
                    }
                }
            }
            let set = &mut sets[nt];
            for symbol in to_add {
                added_to_set |= set.insert(symbol);
            }
        }
        if !added_to_set {
            break;
        }
    }
    sets
}
