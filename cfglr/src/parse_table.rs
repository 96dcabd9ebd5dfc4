use crate::automaton::{Automaton, AUGMENTED_RULE};
use crate::grammar::{Grammar, GrammarError, Rule, Symbol, SymbolSet};
use indexmap::{IndexMap, IndexSet};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

///! Action to be taken according to the top state and the next symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Action {
    ///! `Shift(i)` to state `i` by pushing the read symbol on the parse stack
    Shift(usize),
    ///! `Goto(i)` after a reduction produced the column's nonterminal
    Goto(usize),
    ///! `Reduce(i)` apply rule `i` on the stack and use the goto column to check where to go next
    Reduce(usize),
    ///! End of parsing
    Accept,
}

///! Action codes as found in a printed table: `3`, `S3`, `R3` and `ACC`
impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(i) => write!(f, "S{}", i),
            Action::Goto(i) => write!(f, "{}", i),
            Action::Reduce(i) => write!(f, "R{}", i),
            Action::Accept => f.write_str("ACC"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid action code `{0}`")]
pub struct ActionCodeError(pub String);

impl FromStr for Action {
    type Err = ActionCodeError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let invalid = || ActionCodeError(code.to_owned());
        if code == "ACC" {
            return Ok(Action::Accept);
        }
        let (constructor, number): (fn(usize) -> Action, &str) = match code.chars().next() {
            Some('S') => (Action::Shift, &code[1..]),
            Some('R') => (Action::Reduce, &code[1..]),
            Some(_) => (Action::Goto, code),
            None => return Err(invalid()),
        };
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        number.parse().map(constructor).map_err(|_| invalid())
    }
}

///! A parse table: for each state, the action of every symbol having one.
///! The goto table lives in the nonterminal columns.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParseTable {
    rows: Vec<IndexMap<Symbol, Action>>,
    rules: Vec<Rule>,
    terminals: SymbolSet,
    non_terminals: IndexSet<String>,
}

fn write_cell(state: usize, row: &mut IndexMap<Symbol, Action>, symbol: Symbol, action: Action) {
    if let Some(previous) = row.get(&symbol) {
        if *previous != action {
            log::debug!(
                "state {}: {} on {} replaced by {}",
                state,
                previous,
                symbol,
                action
            );
        }
    }
    row.insert(symbol, action);
}

impl ParseTable {
    ///! Cells are written transitions first, then reductions, then accept;
    ///! a later write to the same cell replaces the earlier one.
    pub fn new(grammar: &Grammar, automaton: &Automaton) -> ParseTable {
        let mut rows = vec![IndexMap::new(); automaton.state_count()];
        for (index, state) in automaton.states().iter().enumerate() {
            let row = &mut rows[index];
            if let Some(transitions) = automaton.transitions(index) {
                for (symbol, &target) in transitions {
                    let action = match symbol {
                        Symbol::NonTerminal(_) => Action::Goto(target),
                        _ => Action::Shift(target),
                    };
                    write_cell(index, row, symbol.clone(), action);
                }
            }
            for item in state.items() {
                if item.rule == AUGMENTED_RULE || !item.is_complete(grammar) {
                    continue;
                }
                let follow = grammar
                    .rule(item.rule)
                    .and_then(|rule| grammar.follow(&rule.lhs));
                for terminal in follow.into_iter().flatten() {
                    write_cell(index, row, terminal.clone(), Action::Reduce(item.rule));
                }
            }
            if automaton.accepting() == Some(index) {
                write_cell(index, row, Symbol::End, Action::Accept);
            }
        }
        ParseTable {
            rows,
            rules: grammar.rules().to_vec(),
            terminals: grammar.terminals().clone(),
            non_terminals: grammar.non_terminals().clone(),
        }
    }

    pub fn from_grammar(grammar: &Grammar) -> ParseTable {
        ParseTable::new(grammar, &Automaton::new(grammar))
    }

    ///! Runs the whole pipeline: grammar, automaton, then table
    pub fn from_rules<I, L, R, S>(rules: I) -> Result<ParseTable, GrammarError>
    where
        I: IntoIterator<Item = (L, R)>,
        L: Into<String>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(ParseTable::from_grammar(&Grammar::new(rules)?))
    }

    pub fn action(&self, state: usize, symbol: &Symbol) -> Option<Action> {
        self.rows.get(state).and_then(|row| row.get(symbol)).copied()
    }

    pub fn row(&self, state: usize) -> Option<&IndexMap<Symbol, Action>> {
        self.rows.get(state)
    }

    ///! Terminals (and end of input) having an action in `state`
    pub fn expected(&self, state: usize) -> Vec<&Symbol> {
        self.rows
            .get(state)
            .map(|row| row.keys().filter(|s| s.is_terminal()).collect())
            .unwrap_or_default()
    }

    pub fn is_terminal(&self, word: &str) -> bool {
        self.terminals.contains(&Symbol::Terminal(word.to_owned()))
    }

    pub fn terminals(&self) -> &SymbolSet {
        &self.terminals
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    ///! Rule by its 1-based number
    pub fn rule(&self, index: usize) -> Option<&Rule> {
        index.checked_sub(1).and_then(|i| self.rules.get(i))
    }

    pub fn state_count(&self) -> usize {
        self.rows.len()
    }

    ///! The table as action codes, one map per state, keyed by symbol text
    pub fn codes(&self) -> Vec<IndexMap<String, String>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(symbol, action)| (symbol.to_string(), action.to_string()))
                    .collect()
            })
            .collect()
    }
}

#[cfg(feature = "print_table")]
impl ParseTable {
    pub fn print_tables(&self) {
        use prettytable::{Attr, Cell, Row, Table};

        let mut action_table = Table::new();
        let mut goto_table = Table::new();
        let mut action_header = vec![Cell::new("Action")
            .with_style(Attr::Bold)
            .with_style(Attr::Italic(true))];
        action_header.extend(
            self.terminals
                .iter()
                .map(|t| Cell::new(t.as_str()).with_style(Attr::Bold)),
        );
        action_table.add_row(Row::new(action_header));
        let mut goto_header = vec![Cell::new("Goto")
            .with_style(Attr::Bold)
            .with_style(Attr::Italic(true))];
        goto_header.extend(
            self.non_terminals
                .iter()
                .map(|nt| Cell::new(nt).with_style(Attr::Bold)),
        );
        goto_table.add_row(Row::new(goto_header));

        let cell = |state: usize, symbol: &Symbol| match self.action(state, symbol) {
            Some(action) => Cell::new(&action.to_string()),
            None => Cell::new(""),
        };
        for state in 0..self.state_count() {
            let mut action_row = vec![Cell::new(&format!("{}", state))];
            action_row.extend(self.terminals.iter().map(|t| cell(state, t)));
            action_table.add_row(Row::new(action_row));
            let mut goto_row = vec![Cell::new(&format!("{}", state))];
            goto_row.extend(
                self.non_terminals
                    .iter()
                    .map(|nt| cell(state, &Symbol::NonTerminal(nt.clone()))),
            );
            goto_table.add_row(Row::new(goto_row));
        }
        action_table.printstd();
        goto_table.printstd();
    }
}
