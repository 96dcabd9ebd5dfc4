use crate::grammar::{Grammar, Symbol};
use indexmap::{IndexMap, IndexSet};
use std::collections::{BTreeSet, HashMap, VecDeque};

///! Number of the augmented rule `START -> <start>` in items
pub const AUGMENTED_RULE: usize = 0;

///! A rule with a cursor marking how much of its right hand side was matched
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Item {
    pub rule: usize,
    pub cursor: usize,
}

impl Item {
    pub fn new(rule: usize) -> Self {
        Item { rule, cursor: 0 }
    }

    ///! Symbol right after the cursor, `None` when the item is complete
    pub fn next_symbol<'g>(&self, grammar: &'g Grammar) -> Option<&'g Symbol> {
        grammar.right_hand_side(self.rule).get(self.cursor)
    }

    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        self.cursor >= grammar.right_hand_side(self.rule).len()
    }

    fn advance(self) -> Self {
        Item {
            rule: self.rule,
            cursor: self.cursor + 1,
        }
    }
}

///! A state of the automaton: the items it was reached with, and their closure
#[derive(Clone, Debug)]
pub struct State {
    kernel: Vec<Item>,
    items: Vec<Item>,
}

impl State {
    pub fn kernel(&self) -> &[Item] {
        &self.kernel
    }

    ///! Every item of the state, kernel first, in closure order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    fn key(&self) -> BTreeSet<Item> {
        self.items.iter().copied().collect()
    }
}

///! The canonical collection of item sets with the transitions between them.
///! State `0` is the closure of `START -> • <start>`.
#[derive(Clone, Debug)]
pub struct Automaton {
    states: Vec<State>,
    transitions: Vec<IndexMap<Symbol, usize>>,
    accepting: Option<usize>,
}

fn closure(grammar: &Grammar, kernel: &[Item]) -> Vec<Item> {
    let mut closed: IndexSet<Item> = kernel.iter().copied().collect();
    let mut index = 0;
    while let Some(item) = closed.get_index(index).copied() {
        if let Some(Symbol::NonTerminal(nt)) = item.next_symbol(grammar) {
            for &rule in grammar.productions(nt) {
                closed.insert(Item::new(rule));
            }
        }
        index += 1;
    }
    closed.into_iter().collect()
}

///! Items of `items` whose cursor sits right before `symbol`, with the cursor moved past it
fn goto(grammar: &Grammar, items: &[Item], symbol: &Symbol) -> Vec<Item> {
    items
        .iter()
        .filter(|item| item.next_symbol(grammar) == Some(symbol))
        .map(|item| item.advance())
        .collect()
}

impl Automaton {
    pub fn new(grammar: &Grammar) -> Automaton {
        let start_kernel = vec![Item::new(AUGMENTED_RULE)];
        let start = State {
            items: closure(grammar, &start_kernel),
            kernel: start_kernel,
        };
        let mut known = HashMap::new();
        known.insert(start.key(), 0);
        let mut automaton = Automaton {
            states: vec![start],
            transitions: vec![IndexMap::new()],
            accepting: None,
        };

        let mut queue = VecDeque::new();
        queue.push_back(0);
        while let Some(state) = queue.pop_front() {
            let items = automaton.states[state].items.clone();
            let paths: IndexSet<&Symbol> = items
                .iter()
                .filter_map(|item| item.next_symbol(grammar))
                .collect();
            for symbol in paths {
                let kernel = goto(grammar, &items, symbol);
                let next = State {
                    items: closure(grammar, &kernel),
                    kernel,
                };
                let key = next.key();
                let target = match known.get(&key) {
                    Some(&target) => target,
                    None => {
                        let target = automaton.states.len();
                        automaton.states.push(next);
                        automaton.transitions.push(IndexMap::new());
                        known.insert(key, target);
                        queue.push_back(target);
                        target
                    }
                };
                automaton.transitions[state].insert(symbol.clone(), target);
            }
        }

        let accept_item = Item::new(AUGMENTED_RULE).advance();
        automaton.accepting = automaton
            .states
            .iter()
            .position(|s| s.items.contains(&accept_item));
        log::debug!("automaton: {} states", automaton.states.len());
        automaton
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    ///! Outgoing transitions of `state`, in the order they were discovered
    pub fn transitions(&self, state: usize) -> Option<&IndexMap<Symbol, usize>> {
        self.transitions.get(state)
    }

    pub fn target(&self, state: usize, symbol: &Symbol) -> Option<usize> {
        self.transitions
            .get(state)
            .and_then(|t| t.get(symbol))
            .copied()
    }

    ///! The state holding `START -> <start> •`
    pub fn accepting(&self) -> Option<usize> {
        self.accepting
    }
}
