//! Per-parse memoization of the expensive expression productions.
//!
//! Results are cached by (production, invocation context, start index). A
//! production that is re-entered at the same index while it is still being
//! computed gets its current seed back (initially "no match") instead of
//! recursing forever. Operations use the seed to grow left-recursive chains:
//! the body is re-run with the last successful result as the seed until it
//! stops consuming more tokens.
//!
//! Any frame computed above a re-entered frame read an incomplete seed, so its
//! result is not cached.

use std::collections::HashMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Production {
    Expression,
    Operation,
    SubExpression,
    SuperExpression,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key {
    pub production: Production,
    /// Whether invocations are permitted in this context.
    pub invoke: bool,
    pub index: usize,
}

impl Key {
    pub fn new(production: Production, invoke: bool, index: usize) -> Key {
        Key {
            production,
            invoke,
            index,
        }
    }
}

pub enum Lookup<T> {
    /// A final result computed earlier.
    Cached(T),
    /// The production is already being computed at this index. Holds the
    /// current seed, if one was planted.
    Reentered(Option<T>),
    Fresh,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub hits: usize,
    pub reentries: usize,
    pub cached: usize,
}

struct Frame {
    key: Key,
    /// Read a seed of some frame below it.
    involved: bool,
}

pub struct Memo<T> {
    table: HashMap<Key, T>,
    seeds: HashMap<Key, T>,
    active: Vec<Frame>,
    stats: Stats,
}

impl<T: Clone> Memo<T> {
    pub fn with_capacity(capacity: usize) -> Memo<T> {
        Memo {
            table: HashMap::with_capacity(capacity),
            seeds: HashMap::new(),
            active: Vec::with_capacity(64),
            stats: Stats::default(),
        }
    }

    pub fn lookup(&mut self, key: Key) -> Lookup<T> {
        if let Some(value) = self.table.get(&key) {
            self.stats.hits += 1;
            return Lookup::Cached(value.clone());
        }
        let Some(pos) = self.active.iter().rposition(|frame| frame.key == key) else {
            return Lookup::Fresh;
        };
        self.stats.reentries += 1;
        for frame in &mut self.active[pos + 1..] {
            frame.involved = true;
        }
        Lookup::Reentered(self.seeds.get(&key).cloned())
    }

    /// Marks `key` as being computed.
    pub fn enter(&mut self, key: Key) {
        debug_assert!(
            self.active.iter().all(|frame| frame.key != key),
            "{key:?} entered twice"
        );
        self.active.push(Frame {
            key,
            involved: false,
        });
    }

    pub fn plant_seed(&mut self, key: Key, value: T) {
        self.seeds.insert(key, value);
    }

    /// Finishes the computation of `key`, caching `value` unless it depended
    /// on an incomplete seed.
    pub fn leave(&mut self, key: Key, value: &T) {
        let frame = self.active.pop().expect("leave without enter");
        assert_eq!(frame.key, key, "unbalanced memo frames");
        self.seeds.remove(&key);
        if !frame.involved {
            self.stats.cached += 1;
            self.table.insert(key, value.clone());
        }
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }
}
