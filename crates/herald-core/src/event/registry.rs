use std::collections::{BTreeMap, HashMap};

use crate::event::listener::Callable;

/// Listeners of one event name grouped by priority, lowest first.
pub type PriorityBuckets = BTreeMap<i32, Vec<ListenerEntry>>;

/// A callable registered under one event name.
#[derive(Debug, Clone)]
pub struct ListenerEntry {
    callable: Callable,
    priority: i32,
    pass_params: bool,
    owner: Option<usize>,
}

impl ListenerEntry {
    pub fn new(callable: Callable, priority: i32, pass_params: bool) -> Self {
        Self { callable, priority, pass_params, owner: None }
    }

    /// Mark the entry as produced by the declarative listener identified by `owner`
    pub(crate) fn owned_by(mut self, owner: usize) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn callable(&self) -> &Callable {
        &self.callable
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn pass_params(&self) -> bool {
        self.pass_params
    }

    /// Whether this entry came from a declarative listener
    pub fn is_declared(&self) -> bool {
        self.owner.is_some()
    }
}

/// Per-scope store of listeners: event name -> priority buckets.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: HashMap<String, PriorityBuckets>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self { listeners: HashMap::new() }
    }

    /// Append an entry to the end of its priority bucket
    pub fn insert(&mut self, event_name: &str, entry: ListenerEntry) {
        self.listeners
            .entry(event_name.to_string())
            .or_default()
            .entry(entry.priority)
            .or_default()
            .push(entry);
    }

    /// Remove every entry wrapping `callable` under `event_name`
    pub fn remove_callable(&mut self, event_name: &str, callable: &Callable) -> usize {
        self.remove_where(event_name, |entry| {
            entry.owner.is_none() && entry.callable.same_as(callable)
        })
    }

    /// Remove every entry declared by the listener identified by `owner` under `event_name`
    pub fn remove_owned(&mut self, event_name: &str, owner: usize) -> usize {
        self.remove_where(event_name, |entry| entry.owner == Some(owner))
    }

    fn remove_where<F>(&mut self, event_name: &str, matches: F) -> usize
    where
        F: Fn(&ListenerEntry) -> bool,
    {
        let Some(buckets) = self.listeners.get_mut(event_name) else {
            return 0;
        };

        let mut removed = 0;
        buckets.retain(|_, entries| {
            let len_before = entries.len();
            entries.retain(|entry| !matches(entry));
            removed += len_before - entries.len();
            !entries.is_empty()
        });

        if buckets.is_empty() {
            self.listeners.remove(event_name);
        }
        removed
    }

    /// Buckets registered for `event_name`, empty when there are none
    pub fn prioritised(&self, event_name: &str) -> PriorityBuckets {
        self.listeners.get(event_name).cloned().unwrap_or_default()
    }

    /// Buckets of every event name containing `pattern` as a literal substring
    pub fn matching(&self, pattern: &str) -> BTreeMap<String, PriorityBuckets> {
        self.listeners
            .iter()
            .filter(|(name, _)| name.contains(pattern))
            .map(|(name, buckets)| (name.clone(), buckets.clone()))
            .collect()
    }

    /// Names with at least one listener, sorted
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.listeners.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of listeners registered for `event_name`
    pub fn count(&self, event_name: &str) -> usize {
        self.listeners
            .get(event_name)
            .map(|buckets| buckets.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// Interleave two bucket sets by ascending priority.
///
/// Within a shared priority every `first` entry precedes every `second` entry,
/// and each side keeps its own insertion order.
pub fn merge_buckets(first: &PriorityBuckets, second: &PriorityBuckets) -> Vec<ListenerEntry> {
    let mut priorities: Vec<i32> = first.keys().chain(second.keys()).copied().collect();
    priorities.sort_unstable();
    priorities.dedup();

    let mut merged = Vec::new();
    for priority in priorities {
        if let Some(entries) = first.get(&priority) {
            merged.extend(entries.iter().cloned());
        }
        if let Some(entries) = second.get(&priority) {
            merged.extend(entries.iter().cloned());
        }
    }
    merged
}
