use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};

use crate::solve::NodeId;

// A node may be pushed again after a shorter path to it is found. The
// `depth` recorded here lets the engine drop the outdated entry on pop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub node: NodeId,
    pub depth: u32,
    pub score: u32,
}

pub trait Frontier {
    fn push(&mut self, entry: Entry);

    fn pop(&mut self) -> Option<Entry>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct Fifo(VecDeque<Entry>);

impl Frontier for Fifo {
    fn push(&mut self, entry: Entry) {
        self.0.push_back(entry);
    }

    fn pop(&mut self) -> Option<Entry> {
        self.0.pop_front()
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Default)]
pub struct Priority {
    heap: BinaryHeap<Reverse<Ranked>>,
    seq: u64,
}

#[derive(Debug)]
struct Ranked {
    score: u32,
    seq: u64,
    entry: Entry,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.score, self.seq).cmp(&(other.score, other.seq))
    }
}

impl Frontier for Priority {
    fn push(&mut self, entry: Entry) {
        let seq = self.seq;
        self.seq += 1;
        self.heap.push(Reverse(Ranked {
            score: entry.score,
            seq,
            entry,
        }));
    }

    fn pop(&mut self) -> Option<Entry> {
        self.heap.pop().map(|Reverse(ranked)| ranked.entry)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}
