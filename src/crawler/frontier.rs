//! Pending-work disciplines for the traversal engine
//!
//! Breadth-first traversal drains a FIFO queue, depth-first traversal a LIFO
//! stack. Both sit behind the `Frontier` trait; the discipline is picked once
//! per run from the `Strategy` and never changes mid-run.

use crate::state::PathHop;
use crate::ConfigError;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Traversal strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    BreadthFirst,
    DepthFirst,
}

impl Strategy {
    /// Label stored in the cache
    pub fn label(&self) -> &'static str {
        match self {
            Self::BreadthFirst => "BFS",
            Self::DepthFirst => "DFS",
        }
    }

    /// Creates the empty pending-work collection for this strategy
    pub fn frontier(&self) -> Box<dyn Frontier> {
        match self {
            Self::BreadthFirst => Box::new(FifoFrontier::default()),
            Self::DepthFirst => Box::new(LifoFrontier::default()),
        }
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bfs" | "breadth-first" => Ok(Self::BreadthFirst),
            "dfs" | "depth-first" => Ok(Self::DepthFirst),
            _ => Err(ConfigError::UnsupportedStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A URL waiting to be processed
///
/// Entries are consumed exactly once and never re-queued.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontierEntry {
    pub url: Url,

    pub parent_url: Option<String>,

    /// Discovery path ending with this URL
    pub path_info: Vec<PathHop>,

    pub depth: u32,
}

impl FrontierEntry {
    /// The entry every run starts from
    pub fn seed(url: Url) -> Self {
        Self {
            path_info: vec![PathHop::seed(url.as_str())],
            url,
            parent_url: None,
            depth: 0,
        }
    }

    /// An entry one hop below this one, reached through `anchor_text`
    pub fn child(&self, url: Url, anchor_text: impl Into<String>) -> Self {
        let mut path_info = self.path_info.clone();
        path_info.push(PathHop::new(url.as_str(), anchor_text));
        Self {
            url,
            parent_url: Some(self.url.to_string()),
            path_info,
            depth: self.depth + 1,
        }
    }

    /// Anchor text of the hop that reached this entry
    pub fn anchor_text(&self) -> Option<&str> {
        self.path_info.last().map(|hop| hop.anchor_text.as_str())
    }
}

/// Pending-work collection
pub trait Frontier {
    fn push(&mut self, entry: FrontierEntry);

    /// Removes the next entry according to the discipline
    fn pop(&mut self) -> Option<FrontierEntry>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pushes the links of one page so that the first extracted link is
    /// processed first among them
    fn push_children(&mut self, children: Vec<FrontierEntry>) {
        for child in children {
            self.push(child);
        }
    }
}

/// Breadth-first discipline: oldest entry first
#[derive(Debug, Default)]
pub struct FifoFrontier {
    queue: VecDeque<FrontierEntry>,
}

impl Frontier for FifoFrontier {
    fn push(&mut self, entry: FrontierEntry) {
        self.queue.push_back(entry);
    }

    fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Depth-first discipline: most recently pushed entry first
#[derive(Debug, Default)]
pub struct LifoFrontier {
    stack: Vec<FrontierEntry>,
}

impl Frontier for LifoFrontier {
    fn push(&mut self, entry: FrontierEntry) {
        self.stack.push(entry);
    }

    fn pop(&mut self) -> Option<FrontierEntry> {
        self.stack.pop()
    }

    fn len(&self) -> usize {
        self.stack.len()
    }

    // Reverse so the first extracted link ends up on top of the stack
    fn push_children(&mut self, children: Vec<FrontierEntry>) {
        self.stack.extend(children.into_iter().rev());
    }
}
