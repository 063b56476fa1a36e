use alloc::boxed::Box;
use alloc::vec::Vec;

use super::Node;

/// Runs registered nodes in registration order
#[derive(Default)]
pub struct Executor {
    nodes: Vec<Box<dyn Node>>,
    faults: u32,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: impl Node + 'static) {
        self.add_boxed(Box::new(node));
    }

    pub fn add_boxed(&mut self, node: Box<dyn Node>) {
        debug!("registered node {} ({})", node.name(), node.id());
        self.nodes.push(node);
    }

    /// Steps every node exactly once and returns the number of nodes that failed
    ///
    /// A failing node is logged and counted; the pass continues with the next node.
    pub fn step(&mut self) -> usize {
        let mut failed = 0;
        for node in self.nodes.iter_mut() {
            if let Err(error) = node.step() {
                warn!(
                    "node {} ({}) failed: {}",
                    node.name(),
                    node.id(),
                    error.code()
                );
                failed += 1;
            }
        }
        self.faults = self.faults.saturating_add(failed as u32);
        failed
    }

    /// Node failures since construction
    pub fn fault_count(&self) -> u32 {
        self.faults
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
