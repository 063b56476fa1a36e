use alloc::string::String;
use alloc::sync::Arc;

use crate::clock::Clock;
use crate::core::Timestamp;
use crate::error::AnyExpected;

/// Shared execution environment handed to nodes
#[derive(Clone)]
pub struct Context {
    clock: Arc<dyn Clock>,
}

impl Context {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &dyn Clock {
        &*self.clock
    }

    pub fn now(&self) -> Timestamp {
        self.clock.timestamp()
    }
}

/// A unit of periodic work
pub trait Node {
    fn name(&self) -> &str;

    fn id(&self) -> u8;

    /// Advances the node by one cycle
    ///
    /// Must not block. An error is reported to the executor, which moves on to the next node.
    fn step(&mut self) -> AnyExpected<()>;
}

/// Node made of a closure
pub struct FnNode<F> {
    name: String,
    id: u8,
    context: Context,
    step: F,
}

impl<F: FnMut(&Context) -> AnyExpected<()>> FnNode<F> {
    pub fn new(name: impl Into<String>, id: u8, context: Context, step: F) -> Self {
        Self {
            name: name.into(),
            id,
            context,
            step,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }
}

impl<F: FnMut(&Context) -> AnyExpected<()>> Node for FnNode<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> u8 {
        self.id
    }

    fn step(&mut self) -> AnyExpected<()> {
        (self.step)(&self.context)
    }
}
