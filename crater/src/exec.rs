//! Cooperative step scheduling
//!
//! A flight software cycle is a single call to [`Executor::step`], which advances every
//! registered [`Node`] once, in registration order. Nodes never block: they drain their
//! receivers, compute and send, then return.

mod executor;
mod node;

pub use executor::Executor;
pub use node::{Context, FnNode, Node};
