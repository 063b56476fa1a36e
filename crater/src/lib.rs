//! # Crater
//!
//! Message bus and telemetry codec for flight software in no_std + alloc environments.
//!
//! Components are decoupled by typed broadcast channels, advanced by a cooperative step
//! executor, and connected to the outside world by a MAVLink v2 multiplexer/demultiplexer.
//!
//! ## Architecture
//!
//! ```text
//!  bytes in                                                           bytes out
//!     │                                                                   ▲
//! ┌───▼───────────┐   ┌─────────┐   ┌────────┐   ┌─────────┐   ┌──────────┴────┐
//! │ ChannelReader ├──►│ Channel ├──►│  Node  ├──►│ Channel ├──►│ ChannelWriter │
//! └───────────────┘   └─────────┘   └────────┘   └─────────┘   └───────────────┘
//!                                       ▲
//!                                  ┌────┴─────┐
//!                                  │ Executor │
//!                                  └──────────┘
//! ```
//! Components:
//! * _Channel_ is a multi-producer, multi-consumer broadcast queue. Each receiver owns a ring
//!   buffer of its own capacity and overwrites its oldest message when full.
//! * _Node_ is a unit of periodic work. It drains its receivers, computes and sends.
//! * _Executor_ steps every node once per cycle, in registration order.
//! * _ChannelReader_ parses an inbound byte stream and routes each message to the channel
//!   bound to its (message type, system, component) key.
//! * _ChannelWriter_ drains outbound receivers and writes their messages as frames.
//! * _Harness_ runs reader, executor and writer as one step over a byte buffer.
//!
//! ## Delivery model
//!
//! The bus is loss-tolerant. A full receiver drops its oldest message, a refused frame is
//! dropped by the writer, and malformed input is skipped by the reader. Each loss is counted
//! in the statistics of the component that dropped it.
//!
//! ## Concurrency model
//!
//! Scheduling is cooperative and nothing blocks for longer than a single buffer operation.
//! Channels are generic over an `embassy_sync` raw mutex:
//! * _CriticalSectionRawMutex_ allows senders and receivers to live at different interrupt
//!   levels or threads.
//! * _NoopRawMutex_ confines a channel to a single execution context at no cost.
//!
//! The raw mutex only guards the flip of a lock flag, never a buffer operation, so
//! critical sections stay a few instructions long.
#![no_std]

extern crate alloc;

pub use crater_core as core;
pub use crater_encoding as encoding;
pub use crater_link::{frame, link};

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod channel;
pub mod clock;
pub mod codec;
pub mod error;
pub mod exec;
mod format;
pub mod harness;
pub mod messages;
pub mod parser;
pub mod reader;
pub mod ring_buffer;
pub mod sync;
pub mod writer;

pub use format::MAX_PACKET_LEN;
