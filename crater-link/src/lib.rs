//! Crater transport interface
//!
//! The crate provides the boundary between a byte transport (UART, USB CDC, UDP socket,
//! a host process) and the Crater bus. Transport crates should depend on this crate.
//! Crater stack users should depend on the `crater` crate instead.
//!
//! The stack pulls bytes from a [`link::ByteSource`] and pushes encoded frames into a
//! [`link::ByteSink`]. Both contracts are non-blocking:
//! * a source returns 0 when nothing is available right now
//! * a sink either accepts a whole frame or refuses it with [`link::SinkFull`]
//!
//! Partial frames are never written, so a refused frame leaves the stream well-formed.

#![no_std]

extern crate alloc;

pub mod frame;
pub mod link;
