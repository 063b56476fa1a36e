//! One-call step over a byte buffer
//!
//! [`Harness`] bundles a reader, an executor and a writer. Each [`Harness::step`] feeds the
//! input bytes to the reader, runs one executor pass and collects everything the writer
//! produces. This is the shape a simulator or a foreign-language host drives the flight
//! software with.

use alloc::vec::Vec;

use crate::exec::Executor;
use crate::link::SliceSource;
use crate::reader::{ChannelReader, InputChannel};
use crate::writer::ChannelWriter;

pub struct Harness {
    reader: ChannelReader,
    executor: Executor,
    writer: ChannelWriter,
    output: Vec<u8>,
}

impl Harness {
    pub fn new(channel: InputChannel) -> Self {
        Self {
            reader: ChannelReader::new(channel),
            executor: Executor::new(),
            writer: ChannelWriter::new(),
            output: Vec::new(),
        }
    }

    pub fn reader(&self) -> &ChannelReader {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut ChannelReader {
        &mut self.reader
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut Executor {
        &mut self.executor
    }

    pub fn writer(&self) -> &ChannelWriter {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut ChannelWriter {
        &mut self.writer
    }

    /// Runs one cycle and returns the encoded output
    ///
    /// The returned bytes stay valid until the next call.
    pub fn step(&mut self, input: &[u8]) -> &[u8] {
        self.reader.process(&mut SliceSource::new(input));
        self.executor.step();

        self.output.clear();
        self.writer.process(&mut self.output);
        trace!(
            "step: {} bytes in, {} bytes out",
            input.len(),
            self.output.len()
        );
        &self.output
    }
}
