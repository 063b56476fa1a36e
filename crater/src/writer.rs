//! Multiplexer from typed channels to an outbound byte stream

use alloc::boxed::Box;
use alloc::vec::Vec;
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::channel::Receiver;
use crate::codec::encode;
use crate::core::{ComponentId, SystemId};
use crate::encoding::{Message, Serialize};
use crate::format::MAX_PACKET_LEN;
use crate::link::ByteSink;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WriterStats {
    /// Frames accepted by the sink
    pub frames: u32,
    /// Frames the sink refused, lost
    pub sink_errors: u32,
}

/// Encoding state shared by all channels of a writer
struct Output<'a> {
    buffer: &'a mut [u8; MAX_PACKET_LEN],
    sequence: &'a mut u8,
    stats: &'a mut WriterStats,
    sink: &'a mut dyn ByteSink,
}

impl Output<'_> {
    fn write<T: Serialize>(&mut self, message: &T, system: SystemId, component: ComponentId) {
        let len = encode(&mut *self.buffer, message, system, component, *self.sequence);
        match self.sink.write_all(&self.buffer[..len]) {
            Ok(()) => {
                *self.sequence = self.sequence.wrapping_add(1);
                self.stats.frames += 1;
            }
            Err(_) => {
                self.stats.sink_errors += 1;
                warn!(
                    "sink refused message {} from {}/{}",
                    T::ID.into_u32(),
                    system.into_u8(),
                    component.into_u8()
                );
            }
        }
    }
}

trait DynamicDrain {
    fn drain(&self, output: &mut Output<'_>);
}

struct Drain<M: RawMutex, T> {
    receiver: Receiver<M, T>,
    system: SystemId,
    component: ComponentId,
}

impl<M: RawMutex, T: Message> DynamicDrain for Drain<M, T> {
    fn drain(&self, output: &mut Output<'_>) {
        while let Some(message) = self.receiver.try_receive() {
            output.write(&message, self.system, self.component);
        }
    }
}

/// Serializes messages from registered receivers into a byte sink
///
/// Every frame carries the writer's running sequence number, which advances on each frame
/// the sink accepts.
pub struct ChannelWriter {
    drains: Vec<Box<dyn DynamicDrain>>,
    buffer: [u8; MAX_PACKET_LEN],
    sequence: u8,
    stats: WriterStats,
}

impl Default for ChannelWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelWriter {
    pub fn new() -> Self {
        Self {
            drains: Vec::new(),
            buffer: [0; MAX_PACKET_LEN],
            sequence: 0,
            stats: WriterStats::default(),
        }
    }

    /// Publishes messages from `receiver` as coming from `system`/`component`
    pub fn add_channel<M: RawMutex + 'static, T: Message>(
        &mut self,
        receiver: Receiver<M, T>,
        system: SystemId,
        component: ComponentId,
    ) {
        self.drains.push(Box::new(Drain {
            receiver,
            system,
            component,
        }));
    }

    pub fn channel_count(&self) -> usize {
        self.drains.len()
    }

    /// Drains every registered receiver into `sink`, in registration order
    ///
    /// A frame the sink refuses is dropped and counted. Draining continues with the next message.
    pub fn process(&mut self, sink: &mut dyn ByteSink) {
        let mut output = Output {
            buffer: &mut self.buffer,
            sequence: &mut self.sequence,
            stats: &mut self.stats,
            sink,
        };
        for drain in &self.drains {
            drain.drain(&mut output);
        }
    }

    /// Sequence number of the next frame
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    pub fn stats(&self) -> WriterStats {
        self.stats
    }

    pub fn error_count(&self) -> u32 {
        self.stats.sink_errors
    }
}

/// A [`ChannelWriter`] bound to the sink it owns
pub struct ChannelToOutputStream<W: ByteSink> {
    writer: ChannelWriter,
    sink: W,
}

impl<W: ByteSink> ChannelToOutputStream<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: ChannelWriter::new(),
            sink,
        }
    }

    pub fn add_channel<M: RawMutex + 'static, T: Message>(
        &mut self,
        receiver: Receiver<M, T>,
        system: SystemId,
        component: ComponentId,
    ) {
        self.writer.add_channel(receiver, system, component);
    }

    pub fn process(&mut self) {
        self.writer.process(&mut self.sink);
    }

    pub fn writer(&self) -> &ChannelWriter {
        &self.writer
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_sink(self) -> W {
        self.sink
    }
}
