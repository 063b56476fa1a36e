//! Demultiplexer from an inbound byte stream to typed channels

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::collections::btree_map::Entry;
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::channel::Sender;
use crate::codec::{DecodeError, try_decode};
use crate::core::{ComponentId, DispatchKey, MessageId, SystemId};
use crate::encoding::{Message, MessageInfo};
use crate::error::{Error, ErrorCode, Expected};
use crate::format::MAX_PACKET_LEN;
use crate::frame::RawFrame;
use crate::link::ByteSource;
use crate::parser::{FrameParser, ParserStats};

/// Label of the input port a reader serves, reported in log records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputChannel(pub u8);

trait DynamicBinding {
    fn dispatch(&self, frame: &RawFrame) -> Result<(), DecodeError>;
}

struct Binding<M: RawMutex, T> {
    sender: Sender<M, T>,
}

impl<M: RawMutex, T: Message> DynamicBinding for Binding<M, T> {
    fn dispatch(&self, frame: &RawFrame) -> Result<(), DecodeError> {
        let message = try_decode::<T>(frame)?;
        self.sender.send(message);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReaderStats {
    /// Messages forwarded to a channel
    pub dispatched: u32,
    /// Valid frames without a matching binding
    pub unbound: u32,
    /// Frames of a bound key whose payload failed to decode
    pub decode_failures: u32,
    pub parser: ParserStats,
}

/// Routes decoded messages to channels by (message, system, component)
///
/// Bytes that do not form a frame of a registered message type, and frames with no
/// binding for their key, are dropped. Nothing is reported to the caller; see [`Self::stats`].
pub struct ChannelReader {
    channel: InputChannel,
    parser: FrameParser,
    messages: BTreeMap<MessageId, MessageInfo>,
    bindings: BTreeMap<DispatchKey, Box<dyn DynamicBinding>>,
    scratch: [u8; MAX_PACKET_LEN],
    stats: ReaderStats,
}

impl ChannelReader {
    pub fn new(channel: InputChannel) -> Self {
        Self {
            channel,
            parser: FrameParser::new(),
            messages: BTreeMap::new(),
            bindings: BTreeMap::new(),
            scratch: [0; MAX_PACKET_LEN],
            stats: ReaderStats::default(),
        }
    }

    pub fn channel(&self) -> InputChannel {
        self.channel
    }

    /// Forwards messages of type `T` from `system`/`component` into `sender`
    ///
    /// Fails with [`ErrorCode::DuplicateBinding`] if the key is taken, keeping the existing
    /// binding. Fails with [`ErrorCode::InvalidValue`] if another type with the same message ID
    /// but a different descriptor was registered before.
    pub fn add_binding<M: RawMutex + 'static, T: Message>(
        &mut self,
        sender: Sender<M, T>,
        system: SystemId,
        component: ComponentId,
    ) -> Expected<(), DispatchKey> {
        let key = DispatchKey::new(T::ID, system, component);
        let info = MessageInfo::of::<T>();

        if self
            .messages
            .get(&T::ID)
            .is_some_and(|known| *known != info)
        {
            warn!("conflicting descriptor for message {}", T::ID.into_u32());
            return Err(Error::with_data(ErrorCode::InvalidValue, key));
        }

        match self.bindings.entry(key) {
            Entry::Occupied(_) => {
                warn!("duplicate binding for {}", key);
                Err(Error::with_data(ErrorCode::DuplicateBinding, key))
            }
            Entry::Vacant(entry) => {
                entry.insert(Box::new(Binding { sender }));
                self.messages.insert(T::ID, info);
                Ok(())
            }
        }
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Consumes bytes from `source` until it runs dry, dispatching every complete frame
    pub fn process(&mut self, source: &mut dyn ByteSource) {
        loop {
            let count = source.read(&mut self.scratch);
            if count == 0 {
                break;
            }

            let (bindings, stats, channel) = (&self.bindings, &mut self.stats, self.channel);
            self.parser
                .push_bytes(&self.scratch[..count], &self.messages, |frame| {
                    dispatch(bindings, stats, channel, frame)
                });
        }
    }

    pub fn stats(&self) -> ReaderStats {
        ReaderStats {
            parser: self.parser.stats(),
            ..self.stats
        }
    }
}

fn dispatch(
    bindings: &BTreeMap<DispatchKey, Box<dyn DynamicBinding>>,
    stats: &mut ReaderStats,
    channel: InputChannel,
    frame: &RawFrame,
) {
    let key = frame.key();
    let Some(binding) = bindings.get(&key) else {
        stats.unbound += 1;
        trace!("input {}: no binding for {}", channel.0, key);
        return;
    };

    match binding.dispatch(frame) {
        Ok(()) => stats.dispatched += 1,
        Err(error) => {
            stats.decode_failures += 1;
            debug!("input {}: failed to decode {}: {:?}", channel.0, key, error);
        }
    }
}
