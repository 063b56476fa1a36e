//! Byte stream contracts connecting a transport and the Crater stack

/// The sink cannot take the whole frame right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SinkFull;

/// Producer of inbound bytes
///
/// Chunk boundaries carry no meaning: a frame may be split across any number of reads.
pub trait ByteSource {
    /// Copies available bytes into `buffer` and returns their count.
    ///
    /// Returns 0 when no bytes are available now. Must not block.
    fn read(&mut self, buffer: &mut [u8]) -> usize;
}

/// Consumer of encoded frames
pub trait ByteSink {
    /// Accepts all of `bytes` or none of them. Must not block.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SinkFull>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read(&mut self, buffer: &mut [u8]) -> usize {
        (**self).read(buffer)
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SinkFull> {
        (**self).write_all(bytes)
    }
}

/// Source reading from a borrowed slice
///
/// An optional chunk limit caps the bytes returned per read, which emulates
/// a transport delivering data in pieces.
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    chunk: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            chunk: usize::MAX,
        }
    }

    /// # Panics
    ///
    /// Panics if `chunk` is zero.
    pub fn with_chunk(bytes: &'a [u8], chunk: usize) -> Self {
        assert!(chunk > 0, "chunk limit must be positive");
        Self { bytes, chunk }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }
}

impl ByteSource for SliceSource<'_> {
    fn read(&mut self, buffer: &mut [u8]) -> usize {
        let count = self.bytes.len().min(buffer.len()).min(self.chunk);
        let (head, tail) = self.bytes.split_at(count);
        buffer[..count].copy_from_slice(head);
        self.bytes = tail;
        count
    }
}

/// Sink writing into a borrowed slice
pub struct SliceSink<'a> {
    bytes: &'a mut [u8],
    len: usize,
}

impl<'a> SliceSink<'a> {
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes, len: 0 }
    }

    pub fn written(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl ByteSink for SliceSink<'_> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SinkFull> {
        let end = self.len + bytes.len();
        if end > self.bytes.len() {
            return Err(SinkFull);
        }
        self.bytes[self.len..end].copy_from_slice(bytes);
        self.len = end;
        Ok(())
    }
}

impl ByteSink for alloc::vec::Vec<u8> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SinkFull> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl<const N: usize> ByteSink for heapless::Vec<u8, N> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SinkFull> {
        self.extend_from_slice(bytes).map_err(|_| SinkFull)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_source_drains() {
        let data = [1, 2, 3, 4, 5];
        let mut source = SliceSource::new(&data);
        let mut buffer = [0u8; 3];
        assert_eq!(source.read(&mut buffer), 3);
        assert_eq!(buffer, [1, 2, 3]);
        assert_eq!(source.read(&mut buffer), 2);
        assert_eq!(&buffer[..2], &[4, 5]);
        assert_eq!(source.read(&mut buffer), 0);
    }

    #[test]
    fn slice_source_chunking() {
        let data = [1, 2, 3, 4, 5];
        let mut source = SliceSource::with_chunk(&data, 2);
        let mut buffer = [0u8; 16];
        assert_eq!(source.read(&mut buffer), 2);
        assert_eq!(source.read(&mut buffer), 2);
        assert_eq!(source.read(&mut buffer), 1);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn slice_sink_is_all_or_nothing() {
        let mut storage = [0u8; 4];
        let mut sink = SliceSink::new(&mut storage);
        assert_eq!(sink.write_all(&[1, 2, 3]), Ok(()));
        assert_eq!(sink.write_all(&[4, 5]), Err(SinkFull));
        assert_eq!(sink.written(), &[1, 2, 3]);
        assert_eq!(sink.write_all(&[4]), Ok(()));
        assert_eq!(sink.len(), sink.capacity());
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn heapless_sink_is_all_or_nothing() {
        let mut sink: heapless::Vec<u8, 3> = heapless::Vec::new();
        assert_eq!(sink.write_all(&[1, 2]), Ok(()));
        assert_eq!(sink.write_all(&[3, 4]), Err(SinkFull));
        assert_eq!(sink.as_slice(), &[1, 2]);
    }

    #[test]
    fn forwarding_through_reference() {
        fn write_twice(mut sink: impl ByteSink) {
            sink.write_all(&[7]).unwrap();
            sink.write_all(&[8]).unwrap();
        }

        let mut sink = alloc::vec::Vec::new();
        write_twice(&mut sink);
        assert_eq!(sink, [7, 8]);
    }
}
