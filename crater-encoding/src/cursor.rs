/// Little-endian payload writer
///
/// The target slice must hold the full serialized length of the type being written.
pub struct WriteCursor<'a> {
    bytes: &'a mut [u8],
    position: usize,
}

macro_rules! write_le {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self, value: $ty) {
                self.write_bytes(&value.to_le_bytes());
            }
        )*
    };
}

impl<'a> WriteCursor<'a> {
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn write_bytes(&mut self, value: &[u8]) {
        let end = self.position + value.len();
        self.bytes[self.position..end].copy_from_slice(value);
        self.position = end;
    }

    write_le! {
        write_u8: u8,
        write_i8: i8,
        write_u16: u16,
        write_i16: i16,
        write_u32: u32,
        write_i32: i32,
        write_u64: u64,
        write_i64: i64,
        write_f32: f32,
        write_f64: f64,
    }
}

/// Little-endian payload reader
///
/// Reads past the end of the slice yield zero bytes. MAVLink v2 senders trim trailing zeros
/// from the payload, so a short payload is indistinguishable from one padded with zeros.
pub struct ReadCursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

macro_rules! read_le {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self) -> $ty {
                let mut raw = [0u8; size_of::<$ty>()];
                self.read_bytes(&mut raw);
                <$ty>::from_le_bytes(raw)
            }
        )*
    };
}

impl<'a> ReadCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes actually present beyond the current position
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.position)
    }

    pub fn read_bytes(&mut self, target: &mut [u8]) {
        let start = self.position.min(self.bytes.len());
        let available = (self.bytes.len() - start).min(target.len());
        let (present, missing) = target.split_at_mut(available);
        present.copy_from_slice(&self.bytes[start..start + available]);
        missing.fill(0);
        self.position += target.len();
    }

    read_le! {
        read_u8: u8,
        read_i8: i8,
        read_u16: u16,
        read_i16: i16,
        read_u32: u32,
        read_i32: i32,
        read_u64: u64,
        read_i64: i64,
        read_f32: f32,
        read_f64: f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_little_endian() {
        let mut buffer = [0u8; 7];
        let mut cursor = WriteCursor::new(&mut buffer);
        cursor.write_u32(0x0403_0201);
        cursor.write_i16(-2);
        cursor.write_u8(0xaa);
        assert_eq!(cursor.position(), 7);
        assert_eq!(buffer, [0x01, 0x02, 0x03, 0x04, 0xfe, 0xff, 0xaa]);
    }

    #[test]
    fn read_zero_extends() {
        let bytes = [0x01, 0x02];
        let mut cursor = ReadCursor::new(&bytes);
        assert_eq!(cursor.read_u32(), 0x0201);
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(cursor.read_u8(), 0);
        assert_eq!(cursor.read_f32(), 0.0);
        assert_eq!(cursor.position(), 9);
    }

    #[test]
    fn float_bits_preserved() {
        let mut buffer = [0u8; 12];
        let mut cursor = WriteCursor::new(&mut buffer);
        cursor.write_f32(-1.25);
        cursor.write_f64(core::f64::consts::PI);

        let mut cursor = ReadCursor::new(&buffer);
        assert_eq!(cursor.read_f32(), -1.25);
        assert_eq!(cursor.read_f64(), core::f64::consts::PI);
    }
}
