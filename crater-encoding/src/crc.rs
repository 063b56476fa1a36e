/// CRC-16/MCRF4XX accumulator, the "X.25" checksum of MAVLink frames
///
/// All operations are `const` so message descriptors can fold their CRC extra at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct X25Crc(u16);

impl Default for X25Crc {
    fn default() -> Self {
        Self::new()
    }
}

impl X25Crc {
    pub const LENGTH: usize = 2;
    const INIT_VALUE: u16 = 0xffff;

    pub const fn new() -> Self {
        Self(Self::INIT_VALUE)
    }

    pub const fn add(&mut self, byte: u8) {
        let mut tmp = byte ^ (self.0 & 0xff) as u8;
        tmp ^= tmp << 4;
        let tmp = tmp as u16;
        self.0 = (self.0 >> 8) ^ (tmp << 8) ^ (tmp << 3) ^ (tmp >> 4);
    }

    pub const fn add_bytes(&mut self, bytes: &[u8]) {
        let mut i = 0;
        while i < bytes.len() {
            self.add(bytes[i]);
            i += 1;
        }
    }

    pub const fn get(&self) -> u16 {
        self.0
    }
}

impl From<u16> for X25Crc {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

/// Wire-ordered field description used to derive a message's CRC extra
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// C base type name, e.g. `uint16_t` or `char`
    pub ty: &'static str,
    pub name: &'static str,
    /// Element count for array fields, 0 for scalars
    pub array_len: u8,
}

impl FieldSpec {
    pub const fn scalar(ty: &'static str, name: &'static str) -> Self {
        Self {
            ty,
            name,
            array_len: 0,
        }
    }

    pub const fn array(ty: &'static str, name: &'static str, array_len: u8) -> Self {
        Self {
            ty,
            name,
            array_len,
        }
    }
}

/// Computes the CRC extra byte the same way the MAVLink generator does.
///
/// `fields` must list the base (non-extension) fields in wire order: sorted by descending
/// type size, ties kept in declaration order.
pub const fn crc_extra(name: &str, fields: &[FieldSpec]) -> u8 {
    let mut crc = X25Crc::new();
    crc.add_bytes(name.as_bytes());
    crc.add(b' ');

    let mut i = 0;
    while i < fields.len() {
        let field = &fields[i];
        crc.add_bytes(field.ty.as_bytes());
        crc.add(b' ');
        crc.add_bytes(field.name.as_bytes());
        crc.add(b' ');
        if field.array_len != 0 {
            crc.add(field.array_len);
        }
        i += 1;
    }

    let value = crc.get();
    (value & 0xff) as u8 ^ (value >> 8) as u8
}
