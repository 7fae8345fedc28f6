//! Protobuf wire decoding into the typed records of [`records`].
//!
//! The backend serializes its binary responses with protobuf (proto3). Rather
//! than interpreting a runtime descriptor, every message type implements
//! [`Message`] with an explicit `match` over its field numbers, so each field's
//! handling (and its default) is spelled out in code.

pub mod common_de;
pub mod records;
pub mod varint;

#[doc(hidden)]
pub mod testing;

pub use records::*;

use crate::error::DecodeError;

type Result<T> = std::result::Result<T, DecodeError>;

/// Protobuf wire types; the low three bits of every field key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint,
    Fixed64,
    LengthDelimited,
    Fixed32,
}

impl WireType {
    fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::LengthDelimited),
            5 => Ok(Self::Fixed32),
            // 3 & 4 are the deprecated group markers
            other => Err(DecodeError::UnsupportedWireType(other)),
        }
    }
}

/// A message type with a fixed field layout.
pub trait Message: Default {
    /// Fully qualified protobuf name, used in error messages.
    const NAME: &'static str;

    /// Merge a single field into `self`; unknown field numbers must be skipped
    /// with [`Reader::skip()`].
    fn merge_field(&mut self, field: u32, wire_type: WireType, reader: &mut Reader<'_>) -> Result<()>;

    /// Merge every field found in `buf` into `self`.
    fn merge(&mut self, buf: &[u8]) -> Result<()> {
        let mut reader = Reader::new(buf);
        while !reader.is_empty() {
            let (field, wire_type) = reader.read_key()?;
            self.merge_field(field, wire_type, &mut reader)?;
        }
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<Self> {
        let mut message = Self::default();
        message.merge(buf)?;
        Ok(message)
    }
}

/// Decode `buf` as a `M`, wrapping any failure in the crate-level error.
pub fn decode<M: Message>(buf: &[u8]) -> crate::Result<M> {
    M::decode(buf).map_err(|source| crate::Error::Decode {
        message: M::NAME,
        source,
    })
}

/// Cursor over an encoded message.
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn read_varint(&mut self) -> Result<u64> {
        let (value, consumed) = varint::decode_u64(&self.buf[self.pos..])?;
        self.pos += consumed;
        Ok(value)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or(DecodeError::UnexpectedEof)?;
        if end > self.buf.len() {
            return Err(DecodeError::UnexpectedEof);
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Read a field key: (field number, wire type).
    pub fn read_key(&mut self) -> Result<(u32, WireType)> {
        let key = self.read_varint()?;
        let field = key >> 3;
        if field == 0 || field > u32::MAX as u64 {
            return Err(DecodeError::InvalidKey(key));
        }
        let wire_type = WireType::from_bits((key & 0x07) as u8)?;
        Ok((field as u32, wire_type))
    }

    fn read_length_delimited(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint()?;
        let len = usize::try_from(len).map_err(|_| DecodeError::UnexpectedEof)?;
        self.take(len)
    }

    /// Skip over the value of a field this message does not know about.
    pub fn skip(&mut self, wire_type: WireType) -> Result<()> {
        match wire_type {
            WireType::Varint => self.read_varint().map(|_| ()),
            WireType::Fixed64 => self.take(8).map(|_| ()),
            WireType::LengthDelimited => self.read_length_delimited().map(|_| ()),
            WireType::Fixed32 => self.take(4).map(|_| ()),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // typed field readers

    pub fn string(&mut self, message: &'static str, field: u32, wire_type: WireType) -> Result<String> {
        expect(message, field, WireType::LengthDelimited, wire_type)?;
        let bytes = self.read_length_delimited()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8 { message, field })
    }

    pub fn int64(&mut self, message: &'static str, field: u32, wire_type: WireType) -> Result<i64> {
        expect(message, field, WireType::Varint, wire_type)?;
        // two's complement, sign-extended to ten bytes by the encoder
        Ok(self.read_varint()? as i64)
    }

    pub fn double(&mut self, message: &'static str, field: u32, wire_type: WireType) -> Result<f64> {
        expect(message, field, WireType::Fixed64, wire_type)?;
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(f64::from_le_bytes(raw))
    }

    /// Merge an embedded message into `target`.
    pub fn message<M: Message>(
        &mut self,
        message: &'static str,
        field: u32,
        wire_type: WireType,
        target: &mut M,
    ) -> Result<()> {
        expect(message, field, WireType::LengthDelimited, wire_type)?;
        let bytes = self.read_length_delimited()?;
        target.merge(bytes)
    }
}

fn expect(message: &'static str, field: u32, expected: WireType, actual: WireType) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(DecodeError::WireTypeMismatch {
            message,
            field,
            expected,
            actual,
        })
    }
}
