//! Bounds-checked cursor over an encoded message

use bytes::Buf;

use crate::error::DecodeError;

pub(crate) struct WireReader<'a> {
    buf: &'a [u8],
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn ensure(&self, needed: usize) -> Result<(), DecodeError> {
        if self.buf.remaining() < needed {
            return Err(DecodeError::Truncated {
                needed,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    /// Next tag byte, or `None` at end of input
    pub fn peek_tag(&self) -> Option<u8> {
        self.buf.first().copied()
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        self.ensure(2)?;
        Ok(self.buf.get_u16_le())
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        self.ensure(4)?;
        Ok(self.buf.get_u32_le())
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        self.ensure(8)?;
        Ok(self.buf.get_u64_le())
    }

    pub fn read_f64(&mut self) -> Result<f64, DecodeError> {
        self.ensure(8)?;
        Ok(self.buf.get_f64_le())
    }

    pub fn skip(&mut self, len: usize) -> Result<(), DecodeError> {
        self.ensure(len)?;
        self.buf.advance(len);
        Ok(())
    }

    /// Fail if anything is left after the message
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}
