use crate::error::FormatError;

/// Big-endian cursor over an in-memory save buffer.
///
/// Every read is bounds-checked and fails with [`FormatError::UnexpectedEof`]
/// instead of panicking; counts read from the file are untrusted.
#[derive(Debug, Clone)]
pub struct BigEndianReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BigEndianReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn read_u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i16(&mut self) -> Result<i16, FormatError> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, FormatError> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, FormatError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i32_array<const N: usize>(&mut self) -> Result<[i32; N], FormatError> {
        let mut result = [0i32; N];
        for item in &mut result {
            *item = self.read_i32()?;
        }
        Ok(result)
    }

    pub fn read_i32_vec(&mut self, n: usize) -> Result<Vec<i32>, FormatError> {
        // Check the whole run up front so a hostile count cannot drive a
        // large allocation.
        self.ensure(n.saturating_mul(4))?;
        let mut result = Vec::with_capacity(n);
        for _ in 0..n {
            result.push(self.read_i32()?);
        }
        Ok(result)
    }

    /// Fixed-width text field, cut at the first NUL. Bytes that are not
    /// UTF-8 are replaced rather than rejected.
    pub fn read_fixed_string(&mut self, n: usize) -> Result<String, FormatError> {
        let bytes = self.take(n)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(n);
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        self.take(n)
    }

    /// Read a null-terminated string, consuming at most `max_len` bytes.
    /// Stops at the first null byte but does NOT consume padding after it.
    pub fn read_null_terminated_string(&mut self, max_len: usize) -> Result<String, FormatError> {
        let mut bytes = Vec::with_capacity(max_len);
        for _ in 0..max_len {
            let b = self.read_u8()?;
            if b == 0 {
                break;
            }
            bytes.push(b);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn skip(&mut self, n: usize) -> Result<(), FormatError> {
        self.take(n).map(|_| ())
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn seek_to(&mut self, pos: usize) -> Result<(), FormatError> {
        if pos > self.bytes.len() {
            return Err(FormatError::UnexpectedEof {
                offset: pos,
                wanted: 0,
                available: 0,
            });
        }
        self.pos = pos;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    fn ensure(&self, wanted: usize) -> Result<(), FormatError> {
        let available = self.remaining();
        if wanted > available {
            return Err(FormatError::UnexpectedEof {
                offset: self.pos,
                wanted,
                available,
            });
        }
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        self.ensure(n)?;
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], FormatError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }
}
