//! Little-endian binary codec for cache artifacts.
//!
//! Scalars are fixed width (`i32`, `i64`, `f64`); byte strings carry an `i32` length prefix.
//! There is no format tag: layout changes are handled by versioning the cache root.

use crate::error::{Result, VectorStoreError};
use std::io::{Read, Write};

/// Upper bound for speculative allocations driven by length fields read from disk.
const MAX_PREALLOC: usize = 4096;

pub struct BinaryWriter<W: Write> {
    inner: W,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    /// Write a length field, rejecting lengths that do not fit an `i32`.
    pub fn write_len(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len).map_err(|_| {
            VectorStoreError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("length {len} exceeds i32 range"),
            ))
        })?;
        self.write_i32(len)
    }

    /// Write `[len:i32][bytes]`.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_len(bytes.len())?;
        self.inner.write_all(bytes)?;
        Ok(())
    }

    pub fn write_str(&mut self, value: &str) -> Result<()> {
        self.write_bytes(value.as_bytes())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

pub struct BinaryReader<R: Read> {
    inner: R,
}

impl<R: Read> BinaryReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    /// Read an `i32` length field; negative values are corrupt.
    pub fn read_len(&mut self, what: &str) -> Result<usize> {
        let raw = self.read_i32()?;
        usize::try_from(raw)
            .map_err(|_| VectorStoreError::corrupt(format!("negative {what} length: {raw}")))
    }

    /// Read `[len:i32][bytes]`. A stream shorter than `len` is corrupt.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_len("byte string")?;
        let mut buf = Vec::with_capacity(len.min(MAX_PREALLOC));
        (&mut self.inner).take(len as u64).read_to_end(&mut buf)?;
        if buf.len() != len {
            return Err(VectorStoreError::corrupt(format!(
                "byte string truncated: expected {len} bytes, got {}",
                buf.len()
            )));
        }
        Ok(buf)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes)
            .map_err(|e| VectorStoreError::corrupt(format!("string is not valid UTF-8: {e}")))
    }

    /// Read `len` consecutive `f64` values.
    pub fn read_f64_vec(&mut self, len: usize) -> Result<Vec<f64>> {
        let mut out = Vec::with_capacity(len.min(MAX_PREALLOC));
        for _ in 0..len {
            out.push(self.read_f64()?);
        }
        Ok(out)
    }

    /// Succeeds only when the underlying stream has no bytes left.
    pub fn expect_end(&mut self) -> Result<()> {
        let mut probe = [0u8; 1];
        match self.inner.read(&mut probe)? {
            0 => Ok(()),
            _ => Err(VectorStoreError::corrupt("trailing bytes after last entry")),
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}
