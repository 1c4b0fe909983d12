//! Binary framing over one byte stream
//!
//! `Transfer` multiplexes the protocol's primitive encodings over a single
//! duplex stream: 4-byte big-endian integers, 2-byte big-endian UTF-16 code
//! units, and length-prefixed strings and byte blobs. Writes are staged in a
//! buffer and reach the stream only on [`Transfer::flush`]; reads are
//! buffered.

use crate::{Error, Result};
use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Maximum accepted length prefix (1 GiB).
///
/// Any length field above this value is rejected before allocation to prevent
/// denial-of-service via crafted length headers.
const MAX_LENGTH: i32 = 1_073_741_824;

/// Framed binary codec over one byte stream
pub struct Transfer<S> {
    stream: BufReader<S>,
    write_buf: BytesMut,
}

impl<S> Transfer<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap a stream in a Transfer
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
            write_buf: BytesMut::with_capacity(4096),
        }
    }

    /// Read a 4-byte big-endian integer.
    ///
    /// A stream that ends short of 4 bytes surfaces as an `UnexpectedEof`
    /// I/O error.
    pub async fn read_int(&mut self) -> Result<i32> {
        Ok(self.stream.read_i32().await?)
    }

    /// Read one UTF-16 code unit (2 bytes big-endian).
    ///
    /// A code point outside the BMP arrives as two separate surrogate units;
    /// recombination is up to the caller.
    pub async fn read_char(&mut self) -> Result<u16> {
        Ok(self.stream.read_u16().await?)
    }

    /// Read a length-prefixed string; a length of -1 is the null marker.
    pub async fn read_string(&mut self) -> Result<Option<String>> {
        let n = self.read_int().await?;
        if n == -1 {
            return Ok(None);
        }
        check_length(n)?;
        let mut units = Vec::with_capacity(n as usize);
        for _ in 0..n {
            units.push(self.read_char().await?);
        }
        match String::from_utf16(&units) {
            Ok(s) => Ok(Some(s)),
            Err(_) => Err(Error::Internal("invalid UTF-16 in string field".into())),
        }
    }

    /// Read a length-prefixed byte blob; a length of -1 is the null marker.
    pub async fn read_bytes(&mut self) -> Result<Option<Vec<u8>>> {
        let n = self.read_int().await?;
        if n == -1 {
            return Ok(None);
        }
        check_length(n)?;
        let mut data = vec![0u8; n as usize];
        self.stream.read_exact(&mut data).await?;
        Ok(Some(data))
    }

    /// Write a 4-byte big-endian integer
    pub fn write_int(&mut self, x: i32) {
        self.write_buf.put_i32(x);
    }

    /// Write one UTF-16 code unit (2 bytes big-endian)
    pub fn write_char(&mut self, c: u16) {
        self.write_buf.put_u16(c);
    }

    /// Write a string, or the null marker (-1) for `None`.
    ///
    /// The length prefix counts UTF-16 code units, not bytes and not code
    /// points: a character outside the BMP serializes as two surrogate units
    /// and counts as two. Substituting byte or code-point counts misaligns
    /// the stream for every subsequent field.
    pub fn write_string(&mut self, s: Option<&str>) {
        match s {
            None => self.write_int(-1),
            Some(s) => {
                self.write_int(s.encode_utf16().count() as i32);
                for unit in s.encode_utf16() {
                    self.write_char(unit);
                }
            }
        }
    }

    /// Write a byte blob verbatim, or the null marker (-1) for `None`.
    ///
    /// No re-encoding happens on this path; it carries pre-hashed binary
    /// blobs, not text.
    pub fn write_bytes(&mut self, data: Option<&[u8]>) {
        match data {
            None => self.write_int(-1),
            Some(data) => {
                self.write_int(data.len() as i32);
                self.write_buf.put_slice(data);
            }
        }
    }

    /// Force staged writes out to the stream.
    ///
    /// Must be called before expecting a response.
    pub async fn flush(&mut self) -> Result<()> {
        if !self.write_buf.is_empty() {
            self.stream.write_all(&self.write_buf).await?;
            self.write_buf.clear();
        }
        self.stream.flush().await?;
        Ok(())
    }

    /// Flush staged writes and shut the stream down.
    ///
    /// Consumes the Transfer, so no operation can follow a close.
    pub async fn close(mut self) -> Result<()> {
        self.flush().await?;
        self.stream.shutdown().await?;
        Ok(())
    }
}

fn check_length(n: i32) -> Result<()> {
    if n < -1 {
        return Err(Error::Internal(format!("invalid length prefix: {}", n)));
    }
    if n > MAX_LENGTH {
        return Err(Error::Internal(format!(
            "length prefix {} exceeds maximum allowed {}",
            n, MAX_LENGTH
        )));
    }
    Ok(())
}

impl<S> std::fmt::Debug for Transfer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transfer")
            .field("staged_bytes", &self.write_buf.len())
            .finish()
    }
}
