//! A2S datagram framing.
//!
//! Every datagram starts with a 4-byte little-endian header: `-1` for a
//! complete message, `-2` for one fragment of a split message. Split
//! fragments use the Source engine layout:
//!
//! ```text
//! i32 header (-2) | i32 id | u8 total | u8 number | u16 size | payload
//! ```
//!
//! The concatenated fragment payloads form a regular single-packet message.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{QueryError, QueryResult};

/// Header of a complete message.
pub const SINGLE_PACKET: i32 = -1;
/// Header of one split fragment.
pub const SPLIT_PACKET: i32 = -2;

/// A2S_INFO request type.
pub const INFO_REQUEST: u8 = b'T';
/// A2S_INFO response type.
pub const INFO_RESPONSE: u8 = b'I';
/// Challenge response type; the body is a 4-byte challenge.
pub const CHALLENGE_RESPONSE: u8 = b'A';

const INFO_PAYLOAD: &[u8] = b"Source Engine Query\0";

/// Split ids with the high bit set carry bzip2-compressed payloads.
const COMPRESSED_FLAG: u32 = 0x8000_0000;

/// Build an A2S_INFO request, appending the challenge once the server has issued one.
pub fn info_request(challenge: Option<[u8; 4]>) -> Bytes {
    let mut buf = BytesMut::with_capacity(4 + 1 + INFO_PAYLOAD.len() + 4);
    buf.put_i32_le(SINGLE_PACKET);
    buf.put_u8(INFO_REQUEST);
    buf.put_slice(INFO_PAYLOAD);
    if let Some(challenge) = challenge {
        buf.put_slice(&challenge);
    }
    buf.freeze()
}

/// Header of one split fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitHeader {
    pub id: u32,
    pub total: u8,
    pub number: u8,
}

/// A received datagram with its framing header stripped.
#[derive(Debug, PartialEq, Eq)]
pub enum Datagram<'a> {
    Single(&'a [u8]),
    Split { header: SplitHeader, payload: &'a [u8] },
}

/// Classify a raw datagram by its framing header.
pub fn classify(datagram: &[u8]) -> QueryResult<Datagram<'_>> {
    if datagram.is_empty() {
        return Err(QueryError::EmptyResponse);
    }
    let mut reader = Reader::new(datagram);
    match reader.i32("packet header")? {
        SINGLE_PACKET => Ok(Datagram::Single(reader.rest())),
        SPLIT_PACKET => {
            let id = reader.u32("split id")?;
            if id & COMPRESSED_FLAG != 0 {
                return Err(QueryError::CompressedSplit);
            }
            let total = reader.u8("split total")?;
            let number = reader.u8("split number")?;
            let _size = reader.u16("split size")?;
            if total == 0 || number >= total {
                return Err(QueryError::SplitMismatch(format!(
                    "fragment {number} of {total}"
                )));
            }
            Ok(Datagram::Split {
                header: SplitHeader { id, total, number },
                payload: reader.rest(),
            })
        }
        // The header is little-endian, so its first byte identifies it.
        _ => Err(QueryError::UnexpectedHeader(datagram[0])),
    }
}

/// Collects the fragments of one split message.
#[derive(Debug)]
pub struct SplitAssembler {
    id: u32,
    parts: Vec<Option<Vec<u8>>>,
    received: usize,
}

impl SplitAssembler {
    /// Start collecting the message `header` belongs to.
    pub fn new(header: &SplitHeader) -> Self {
        Self {
            id: header.id,
            parts: vec![None; header.total as usize],
            received: 0,
        }
    }

    /// Store a fragment. Returns the reassembled message once every
    /// fragment has arrived.
    pub fn push(&mut self, header: &SplitHeader, payload: &[u8]) -> QueryResult<Option<Vec<u8>>> {
        if header.id != self.id {
            return Err(QueryError::SplitMismatch(format!(
                "expected id {:#x}, got {:#x}",
                self.id, header.id
            )));
        }
        if header.total as usize != self.parts.len() {
            return Err(QueryError::SplitMismatch(format!(
                "expected {} fragments, got {}",
                self.parts.len(),
                header.total
            )));
        }

        let slot = &mut self.parts[header.number as usize];
        if slot.is_none() {
            *slot = Some(payload.to_vec());
            self.received += 1;
        }

        if self.received < self.parts.len() {
            return Ok(None);
        }
        Ok(Some(self.parts.iter().flatten().flatten().copied().collect()))
    }
}

/// Bounds-checked little-endian reader over a response body.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn need(&self, len: usize, field: &'static str) -> QueryResult<()> {
        if self.buf.remaining() < len {
            return Err(QueryError::Truncated(field));
        }
        Ok(())
    }

    pub(crate) fn u8(&mut self, field: &'static str) -> QueryResult<u8> {
        self.need(1, field)?;
        Ok(self.buf.get_u8())
    }

    pub(crate) fn u16(&mut self, field: &'static str) -> QueryResult<u16> {
        self.need(2, field)?;
        Ok(self.buf.get_u16_le())
    }

    pub(crate) fn i32(&mut self, field: &'static str) -> QueryResult<i32> {
        self.need(4, field)?;
        Ok(self.buf.get_i32_le())
    }

    pub(crate) fn u32(&mut self, field: &'static str) -> QueryResult<u32> {
        self.need(4, field)?;
        Ok(self.buf.get_u32_le())
    }

    pub(crate) fn u64(&mut self, field: &'static str) -> QueryResult<u64> {
        self.need(8, field)?;
        Ok(self.buf.get_u64_le())
    }

    pub(crate) fn bytes4(&mut self, field: &'static str) -> QueryResult<[u8; 4]> {
        self.need(4, field)?;
        let mut out = [0u8; 4];
        self.buf.copy_to_slice(&mut out);
        Ok(out)
    }

    /// Read a NUL-terminated string. Invalid UTF-8 is replaced rather than
    /// rejected; server names routinely carry legacy code-page bytes.
    pub(crate) fn string(&mut self, field: &'static str) -> QueryResult<String> {
        let end = self
            .buf
            .iter()
            .position(|&b| b == 0)
            .ok_or(QueryError::Truncated(field))?;
        let value = String::from_utf8_lossy(&self.buf[..end]).into_owned();
        self.buf.advance(end + 1);
        Ok(value)
    }

    pub(crate) fn has_remaining(&self) -> bool {
        self.buf.has_remaining()
    }

    pub(crate) fn rest(self) -> &'a [u8] {
        self.buf
    }
}
