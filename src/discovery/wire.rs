//! DNS-style message helpers shared by the mDNS and NetBIOS codecs

/// Size of the fixed DNS/NBNS message header
pub const HEADER_LEN: usize = 12;

/// Response flag in the header flags word
pub const FLAG_RESPONSE: u16 = 0x8000;

// Guards against pointer loops in hostile packets
const MAX_POINTER_JUMPS: usize = 16;

/// The fixed header of a DNS or NBNS message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Header {
    pub id: u16,
    pub flags: u16,
    pub questions: u16,
    pub answers: u16,
    pub authorities: u16,
    pub additionals: u16,
}

impl Header {
    /// Parse the header at the start of `buf`
    #[must_use]
    pub fn parse(buf: &[u8]) -> Option<Self> {
        Some(Self {
            id: read_u16(buf, 0)?,
            flags: read_u16(buf, 2)?,
            questions: read_u16(buf, 4)?,
            answers: read_u16(buf, 6)?,
            authorities: read_u16(buf, 8)?,
            additionals: read_u16(buf, 10)?,
        })
    }

    /// Whether the message is a response rather than a query
    #[must_use]
    pub fn is_response(&self) -> bool {
        self.flags & FLAG_RESPONSE != 0
    }

    /// Total resource records following the questions
    #[must_use]
    pub fn record_count(&self) -> usize {
        usize::from(self.answers) + usize::from(self.authorities) + usize::from(self.additionals)
    }
}

/// Fixed fields following a resource record's owner name
#[derive(Debug, Clone, Copy)]
pub struct RecordInfo {
    /// Record type (PTR, NBSTAT, ...)
    pub rtype: u16,
    /// Offset of the record data in the message
    pub rdata_start: usize,
    /// Length of the record data
    pub rdata_len: usize,
}

/// Big-endian u16 at `offset`
#[must_use]
pub fn read_u16(buf: &[u8], offset: usize) -> Option<u16> {
    let bytes = buf.get(offset..offset + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Read a possibly compressed domain name starting at `offset`
///
/// Returns the dotted name and the offset just past the name in the original
/// position (pointers are two bytes there).
#[must_use]
pub fn read_name(buf: &[u8], offset: usize) -> Option<(String, usize)> {
    let mut labels: Vec<String> = Vec::new();
    let mut pos = offset;
    let mut end = None;
    let mut jumps = 0;

    loop {
        let len = *buf.get(pos)?;
        match len & 0xC0 {
            0x00 => {
                if len == 0 {
                    return Some((labels.join("."), end.unwrap_or(pos + 1)));
                }
                let start = pos + 1;
                let label = buf.get(start..start + usize::from(len))?;
                labels.push(String::from_utf8_lossy(label).into_owned());
                pos = start + usize::from(len);
            }
            0xC0 => {
                let low = *buf.get(pos + 1)?;
                if end.is_none() {
                    end = Some(pos + 2);
                }
                jumps += 1;
                if jumps > MAX_POINTER_JUMPS {
                    return None;
                }
                pos = (usize::from(len & 0x3F) << 8) | usize::from(low);
            }
            _ => return None,
        }
    }
}

/// Offset just past the question section
#[must_use]
pub fn skip_questions(buf: &[u8], header: &Header) -> Option<usize> {
    let mut pos = HEADER_LEN;
    for _ in 0..header.questions {
        let (_, next) = read_name(buf, pos)?;
        // QTYPE + QCLASS
        pos = next + 4;
    }
    (pos <= buf.len()).then_some(pos)
}

/// Read a resource record's owner name and fixed fields at `offset`
#[must_use]
pub fn read_record(buf: &[u8], offset: usize) -> Option<(String, RecordInfo, usize)> {
    let (owner, pos) = read_name(buf, offset)?;
    let rtype = read_u16(buf, pos)?;
    // class (2) + ttl (4)
    let rdata_len = usize::from(read_u16(buf, pos + 8)?);
    let rdata_start = pos + 10;
    if rdata_start + rdata_len > buf.len() {
        return None;
    }
    Some((
        owner,
        RecordInfo {
            rtype,
            rdata_start,
            rdata_len,
        },
        rdata_start + rdata_len,
    ))
}
