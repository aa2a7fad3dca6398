//! Connect reply framing
//!
//! ```text
//! ACK | NAK                                    3 bytes
//! AGI421009<type:15><packet:3><total:3><len:10>  40 byte header, repeated per packet
//! <payload:len>
//! ```
//!
//! Every reply carries at least one packet (possibly empty). A `NAK` carries a
//! single `NACK` packet whose payload is the diagnostic text. Payload lines are
//! separated by `\n` and never split across packets.

use std::io::{Read, Write};

use crate::{ConnectError, Result};

pub const MAGIC: &str = "AGI421009";
pub const HEADER_LEN: usize = 40;
const TYPE_LEN: usize = 15;
const MAX_PACKETS: usize = 999;
const MAX_PACKET_BYTES: usize = 64 * 1024;
/// Largest payload accepted from a single header; one oversized line may exceed a packet
const MAX_PAYLOAD_BYTES: usize = 256 * MAX_PACKET_BYTES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ack,
    Nak,
}

impl Status {
    fn as_bytes(&self) -> &'static [u8; 3] {
        match self {
            Status::Ack => b"ACK",
            Status::Nak => b"NAK",
        }
    }
}

/// Decoded 40-byte packet header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketHeader {
    pub kind: String,
    pub packet: usize,
    pub total: usize,
    pub len: usize,
}

impl PacketHeader {
    pub fn encode(&self) -> Result<[u8; HEADER_LEN]> {
        if self.total == 0 || self.total > MAX_PACKETS || self.packet == 0 || self.packet > self.total {
            return Err(ConnectError::Protocol(format!(
                "packet {}/{} out of range",
                self.packet, self.total
            )));
        }
        if self.len > MAX_PAYLOAD_BYTES {
            return Err(ConnectError::Protocol(format!("payload too large: {}", self.len)));
        }

        let kind: String = self.kind.chars().filter(char::is_ascii).take(TYPE_LEN).collect();
        let text = format!(
            "{}{:<width$}{:03}{:03}{:010}",
            MAGIC,
            kind,
            self.packet,
            self.total,
            self.len,
            width = TYPE_LEN
        );

        let mut buf = [0u8; HEADER_LEN];
        buf.copy_from_slice(text.as_bytes());
        Ok(buf)
    }

    pub fn decode(buf: &[u8; HEADER_LEN]) -> Result<Self> {
        if !buf.is_ascii() {
            return Err(ConnectError::Protocol(format!(
                "header is not ASCII: {:?}",
                String::from_utf8_lossy(buf)
            )));
        }
        let text = std::str::from_utf8(buf)
            .map_err(|_| ConnectError::Protocol("header is not ASCII".to_string()))?;

        if !text.starts_with(MAGIC) {
            return Err(ConnectError::Protocol(format!("bad header magic: '{}'", text)));
        }
        let rest = &text[MAGIC.len()..];
        let kind = rest[..TYPE_LEN].trim_end().to_string();
        let field = |range: std::ops::Range<usize>| -> Result<usize> {
            rest[range]
                .parse::<usize>()
                .map_err(|_| ConnectError::Protocol(format!("bad header field in '{}'", text)))
        };

        let packet = field(TYPE_LEN..TYPE_LEN + 3)?;
        let total = field(TYPE_LEN + 3..TYPE_LEN + 6)?;
        let len = field(TYPE_LEN + 6..TYPE_LEN + 16)?;

        if total == 0 || packet == 0 || packet > total {
            return Err(ConnectError::Protocol(format!(
                "packet {}/{} out of range",
                packet, total
            )));
        }
        if len > MAX_PAYLOAD_BYTES {
            return Err(ConnectError::Protocol(format!(
                "payload length {} exceeds {}",
                len, MAX_PAYLOAD_BYTES
            )));
        }

        Ok(Self { kind, packet, total, len })
    }
}

/// Complete reply to one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: Status,
    pub kind: String,
    pub lines: Vec<String>,
}

impl Reply {
    pub fn ack(kind: &str, lines: Vec<String>) -> Self {
        Self {
            status: Status::Ack,
            kind: kind.to_string(),
            lines,
        }
    }

    pub fn nak(detail: &str) -> Self {
        Self {
            status: Status::Nak,
            kind: "NACK".to_string(),
            lines: vec![detail.to_string()],
        }
    }

    /// Wire bytes for this reply
    pub fn encode(&self) -> Result<Vec<u8>> {
        let packets = pack_lines(&self.lines);
        if packets.len() > MAX_PACKETS {
            return Err(ConnectError::Protocol(format!(
                "reply needs {} packets (max {})",
                packets.len(),
                MAX_PACKETS
            )));
        }

        let total = packets.len();
        let mut out = Vec::with_capacity(3 + total * HEADER_LEN);
        out.extend_from_slice(self.status.as_bytes());

        for (i, payload) in packets.iter().enumerate() {
            let header = PacketHeader {
                kind: self.kind.clone(),
                packet: i + 1,
                total,
                len: payload.len(),
            };
            out.extend_from_slice(&header.encode()?);
            out.extend_from_slice(payload.as_bytes());
        }

        Ok(out)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.encode()?)?;
        writer.flush()?;
        Ok(())
    }

    /// Read one reply from a blocking stream
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut status_buf = [0u8; 3];
        reader.read_exact(&mut status_buf)?;
        let status = match &status_buf {
            b"ACK" => Status::Ack,
            b"NAK" => Status::Nak,
            other => {
                return Err(ConnectError::Protocol(format!(
                    "bad status bytes {:?}",
                    String::from_utf8_lossy(other)
                )))
            }
        };

        let mut kind = String::new();
        let mut lines = Vec::new();
        let mut expected = 1;

        loop {
            let mut header_buf = [0u8; HEADER_LEN];
            reader.read_exact(&mut header_buf)?;
            let header = PacketHeader::decode(&header_buf)?;

            if header.packet != expected {
                return Err(ConnectError::Protocol(format!(
                    "expected packet {}, got {}",
                    expected, header.packet
                )));
            }

            let mut payload = vec![0u8; header.len];
            reader.read_exact(&mut payload)?;
            let payload = String::from_utf8(payload)
                .map_err(|_| ConnectError::Protocol("payload is not UTF-8".to_string()))?;

            if !payload.is_empty() {
                lines.extend(payload.split('\n').map(str::to_string));
            }
            kind = header.kind;

            if header.packet == header.total {
                break;
            }
            expected += 1;
        }

        Ok(Self { status, kind, lines })
    }
}

/// Group lines into packet payloads without splitting a line
fn pack_lines(lines: &[String]) -> Vec<String> {
    let mut packets = Vec::new();
    let mut current = String::new();

    for line in lines {
        if !current.is_empty() && current.len() + 1 + line.len() > MAX_PACKET_BYTES {
            packets.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    if !current.is_empty() || packets.is_empty() {
        packets.push(current);
    }

    packets
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_layout() {
        let header = PacketHeader {
            kind: "DataProvider".to_string(),
            packet: 1,
            total: 2,
            len: 42,
        };
        let buf = header.encode().unwrap();
        assert_eq!(&buf[..], b"AGI421009DataProvider   0010020000000042");
        assert_eq!(PacketHeader::decode(&buf).unwrap(), header);
    }

    #[test]
    fn test_header_rejects_garbage() {
        let mut buf = [b' '; HEADER_LEN];
        assert!(PacketHeader::decode(&buf).is_err());

        buf.copy_from_slice(b"AGI421009New            0030020000000000");
        assert!(PacketHeader::decode(&buf).is_err()); // packet 3 of 2
    }

    #[test]
    fn test_header_rejects_non_ascii() {
        let mut bytes = b"ACK".to_vec();
        bytes.extend_from_slice("AGI421009ABCDEFGHIJKLMN\u{e9}010010000000000".as_bytes());
        assert_eq!(bytes.len(), 3 + HEADER_LEN);

        let err = Reply::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, ConnectError::Protocol(ref m) if m.contains("ASCII")), "{}", err);
    }

    #[test]
    fn test_oversized_length_rejected() {
        let mut bytes = b"ACK".to_vec();
        bytes.extend_from_slice(b"AGI421009DataProvider   0010019999999999");

        let err = Reply::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, ConnectError::Protocol(ref m) if m.contains("exceeds")), "{}", err);

        let header = PacketHeader {
            kind: "DataProvider".to_string(),
            packet: 1,
            total: 1,
            len: MAX_PAYLOAD_BYTES + 1,
        };
        assert!(header.encode().is_err());
    }

    #[test]
    fn test_empty_ack() {
        let bytes = Reply::ack("New", Vec::new()).encode().unwrap();
        assert_eq!(bytes.len(), 3 + HEADER_LEN);

        let reply = Reply::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(reply.status, Status::Ack);
        assert_eq!(reply.kind, "New");
        assert!(reply.lines.is_empty());
    }

    #[test]
    fn test_nak_carries_detail() {
        let bytes = Reply::nak("unknown object").encode().unwrap();
        assert!(bytes.starts_with(b"NAK"));

        let reply = Reply::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(reply.status, Status::Nak);
        assert_eq!(reply.lines, vec!["unknown object"]);
    }

    #[test]
    fn test_large_reply_spans_packets() {
        let line = "x".repeat(1000);
        let lines: Vec<String> = (0..200).map(|_| line.clone()).collect();
        let bytes = Reply::ack("DataProvider", lines.clone()).encode().unwrap();

        let raw: [u8; HEADER_LEN] = bytes[3..3 + HEADER_LEN].try_into().unwrap();
        let header = PacketHeader::decode(&raw).unwrap();
        assert!(header.total > 1);

        let reply = Reply::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(reply.lines, lines);
    }

    #[test]
    fn test_truncated_stream() {
        let mut bytes = Reply::ack("X", vec!["abc".to_string()]).encode().unwrap();
        bytes.truncate(bytes.len() - 1);
        assert!(Reply::read_from(&mut Cursor::new(bytes)).is_err());
    }
}
