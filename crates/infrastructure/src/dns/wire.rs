//! Message ⇄ wire-format conversion on top of `hickory-proto`.

use dres_domain::DomainError;
use hickory_proto::op::Message;
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};

pub fn encode(message: &Message) -> Result<Vec<u8>, DomainError> {
    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);

    message.emit(&mut encoder).map_err(|e| {
        DomainError::InvalidDnsResponse(format!("Failed to serialize DNS message: {}", e))
    })?;

    Ok(buf)
}

pub fn decode(bytes: &[u8]) -> Result<Message, DomainError> {
    Message::from_vec(bytes)
        .map_err(|e| DomainError::InvalidDnsResponse(format!("Failed to parse DNS message: {}", e)))
}

/// Largest response a UDP client accepts without EDNS0.
pub const MIN_UDP_PAYLOAD: usize = 512;

const OPT_RR_TYPE: u16 = 41;

/// Largest UDP response the sender of `query` accepts: the payload size of
/// its EDNS0 OPT record, never below 512 bytes.
pub fn udp_payload_limit(query: &[u8]) -> usize {
    advertised_payload(query)
        .map_or(MIN_UDP_PAYLOAD, |size| (size as usize).max(MIN_UDP_PAYLOAD))
}

/// Scans the raw message for an OPT record in the additional section.
fn advertised_payload(buf: &[u8]) -> Option<u16> {
    let qdcount = read_u16(buf, 4)?;
    let ancount = read_u16(buf, 6)?;
    let nscount = read_u16(buf, 8)?;
    let arcount = read_u16(buf, 10)?;

    let mut pos = 12;
    for _ in 0..qdcount {
        pos = skip_name(buf, pos)? + 4;
    }
    for _ in 0..(ancount as usize + nscount as usize) {
        pos = skip_record(buf, pos)?;
    }
    for _ in 0..arcount {
        let type_pos = skip_name(buf, pos)?;
        if read_u16(buf, type_pos)? == OPT_RR_TYPE {
            // OPT carries the payload size in its CLASS field.
            return read_u16(buf, type_pos + 2);
        }
        pos = skip_record(buf, pos)?;
    }

    None
}

fn read_u16(buf: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_be_bytes([*buf.get(at)?, *buf.get(at + 1)?]))
}

fn skip_name(buf: &[u8], mut pos: usize) -> Option<usize> {
    loop {
        let len = *buf.get(pos)?;
        match len {
            0 => return Some(pos + 1),
            l if l & 0xC0 == 0xC0 => return Some(pos + 2),
            l => pos += 1 + l as usize,
        }
    }
}

/// Skips name, type, class, ttl, rdlength and rdata.
fn skip_record(buf: &[u8], pos: usize) -> Option<usize> {
    let fixed = skip_name(buf, pos)?;
    let rdlen = read_u16(buf, fixed + 8)? as usize;
    Some(fixed + 10 + rdlen)
}
