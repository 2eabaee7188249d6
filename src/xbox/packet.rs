//! SmartGlass-style datagram layouts.
//!
//! These layouts are reverse-engineered guesses, not the validated protocol:
//! there is no session id, checksum or encryption, and a console may ignore
//! them entirely. All multi-byte fields are big-endian.
//!
//! ```text
//! discovery / power-on (46 bytes)
//!   0      2      4                                   46
//!   | type | 0000 | zero padding ....................... |
//!
//! input press / release (40 bytes)
//!   0      2       4             8        10       12         40
//!   | D00D | flags | timestamp ms | button | 0000 | zero pad ... |
//! ```

use std::net::SocketAddr;

use serde::Serialize;

pub const MSG_DISCOVERY_REQUEST: u16 = 0xDD00;
pub const MSG_DISCOVERY_RESPONSE: u16 = 0xDD01;
pub const MSG_POWER_ON: u16 = 0xDD02;
pub const MSG_INPUT: u16 = 0xD00D;

pub const FLAG_PRESS: u16 = 0x0001;
pub const FLAG_RELEASE: u16 = 0x0002;

pub const DISCOVERY_PACKET_LEN: usize = 46;
pub const INPUT_PACKET_LEN: usize = 40;

/// Offset of the big-endian button field inside an input packet.
pub const BUTTON_OFFSET: usize = 8;

const NAME_OFFSET: usize = 32;
const NAME_SCAN_END: usize = 100;

fn header_packet(msg_type: u16) -> [u8; DISCOVERY_PACKET_LEN] {
    let mut packet = [0u8; DISCOVERY_PACKET_LEN];
    packet[0..2].copy_from_slice(&msg_type.to_be_bytes());
    packet
}

/// Discovery request, also used as the `status` ping.
pub fn discovery_request() -> [u8; DISCOVERY_PACKET_LEN] {
    header_packet(MSG_DISCOVERY_REQUEST)
}

/// Power-on request. Only effective with "instant-on" power mode.
pub fn power_on() -> [u8; DISCOVERY_PACKET_LEN] {
    header_packet(MSG_POWER_ON)
}

/// One gamepad input datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPacket {
    pub flags: u16,
    pub timestamp_ms: u32,
    pub button: u16,
}

impl InputPacket {
    pub fn press(button: u16, timestamp_ms: u32) -> Self {
        Self {
            flags: FLAG_PRESS,
            timestamp_ms,
            button,
        }
    }

    /// Release that follows a press held for `hold_ms`.
    pub fn release(press_timestamp_ms: u32, hold_ms: u32) -> Self {
        Self {
            flags: FLAG_RELEASE,
            timestamp_ms: press_timestamp_ms.wrapping_add(hold_ms),
            button: 0,
        }
    }

    pub fn encode(&self) -> [u8; INPUT_PACKET_LEN] {
        let mut packet = [0u8; INPUT_PACKET_LEN];
        packet[0..2].copy_from_slice(&MSG_INPUT.to_be_bytes());
        packet[2..4].copy_from_slice(&self.flags.to_be_bytes());
        packet[4..8].copy_from_slice(&self.timestamp_ms.to_be_bytes());
        packet[BUTTON_OFFSET..BUTTON_OFFSET + 2].copy_from_slice(&self.button.to_be_bytes());
        // bytes 10..12 reserved, rest padding
        packet
    }

    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < 12 || message_type(data)? != MSG_INPUT {
            return None;
        }
        Some(Self {
            flags: u16::from_be_bytes([data[2], data[3]]),
            timestamp_ms: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            button: u16::from_be_bytes([data[8], data[9]]),
        })
    }
}

/// Big-endian message type of a datagram.
pub fn message_type(data: &[u8]) -> Option<u16> {
    data.get(0..2).map(|b| u16::from_be_bytes([b[0], b[1]]))
}

/// A console that answered a discovery request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredConsole {
    pub ip: String,
    pub port: u16,
    pub raw_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Parse a discovery reply. Anything that is not a `0xDD01` datagram longer
/// than the 4-byte header is ignored.
pub fn parse_discovery_response(data: &[u8], from: SocketAddr) -> Option<DiscoveredConsole> {
    if data.len() <= 4 || message_type(data)? != MSG_DISCOVERY_RESPONSE {
        return None;
    }
    Some(DiscoveredConsole {
        ip: from.ip().to_string(),
        port: from.port(),
        raw_length: data.len(),
        name: device_name(data),
    })
}

/// Printable text starting at offset 32. Every NUL after the offset is tried
/// as a terminator until one yields a non-empty printable name.
fn device_name(data: &[u8]) -> Option<String> {
    let end = data.len().saturating_sub(1).min(NAME_SCAN_END);

    (NAME_OFFSET + 1..end)
        .filter(|&i| data[i] == 0)
        .find_map(|nul| {
            let name = String::from_utf8_lossy(&data[NAME_OFFSET..nul]).replace('\u{FFFD}', "");
            let name = name.trim_matches('\0');
            (!name.is_empty() && name.chars().all(is_printable)).then(|| name.to_string())
        })
}

/// Rejects control characters, line/paragraph breaks and every whitespace
/// except the plain space, plus the common zero-width format characters.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    !(c.is_control()
        || c.is_whitespace()
        || matches!(
            c,
            '\u{00AD}' | '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}'
        ))
}
