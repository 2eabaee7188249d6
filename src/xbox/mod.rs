//! Xbox bridge subsystem.
//!
//! # Data Flow
//! ```text
//! /api/xbox/<op>
//!     → bridge.rs (status / discover / wake / send_input)
//!     → buttons.rs (name → flag, input only)
//!     → packet.rs (fixed-layout big-endian datagrams)
//!     → transport.rs (fresh UDP socket per operation)
//!     → console :5050 (unicast, plus broadcast for discover/wake)
//! ```
//!
//! # Design Decisions
//! - No connection, session or handshake; every operation stands alone
//! - Packets are best-effort approximations of SmartGlass and are not
//!   confirmed by the console
//! - Transport is a trait so tests can record datagrams without a network

pub mod bridge;
pub mod buttons;
pub mod packet;
pub mod transport;

pub use bridge::{DiscoveryEntry, InputReport, StatusReport, WakeReport, XboxBridge};
pub use buttons::{button_code, BUTTONS};
pub use transport::{DatagramSocket, Transport, UdpTransport};
