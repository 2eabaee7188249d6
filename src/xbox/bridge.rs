//! Stateless Xbox operations.
//!
//! Each call binds its own socket, fires one or two datagrams, maybe waits
//! for replies, and turns the outcome into a serializable report. Socket
//! errors never escape as `Err`; they become `{"status":"error"}` reports.

use std::io;
use std::net::SocketAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::time::{self, Instant};

use crate::config::XboxConfig;
use crate::observability::metrics;
use crate::xbox::buttons::button_code;
use crate::xbox::packet::{self, DiscoveredConsole, InputPacket};
use crate::xbox::transport::{DatagramSocket, Transport, UdpTransport};

const RECV_BUFFER_LEN: usize = 1024;

const INPUT_NOTE: &str = "Basic packet sent. Full control requires SmartGlass auth.";

/// Result of `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusReport {
    Online { ip: String },
    Offline { ip: String },
    Error { error: String },
}

/// One element of the `discover` result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiscoveryEntry {
    Found(DiscoveredConsole),
    NoResponse { ip: String },
    Error { ip: String, error: String },
}

/// Result of `wake`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WakeReport {
    WakeSent { ip: String },
    Error { error: String },
}

/// Result of `send_input`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InputReport {
    Sent {
        button: String,
        code: String,
        note: &'static str,
    },
    Error { error: String },
}

/// Bridge toward one configured console.
pub struct XboxBridge<T = UdpTransport> {
    config: XboxConfig,
    transport: T,
}

impl XboxBridge<UdpTransport> {
    /// Bridge over real UDP sockets.
    pub fn udp(config: XboxConfig) -> Self {
        Self::new(config, UdpTransport)
    }
}

impl<T: Transport> XboxBridge<T> {
    pub fn new(config: XboxConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &XboxConfig {
        &self.config
    }

    fn unicast_target(&self) -> SocketAddr {
        SocketAddr::new(self.config.address, self.config.port)
    }

    fn broadcast_target(&self) -> SocketAddr {
        SocketAddr::new(self.config.broadcast_address, self.config.port)
    }

    fn configured_ip(&self) -> String {
        self.config.address.to_string()
    }

    /// Ping the console with a discovery request and wait for any reply.
    pub async fn status(&self) -> StatusReport {
        let report = match self.probe().await {
            Ok(Some(from)) => StatusReport::Online {
                ip: from.ip().to_string(),
            },
            Ok(None) => StatusReport::Offline {
                ip: self.configured_ip(),
            },
            Err(e) => {
                tracing::warn!(target_addr = %self.unicast_target(), error = %e, "Status probe failed");
                StatusReport::Error {
                    error: e.to_string(),
                }
            }
        };
        let outcome = match report {
            StatusReport::Online { .. } => "online",
            StatusReport::Offline { .. } => "offline",
            StatusReport::Error { .. } => "error",
        };
        metrics::record_xbox_operation("status", outcome);
        report
    }

    async fn probe(&self) -> io::Result<Option<SocketAddr>> {
        let socket = self.transport.bind(false).await?;
        send_packet(&socket, &packet::discovery_request(), self.unicast_target(), "discovery").await?;

        let mut buf = [0u8; RECV_BUFFER_LEN];
        let wait = Duration::from_millis(self.config.status_timeout_ms);
        match time::timeout(wait, socket.recv_from(&mut buf)).await {
            Ok(Ok((_, from))) => Ok(Some(from)),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(None),
        }
    }

    /// Unicast and broadcast a discovery request and collect the replies.
    ///
    /// The receive loop ends at the first receive that times out, or once
    /// the window has elapsed, whichever comes first.
    pub async fn discover(&self) -> Vec<DiscoveryEntry> {
        let entries = match self.collect_replies().await {
            Ok(found) if found.is_empty() => vec![DiscoveryEntry::NoResponse {
                ip: self.configured_ip(),
            }],
            Ok(found) => found.into_iter().map(DiscoveryEntry::Found).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Discovery failed");
                vec![DiscoveryEntry::Error {
                    ip: self.configured_ip(),
                    error: e.to_string(),
                }]
            }
        };
        let outcome = match entries.first() {
            Some(DiscoveryEntry::Found(_)) => "found",
            Some(DiscoveryEntry::Error { .. }) => "error",
            _ => "no_response",
        };
        metrics::record_xbox_operation("discover", outcome);
        entries
    }

    async fn collect_replies(&self) -> io::Result<Vec<DiscoveredConsole>> {
        let socket = self.transport.bind(true).await?;
        self.send_unicast_and_broadcast(&socket, &packet::discovery_request(), "discovery")
            .await?;

        let window = Duration::from_millis(self.config.discover_timeout_ms);
        let start = Instant::now();
        let mut found = Vec::new();
        let mut buf = [0u8; RECV_BUFFER_LEN];

        while start.elapsed() < window {
            match time::timeout(window, socket.recv_from(&mut buf)).await {
                Ok(Ok((n, from))) => match packet::parse_discovery_response(&buf[..n], from) {
                    Some(console) => {
                        tracing::info!(ip = %console.ip, name = ?console.name, "Console answered discovery");
                        found.push(console);
                    }
                    None => {
                        tracing::debug!(from = %from, len = n, "Ignoring non-discovery datagram");
                    }
                },
                Ok(Err(e)) => return Err(e),
                Err(_) => break,
            }
        }
        Ok(found)
    }

    /// Unicast and broadcast a power-on packet. Nothing confirms it worked.
    pub async fn wake(&self) -> WakeReport {
        let report = match self.send_power_on().await {
            Ok(()) => WakeReport::WakeSent {
                ip: self.configured_ip(),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Wake failed");
                WakeReport::Error {
                    error: e.to_string(),
                }
            }
        };
        let outcome = if matches!(report, WakeReport::Error { .. }) { "error" } else { "sent" };
        metrics::record_xbox_operation("wake", outcome);
        report
    }

    async fn send_power_on(&self) -> io::Result<()> {
        let socket = self.transport.bind(true).await?;
        self.send_unicast_and_broadcast(&socket, &packet::power_on(), "power_on")
            .await
    }

    /// Press, hold, and release one button.
    ///
    /// Unknown names are rejected before any socket is opened. The hold is
    /// an async sleep on the caller's task.
    pub async fn send_input(&self, button: &str, hold: Option<Duration>) -> InputReport {
        let Some(code) = button_code(button) else {
            tracing::warn!(button = %button, "Unknown button");
            metrics::record_xbox_operation("input", "rejected");
            return InputReport::Error {
                error: format!("Unknown button: {button}"),
            };
        };

        let hold = hold.unwrap_or(Duration::from_millis(self.config.hold_time_ms));
        let report = match self.press_and_release(code, hold).await {
            Ok(()) => InputReport::Sent {
                button: button.to_string(),
                code: format!("{code:#x}"),
                note: INPUT_NOTE,
            },
            Err(e) => {
                tracing::warn!(button = %button, error = %e, "Input send failed");
                InputReport::Error {
                    error: e.to_string(),
                }
            }
        };
        let outcome = if matches!(report, InputReport::Error { .. }) { "error" } else { "sent" };
        metrics::record_xbox_operation("input", outcome);
        report
    }

    async fn press_and_release(&self, code: u16, hold: Duration) -> io::Result<()> {
        let socket = self.transport.bind(false).await?;
        let target = self.unicast_target();
        let timestamp = now_millis();

        let press = InputPacket::press(code, timestamp);
        send_packet(&socket, &press.encode(), target, "input_press").await?;

        time::sleep(hold).await;

        let hold_ms = u32::try_from(hold.as_millis()).unwrap_or(u32::MAX);
        let release = InputPacket::release(timestamp, hold_ms);
        send_packet(&socket, &release.encode(), target, "input_release").await?;
        Ok(())
    }

    /// Try both destinations; fail only if neither send went out.
    async fn send_unicast_and_broadcast(
        &self,
        socket: &T::Socket,
        packet: &[u8],
        kind: &'static str,
    ) -> io::Result<()> {
        let unicast = send_packet(socket, packet, self.unicast_target(), kind).await;
        let broadcast = send_packet(socket, packet, self.broadcast_target(), kind).await;

        match (unicast, broadcast) {
            (Err(e), Err(_)) => Err(e),
            _ => Ok(()),
        }
    }
}

async fn send_packet<S: DatagramSocket>(
    socket: &S,
    packet: &[u8],
    target: SocketAddr,
    kind: &'static str,
) -> io::Result<()> {
    match socket.send_to(packet, target).await {
        Ok(n) => {
            tracing::debug!(target_addr = %target, bytes = n, kind, "Packet sent");
            metrics::record_xbox_packet(kind, true);
            Ok(())
        }
        Err(e) => {
            tracing::warn!(target_addr = %target, kind, error = %e, "Packet send failed");
            metrics::record_xbox_packet(kind, false);
            Err(e)
        }
    }
}

/// Milliseconds since the UNIX epoch, truncated to 32 bits.
fn now_millis() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u32)
        .unwrap_or(0)
}
