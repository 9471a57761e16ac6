//! LIFX LAN protocol implementation of the device layer.
//!
//! Lights are found by broadcasting `GetService` and collecting `StateService`
//! replies for one discovery window. Commands are UDP datagrams built with
//! `lifx-core`. In broadcast mode, set-power and set-color go to every light on
//! the network (tagged messages to 255.255.255.255); power queries always go to
//! the discovered light, since only one answer can be interpreted.

use anyhow::{Context, Result};
use lifx_core::{BuildOptions, HSBK, Message, RawMessage};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

use super::{DeviceDiscovery, LightDevice, PowerState, transition_ms};
use crate::color::ColorState;
use crate::constants::{DISCOVERY_WINDOW_MS, LIFX_PORT, SOCKET_BUFFER_SIZE, SOCKET_TIMEOUT_MS};
use crate::logger::Log;

/// A LIFX light reached over the LAN.
pub struct LifxLight {
    socket: UdpSocket,
    addr: SocketAddr,
    target: u64,
    broadcast: bool,
    source: u32,
    sequence: AtomicU8,
}

impl LifxLight {
    /// Open a socket for the light at `addr` with the given device `target` id.
    pub fn connect(addr: SocketAddr, target: u64, broadcast: bool) -> Result<Self> {
        let socket = open_socket()?;
        Ok(Self {
            socket,
            addr,
            target,
            broadcast,
            source: std::process::id(),
            sequence: AtomicU8::new(0),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    fn next_sequence(&self) -> u8 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }

    /// Send a command, to every light or to this one depending on the mode.
    fn send_command(&self, message: Message) -> Result<()> {
        let (target, addr) = if self.broadcast {
            (None, broadcast_addr())
        } else {
            (Some(self.target), self.addr)
        };

        let packet = encode(message, target, self.source, self.next_sequence(), false)?;
        self.socket
            .send_to(&packet, addr)
            .with_context(|| format!("Failed to send LIFX command to {addr}"))?;
        Ok(())
    }
}

impl LightDevice for LifxLight {
    fn set_power(&self, on: bool) -> Result<()> {
        Log::log_debug(&format!("Set power: {}", if on { "on" } else { "off" }));
        self.send_command(Message::LightSetPower {
            level: if on { u16::MAX } else { 0 },
            duration: 0,
        })
    }

    fn set_color(&self, color: &ColorState, transition: Duration) -> Result<()> {
        let duration = transition_ms(transition)?;
        Log::log_debug(&format!(
            "Set color: h={:.3} s={:.3} b={:.3} {}K over {} ms",
            color.hue, color.saturation, color.brightness, color.kelvin, duration
        ));
        self.send_command(Message::LightSetColor {
            reserved: 0,
            color: to_hsbk(color),
            duration,
        })
    }

    fn get_power(&self) -> Result<PowerState> {
        let sequence = self.next_sequence();
        let packet = encode(
            Message::LightGetPower,
            Some(self.target),
            self.source,
            sequence,
            true,
        )?;
        self.socket
            .send_to(&packet, self.addr)
            .with_context(|| format!("Failed to query power of {}", self.addr))?;

        let deadline = Instant::now() + Duration::from_millis(SOCKET_TIMEOUT_MS);
        let mut buf = [0u8; SOCKET_BUFFER_SIZE];
        loop {
            let Some((len, _)) = receive_before(&self.socket, &mut buf, deadline)? else {
                anyhow::bail!("No power state from {} within {} ms", self.addr, SOCKET_TIMEOUT_MS);
            };

            let Ok(raw) = RawMessage::unpack(&buf[..len]) else {
                continue;
            };
            if raw.frame_addr.target != self.target {
                continue;
            }
            if let Ok(Message::LightStatePower { level }) = Message::from_raw(&raw) {
                let state = if level == 0 {
                    PowerState::Off
                } else {
                    PowerState::On
                };
                Log::log_debug(&format!("Power state: {state:?}"));
                return Ok(state);
            }
        }
    }
}

/// LIFX discovery by `GetService` broadcast.
#[derive(Debug, Clone, Copy)]
pub struct LifxDiscovery {
    broadcast: bool,
}

impl LifxDiscovery {
    /// `broadcast` is passed on to the discovered lights.
    pub fn new(broadcast: bool) -> Self {
        Self { broadcast }
    }
}

impl DeviceDiscovery for LifxDiscovery {
    type Device = LifxLight;

    fn discover(&self) -> Result<Vec<LifxLight>> {
        let socket = open_socket()?;
        let packet = encode(Message::GetService, None, std::process::id(), 0, true)?;
        socket
            .send_to(&packet, broadcast_addr())
            .context("Failed to broadcast LIFX discovery")?;

        let deadline = Instant::now() + Duration::from_millis(DISCOVERY_WINDOW_MS);
        let mut buf = [0u8; SOCKET_BUFFER_SIZE];
        let mut seen = HashSet::new();
        let mut lights = Vec::new();

        while let Some((len, from)) = receive_before(&socket, &mut buf, deadline)? {
            let Ok(raw) = RawMessage::unpack(&buf[..len]) else {
                continue;
            };
            let target = raw.frame_addr.target;
            if let Ok(Message::StateService { port, .. }) = Message::from_raw(&raw) {
                let Some(addr) = service_addr(from, port) else {
                    Log::log_debug(&format!("Ignoring service reply with port {port} from {from}"));
                    continue;
                };
                if !seen.insert(target) {
                    continue;
                }
                Log::log_debug(&format!("Found light {target:016x} at {addr}"));
                lights.push(LifxLight::connect(addr, target, self.broadcast)?);
            }
        }

        Ok(lights)
    }
}

/// Address a `StateService` reply points at. `None` for a port of 0 or one
/// that does not fit in 16 bits.
fn service_addr(from: SocketAddr, port: u32) -> Option<SocketAddr> {
    match u16::try_from(port) {
        Ok(0) | Err(_) => None,
        Ok(port) => Some(SocketAddr::new(from.ip(), port)),
    }
}

fn open_socket() -> Result<UdpSocket> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).context("Failed to bind UDP socket")?;
    socket
        .set_broadcast(true)
        .context("Failed to enable UDP broadcast")?;
    Ok(socket)
}

fn broadcast_addr() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::BROADCAST, LIFX_PORT))
}

/// Receive one datagram, or `None` once `deadline` has passed.
fn receive_before(
    socket: &UdpSocket,
    buf: &mut [u8],
    deadline: Instant,
) -> Result<Option<(usize, SocketAddr)>> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        return Ok(None);
    }
    socket
        .set_read_timeout(Some(remaining))
        .context("Failed to set socket timeout")?;

    match socket.recv_from(buf) {
        Ok(received) => Ok(Some(received)),
        Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(None),
        Err(e) => Err(e).context("Failed to receive from UDP socket"),
    }
}

/// Serialize a message. A `None` target addresses every light (tagged).
fn encode(
    message: Message,
    target: Option<u64>,
    source: u32,
    sequence: u8,
    res_required: bool,
) -> Result<Vec<u8>> {
    let options = BuildOptions {
        target,
        res_required,
        sequence,
        source,
        ..Default::default()
    };
    let raw = RawMessage::build(&options, message).context("Failed to build LIFX message")?;
    raw.pack().context("Failed to pack LIFX message")
}

/// Scale a [0, 1] component to the protocol's 16-bit range.
fn unit_to_u16(value: f64) -> u16 {
    (value.clamp(0.0, 1.0) * f64::from(u16::MAX)).round() as u16
}

fn to_hsbk(color: &ColorState) -> HSBK {
    HSBK {
        hue: unit_to_u16(color.hue),
        saturation: unit_to_u16(color.saturation),
        brightness: unit_to_u16(color.brightness),
        kelvin: color.kelvin,
    }
}
