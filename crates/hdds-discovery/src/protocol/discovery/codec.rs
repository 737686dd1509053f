// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! PL_CDR parameter-list codec for discovery payloads.
//!
//! # Layout
//! ```text
//! +----------------+----------------+
//! | encapsulation  | options (0)    |   4 bytes, big-endian
//! +----------------+----------------+
//! | pid            | length         |   repeated, list endianness
//! | value (length bytes, 4-aligned) |
//! +----------------+----------------+
//! | PID_SENTINEL   | 0              |
//! +----------------+----------------+
//! ```
//!
//! Decoding accepts PL_CDR_LE and PL_CDR_BE; encoding always emits
//! PL_CDR_LE. Vendor-specific PIDs (0x8000+) are only interpreted for
//! PrismTech-compatible senders and skipped otherwise.

use super::constants::*;
use super::qos::*;
use super::types::{
    DiscoveryPayload, KeyField, KeyHash, ParseError, ParticipantVersionInfo, StatusInfo,
};
use crate::core::discovery::{
    DiscoveryError, DiscoveryResult, EntityId, GuidPrefix, ProtocolVersion, VendorId, GUID,
};
use crate::transport::{Locator, LocatorKind, LOCATOR_SIZE};
use std::time::Duration;

const DURATION_INFINITE_SEC: i32 = 0x7fff_ffff;
const DURATION_INFINITE_FRAC: u32 = 0xffff_ffff;

// ============================================================================
// Decoding
// ============================================================================

/// Bounds-checked reader over one parameter value.
struct Value<'a> {
    data: &'a [u8],
    le: bool,
}

impl<'a> Value<'a> {
    fn bytes(&self, at: usize, n: usize) -> Result<&'a [u8], ParseError> {
        self.data.get(at..at + n).ok_or(ParseError::InvalidFormat)
    }

    fn u32_at(&self, at: usize) -> Result<u32, ParseError> {
        let b = self.bytes(at, 4)?;
        let raw = [b[0], b[1], b[2], b[3]];
        Ok(if self.le {
            u32::from_le_bytes(raw)
        } else {
            u32::from_be_bytes(raw)
        })
    }

    fn i32_at(&self, at: usize) -> Result<i32, ParseError> {
        self.u32_at(at).map(|v| v as i32)
    }

    fn u32(&self) -> Result<u32, ParseError> {
        self.u32_at(0)
    }

    fn bool(&self) -> Result<bool, ParseError> {
        match self.bytes(0, 1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(ParseError::InvalidFormat),
        }
    }

    fn guid(&self) -> Result<GUID, ParseError> {
        let b = self.bytes(0, 16)?;
        let mut raw = [0u8; 16];
        raw.copy_from_slice(b);
        Ok(GUID::from_bytes(raw))
    }

    fn key_hash(&self) -> Result<KeyHash, ParseError> {
        let mut raw = [0u8; 16];
        raw.copy_from_slice(self.bytes(0, 16)?);
        Ok(raw)
    }

    fn duration_at(&self, at: usize) -> Result<Duration, ParseError> {
        let sec = self.i32_at(at)?;
        let frac = self.u32_at(at + 4)?;
        if sec == DURATION_INFINITE_SEC && frac == DURATION_INFINITE_FRAC {
            return Ok(DURATION_INFINITE);
        }
        if sec < 0 {
            return Err(ParseError::InvalidFormat);
        }
        let nanos = ((u64::from(frac) * 1_000_000_000 + (1 << 31)) >> 32) as u32;
        Ok(Duration::new(sec as u64, nanos))
    }

    fn locator(&self) -> Result<Locator, ParseError> {
        if self.data.len() < LOCATOR_SIZE {
            return Err(ParseError::InvalidFormat);
        }
        let kind = LocatorKind::from_wire(self.i32_at(0)?);
        let port = decode_locator_port(self.u32_at(4)?);
        let mut address = [0u8; 16];
        address.copy_from_slice(self.bytes(8, 16)?);
        Ok(Locator {
            kind,
            port,
            address,
        })
    }

    /// CDR string at `at`; returns the string and the aligned end offset.
    fn string_at(&self, at: usize) -> Result<(String, usize), ParseError> {
        let len = self.u32_at(at)? as usize;
        let raw = self.bytes(at + 4, len)?;
        let text = match raw.split_last() {
            Some((0, body)) => body,
            Some(_) => raw,
            None => raw,
        };
        let s = std::str::from_utf8(text).map_err(|_| ParseError::EncodingError)?;
        Ok((s.to_string(), align4(at + 4 + len)))
    }

    fn string(&self) -> Result<String, ParseError> {
        self.string_at(0).map(|(s, _)| s)
    }

    fn octets(&self) -> Result<Vec<u8>, ParseError> {
        let len = self.u32()? as usize;
        Ok(self.bytes(4, len)?.to_vec())
    }

    fn string_seq(&self) -> Result<Vec<String>, ParseError> {
        let count = self.u32()? as usize;
        let mut out = Vec::with_capacity(count.min(64));
        let mut at = 4;
        for _ in 0..count {
            let (s, next) = self.string_at(at)?;
            out.push(s);
            at = next;
        }
        Ok(out)
    }
}

/// Ports are encoded in list endianness; some vendors byte-swap them.
fn decode_locator_port(raw: u32) -> u32 {
    if raw > u32::from(u16::MAX) && raw.swap_bytes() <= u32::from(u16::MAX) {
        raw.swap_bytes()
    } else {
        raw
    }
}

fn align4(n: usize) -> usize {
    (n + 3) & !3
}

fn read_u16(buf: &[u8], at: usize, le: bool) -> u16 {
    let raw = [buf[at], buf[at + 1]];
    if le {
        u16::from_le_bytes(raw)
    } else {
        u16::from_be_bytes(raw)
    }
}

/// Walk the parameters of a list, calling `f(pid, value)` for each until
/// the sentinel.
fn for_each_param<'a, F>(buf: &'a [u8], le: bool, mut f: F) -> Result<(), ParseError>
where
    F: FnMut(u16, Value<'a>) -> Result<(), ParseError>,
{
    let mut offset = 0;
    loop {
        if offset + 4 > buf.len() {
            return Err(ParseError::TruncatedData);
        }
        let pid = read_u16(buf, offset, le);
        let length = read_u16(buf, offset + 2, le) as usize;
        offset += 4;

        if pid == PID_SENTINEL {
            return Ok(());
        }
        if offset + length > buf.len() {
            return Err(ParseError::TruncatedData);
        }
        f(
            pid,
            Value {
                data: &buf[offset..offset + length],
                le,
            },
        )?;
        offset += length;
    }
}

/// Split a serialized payload into (little_endian, parameter bytes).
fn encapsulation(buf: &[u8]) -> Result<(bool, &[u8]), ParseError> {
    if buf.len() < 4 {
        return Err(ParseError::TruncatedData);
    }
    match u16::from_be_bytes([buf[0], buf[1]]) {
        PL_CDR_LE => Ok((true, &buf[4..])),
        PL_CDR_BE => Ok((false, &buf[4..])),
        other => {
            log::debug!("[BUILTIN] Invalid encapsulation: 0x{:04x}", other);
            Err(ParseError::InvalidEncapsulation)
        }
    }
}

/// Decode a serialized discovery payload (CDR header included).
///
/// # Errors
/// - `ParseError::TruncatedData` if the list runs past the buffer or lacks a sentinel.
/// - `ParseError::InvalidEncapsulation` for anything but PL_CDR_LE/BE.
/// - `ParseError::InvalidFormat` for a malformed known parameter or an
///   unknown must-understand parameter.
pub fn decode(buf: &[u8], vendor: VendorId) -> Result<DiscoveryPayload, ParseError> {
    let (le, params) = encapsulation(buf)?;
    let mut p = DiscoveryPayload::default();
    let vendor_pids = vendor.is_prismtech_compatible();

    for_each_param(params, le, |pid, v| {
        if pid & PID_VENDORSPECIFIC_FLAG != 0 && !vendor_pids {
            return Ok(());
        }
        match pid {
            PID_PAD => {}
            PID_PARTICIPANT_GUID => p.participant_guid = Some(v.guid()?),
            PID_ENDPOINT_GUID => p.endpoint_guid = Some(v.guid()?),
            PID_GROUP_GUID => p.group_guid = Some(v.guid()?),
            PID_BUILTIN_ENDPOINT_SET => p.builtin_endpoint_set = Some(v.u32()?),
            PID_PROTOCOL_VERSION => {
                let b = v.bytes(0, 2)?;
                p.protocol_version = Some(ProtocolVersion {
                    major: b[0],
                    minor: b[1],
                });
            }
            PID_VENDOR_ID => {
                let b = v.bytes(0, 2)?;
                p.vendor_id = Some(VendorId([b[0], b[1]]));
            }
            PID_PARTICIPANT_LEASE_DURATION => {
                p.participant_lease_duration = Some(v.duration_at(0)?)
            }
            PID_DEFAULT_UNICAST_LOCATOR => p.default_unicast_locators.push(v.locator()?),
            PID_DEFAULT_MULTICAST_LOCATOR => p.default_multicast_locators.push(v.locator()?),
            PID_METATRAFFIC_UNICAST_LOCATOR => {
                p.metatraffic_unicast_locators.push(v.locator()?)
            }
            PID_METATRAFFIC_MULTICAST_LOCATOR => {
                p.metatraffic_multicast_locators.push(v.locator()?)
            }
            PID_UNICAST_LOCATOR => p.unicast_locators.push(v.locator()?),
            PID_MULTICAST_LOCATOR => p.multicast_locators.push(v.locator()?),
            PID_ENTITY_NAME => p.entity_name = Some(v.string()?),
            PID_EXPECTS_INLINE_QOS => p.expects_inline_qos = Some(v.bool()?),
            PID_KEY_HASH => p.key_hash = Some(v.key_hash()?),
            PID_STATUS_INFO => p.status_info = Some(StatusInfo(status_info_value(&v)?)),
            PID_PRISMTECH_BUILTIN_ENDPOINT_SET => {
                p.prismtech_builtin_endpoint_set = Some(v.u32()?)
            }
            PID_PRISMTECH_PARTICIPANT_VERSION_INFO => {
                let (internals, _) = v.string_at(20)?;
                p.participant_version_info = Some(ParticipantVersionInfo {
                    version: v.u32_at(0)?,
                    flags: v.u32_at(4)?,
                    unused: [v.u32_at(8)?, v.u32_at(12)?, v.u32_at(16)?],
                    internals,
                });
            }
            PID_PRISMTECH_SERVICE_TYPE => p.service_type = Some(v.u32()?),
            PID_PRISMTECH_TYPE_DESCRIPTION => p.type_description = Some(v.string()?),
            PID_PRISMTECH_READER_FAVOURS_SSM => p.reader_favours_ssm = Some(v.u32()? != 0),
            PID_PRISMTECH_WRITER_AUTODISPOSE => {
                p.qos.autodispose_unregistered = Some(v.bool()?)
            }
            other => {
                if !decode_qos_param(other, &v, &mut p.qos)? {
                    if other & PID_MUST_UNDERSTAND_FLAG != 0 {
                        log::debug!("[BUILTIN] Unknown must-understand PID 0x{:04x}", other);
                        return Err(ParseError::InvalidFormat);
                    }
                    log::trace!("[BUILTIN] Skipping PID 0x{:04x} ({} bytes)", other, v.data.len());
                }
            }
        }
        Ok(())
    })?;

    Ok(p)
}

/// Status info is a 4-byte flag field whose flags live in the last octet.
fn status_info_value(v: &Value<'_>) -> Result<u32, ParseError> {
    let b = v.bytes(0, 4)?;
    Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

/// Returns `Ok(false)` when `pid` is not a QoS parameter.
fn decode_qos_param(pid: u16, v: &Value<'_>, qos: &mut Qos) -> Result<bool, ParseError> {
    match pid {
        PID_TOPIC_NAME => qos.topic_name = Some(v.string()?),
        PID_TYPE_NAME => qos.type_name = Some(v.string()?),
        PID_RELIABILITY => {
            let kind = match v.u32()? {
                1 => ReliabilityKind::BestEffort,
                // 3 is the pre-2.1 RELIABLE value still sent by old peers
                2 | 3 => ReliabilityKind::Reliable,
                _ => return Err(ParseError::InvalidFormat),
            };
            qos.reliability = Some(Reliability {
                kind,
                max_blocking_time: v.duration_at(4)?,
            });
        }
        PID_DURABILITY => {
            qos.durability = Some(match v.u32()? {
                0 => DurabilityKind::Volatile,
                1 => DurabilityKind::TransientLocal,
                2 => DurabilityKind::Transient,
                3 => DurabilityKind::Persistent,
                _ => return Err(ParseError::InvalidFormat),
            })
        }
        PID_DEADLINE => qos.deadline = Some(v.duration_at(0)?),
        PID_LATENCY_BUDGET => qos.latency_budget = Some(v.duration_at(0)?),
        PID_LIVELINESS => {
            let kind = match v.u32()? {
                0 => LivelinessKind::Automatic,
                1 => LivelinessKind::ManualByParticipant,
                2 => LivelinessKind::ManualByTopic,
                _ => return Err(ParseError::InvalidFormat),
            };
            qos.liveliness = Some(Liveliness {
                kind,
                lease_duration: v.duration_at(4)?,
            });
        }
        PID_OWNERSHIP => {
            qos.ownership = Some(match v.u32()? {
                0 => OwnershipKind::Shared,
                1 => OwnershipKind::Exclusive,
                _ => return Err(ParseError::InvalidFormat),
            })
        }
        PID_OWNERSHIP_STRENGTH => qos.ownership_strength = Some(v.i32_at(0)?),
        PID_DESTINATION_ORDER => {
            qos.destination_order = Some(match v.u32()? {
                0 => DestinationOrderKind::ByReceptionTimestamp,
                1 => DestinationOrderKind::BySourceTimestamp,
                _ => return Err(ParseError::InvalidFormat),
            })
        }
        PID_HISTORY => {
            let kind = match v.u32()? {
                0 => HistoryKind::KeepLast,
                1 => HistoryKind::KeepAll,
                _ => return Err(ParseError::InvalidFormat),
            };
            qos.history = Some(History {
                kind,
                depth: v.i32_at(4)?,
            });
        }
        PID_PRESENTATION => {
            let access_scope = match v.u32()? {
                0 => PresentationAccessScope::Instance,
                1 => PresentationAccessScope::Topic,
                2 => PresentationAccessScope::Group,
                _ => return Err(ParseError::InvalidFormat),
            };
            let flags = v.bytes(4, 2)?;
            qos.presentation = Some(Presentation {
                access_scope,
                coherent_access: flags[0] != 0,
                ordered_access: flags[1] != 0,
            });
        }
        PID_PARTITION => qos.partition = Some(v.string_seq()?),
        PID_USER_DATA => qos.user_data = Some(v.octets()?),
        PID_TOPIC_DATA => qos.topic_data = Some(v.octets()?),
        PID_GROUP_DATA => qos.group_data = Some(v.octets()?),
        _ => return Ok(false),
    }
    Ok(true)
}

/// Status info and key hash from a DATA submessage's inline QoS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InlineQos {
    pub status_info: Option<StatusInfo>,
    pub key_hash: Option<KeyHash>,
}

impl InlineQos {
    /// Parse an inline-QoS parameter list (no encapsulation header).
    pub fn parse(buf: &[u8], little_endian: bool) -> Result<Self, ParseError> {
        let mut out = InlineQos::default();
        for_each_param(buf, little_endian, |pid, v| {
            match pid {
                PID_STATUS_INFO => out.status_info = Some(StatusInfo(status_info_value(&v)?)),
                PID_KEY_HASH => out.key_hash = Some(v.key_hash()?),
                _ => {}
            }
            Ok(())
        })?;
        Ok(out)
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// PL_CDR_LE parameter list builder.
struct PlWriter {
    buf: Vec<u8>,
}

impl PlWriter {
    fn new() -> Self {
        let mut buf = Vec::with_capacity(256);
        buf.extend_from_slice(&PL_CDR_LE.to_be_bytes());
        buf.extend_from_slice(&[0, 0]);
        Self { buf }
    }

    /// Emit one parameter; `body` writes the value, padding is added here.
    ///
    /// # Errors
    /// `DiscoveryError::InvalidData` when the padded value does not fit the
    /// 16-bit length field. The partial parameter is discarded.
    fn param<F: FnOnce(&mut Vec<u8>)>(&mut self, pid: u16, body: F) -> DiscoveryResult<()> {
        let header = self.buf.len();
        self.buf.extend_from_slice(&pid.to_le_bytes());
        self.buf.extend_from_slice(&[0, 0]);
        body(&mut self.buf);
        while self.buf.len() % 4 != 0 {
            self.buf.push(0);
        }
        let Ok(len) = u16::try_from(self.buf.len() - header - 4) else {
            let size = self.buf.len() - header - 4;
            self.buf.truncate(header);
            return Err(DiscoveryError::InvalidData {
                reason: format!("parameter {:#06x} too large ({} bytes)", pid, size),
            });
        };
        self.buf[header + 2..header + 4].copy_from_slice(&len.to_le_bytes());
        Ok(())
    }

    fn finish(mut self) -> Vec<u8> {
        self.buf.extend_from_slice(&PID_SENTINEL.to_le_bytes());
        self.buf.extend_from_slice(&[0, 0]);
        self.buf
    }

    fn u32(&mut self, pid: u16, value: u32) -> DiscoveryResult<()> {
        self.param(pid, |b| b.extend_from_slice(&value.to_le_bytes()))
    }

    fn guid(&mut self, pid: u16, guid: &GUID) -> DiscoveryResult<()> {
        self.param(pid, |b| b.extend_from_slice(&guid.as_bytes()))
    }

    fn locator(&mut self, pid: u16, loc: &Locator) -> DiscoveryResult<()> {
        self.param(pid, |b| {
            b.extend_from_slice(&loc.kind.to_wire().to_le_bytes());
            b.extend_from_slice(&loc.port.to_le_bytes());
            b.extend_from_slice(&loc.address);
        })
    }

    fn string(&mut self, pid: u16, s: &str) -> DiscoveryResult<()> {
        self.param(pid, |b| put_string(b, s))
    }

    fn duration(&mut self, pid: u16, d: Duration) -> DiscoveryResult<()> {
        self.param(pid, |b| put_duration(b, d))
    }

    fn octets(&mut self, pid: u16, data: &[u8]) -> DiscoveryResult<()> {
        self.param(pid, |b| {
            b.extend_from_slice(&(data.len() as u32).to_le_bytes());
            b.extend_from_slice(data);
        })
    }
}

fn put_string(b: &mut Vec<u8>, s: &str) {
    b.extend_from_slice(&((s.len() + 1) as u32).to_le_bytes());
    b.extend_from_slice(s.as_bytes());
    b.push(0);
}

fn put_duration(b: &mut Vec<u8>, d: Duration) {
    if d == DURATION_INFINITE {
        b.extend_from_slice(&DURATION_INFINITE_SEC.to_le_bytes());
        b.extend_from_slice(&DURATION_INFINITE_FRAC.to_le_bytes());
        return;
    }
    let sec = i32::try_from(d.as_secs()).unwrap_or(DURATION_INFINITE_SEC - 1);
    let frac = (((u64::from(d.subsec_nanos()) << 32) + 500_000_000) / 1_000_000_000)
        .min(u64::from(u32::MAX)) as u32;
    b.extend_from_slice(&sec.to_le_bytes());
    b.extend_from_slice(&frac.to_le_bytes());
}

/// Encode a discovery payload as PL_CDR_LE (CDR header included).
///
/// Vendor-specific parameters are emitted only when `vendor` (our own)
/// is PrismTech-compatible.
///
/// # Errors
/// `DiscoveryError::InvalidData` when a parameter value exceeds the
/// 65535-byte limit of the PL_CDR length field.
pub fn encode(p: &DiscoveryPayload, vendor: VendorId) -> DiscoveryResult<Vec<u8>> {
    let mut w = PlWriter::new();
    let vendor_pids = vendor.is_prismtech_compatible();

    if let Some(pv) = p.protocol_version {
        w.param(PID_PROTOCOL_VERSION, |b| b.extend_from_slice(&[pv.major, pv.minor]))?;
    }
    if let Some(v) = p.vendor_id {
        w.param(PID_VENDOR_ID, |b| b.extend_from_slice(&v.0))?;
    }
    if let Some(g) = &p.participant_guid {
        w.guid(PID_PARTICIPANT_GUID, g)?;
    }
    if let Some(g) = &p.endpoint_guid {
        w.guid(PID_ENDPOINT_GUID, g)?;
    }
    if let Some(g) = &p.group_guid {
        w.guid(PID_GROUP_GUID, g)?;
    }
    if let Some(bes) = p.builtin_endpoint_set {
        w.u32(PID_BUILTIN_ENDPOINT_SET, bes)?;
    }
    if let Some(lease) = p.participant_lease_duration {
        w.duration(PID_PARTICIPANT_LEASE_DURATION, lease)?;
    }
    for (pid, list) in [
        (PID_DEFAULT_UNICAST_LOCATOR, &p.default_unicast_locators),
        (PID_DEFAULT_MULTICAST_LOCATOR, &p.default_multicast_locators),
        (PID_METATRAFFIC_UNICAST_LOCATOR, &p.metatraffic_unicast_locators),
        (PID_METATRAFFIC_MULTICAST_LOCATOR, &p.metatraffic_multicast_locators),
        (PID_UNICAST_LOCATOR, &p.unicast_locators),
        (PID_MULTICAST_LOCATOR, &p.multicast_locators),
    ] {
        for loc in list {
            w.locator(pid, loc)?;
        }
    }
    if let Some(name) = &p.entity_name {
        w.string(PID_ENTITY_NAME, name)?;
    }
    encode_qos(&mut w, &p.qos, vendor_pids)?;
    if let Some(expects) = p.expects_inline_qos {
        w.param(PID_EXPECTS_INLINE_QOS, |b| b.push(u8::from(expects)))?;
    }
    if let Some(kh) = &p.key_hash {
        w.param(PID_KEY_HASH, |b| b.extend_from_slice(kh))?;
    }
    if let Some(st) = p.status_info {
        w.param(PID_STATUS_INFO, |b| b.extend_from_slice(&st.0.to_be_bytes()))?;
    }

    if vendor_pids {
        if let Some(ptbes) = p.prismtech_builtin_endpoint_set {
            w.u32(PID_PRISMTECH_BUILTIN_ENDPOINT_SET, ptbes)?;
        }
        if let Some(info) = &p.participant_version_info {
            w.param(PID_PRISMTECH_PARTICIPANT_VERSION_INFO, |b| {
                b.extend_from_slice(&info.version.to_le_bytes());
                b.extend_from_slice(&info.flags.to_le_bytes());
                for word in info.unused {
                    b.extend_from_slice(&word.to_le_bytes());
                }
                put_string(b, &info.internals);
            })?;
        }
        if let Some(st) = p.service_type {
            w.u32(PID_PRISMTECH_SERVICE_TYPE, st)?;
        }
        if let Some(desc) = &p.type_description {
            w.string(PID_PRISMTECH_TYPE_DESCRIPTION, desc)?;
        }
        if let Some(ssm) = p.reader_favours_ssm {
            w.u32(PID_PRISMTECH_READER_FAVOURS_SSM, u32::from(ssm))?;
        }
    }

    Ok(w.finish())
}

fn encode_qos(w: &mut PlWriter, q: &Qos, vendor_pids: bool) -> DiscoveryResult<()> {
    if let Some(s) = &q.topic_name {
        w.string(PID_TOPIC_NAME, s)?;
    }
    if let Some(s) = &q.type_name {
        w.string(PID_TYPE_NAME, s)?;
    }
    if let Some(r) = q.reliability {
        let kind: u32 = match r.kind {
            ReliabilityKind::BestEffort => 1,
            ReliabilityKind::Reliable => 2,
        };
        w.param(PID_RELIABILITY, |b| {
            b.extend_from_slice(&kind.to_le_bytes());
            put_duration(b, r.max_blocking_time);
        })?;
    }
    if let Some(d) = q.durability {
        let kind: u32 = match d {
            DurabilityKind::Volatile => 0,
            DurabilityKind::TransientLocal => 1,
            DurabilityKind::Transient => 2,
            DurabilityKind::Persistent => 3,
        };
        w.u32(PID_DURABILITY, kind)?;
    }
    if let Some(d) = q.deadline {
        w.duration(PID_DEADLINE, d)?;
    }
    if let Some(d) = q.latency_budget {
        w.duration(PID_LATENCY_BUDGET, d)?;
    }
    if let Some(l) = q.liveliness {
        let kind: u32 = match l.kind {
            LivelinessKind::Automatic => 0,
            LivelinessKind::ManualByParticipant => 1,
            LivelinessKind::ManualByTopic => 2,
        };
        w.param(PID_LIVELINESS, |b| {
            b.extend_from_slice(&kind.to_le_bytes());
            put_duration(b, l.lease_duration);
        })?;
    }
    if let Some(o) = q.ownership {
        w.u32(PID_OWNERSHIP, u32::from(o == OwnershipKind::Exclusive))?;
    }
    if let Some(s) = q.ownership_strength {
        w.u32(PID_OWNERSHIP_STRENGTH, s as u32)?;
    }
    if let Some(d) = q.destination_order {
        w.u32(
            PID_DESTINATION_ORDER,
            u32::from(d == DestinationOrderKind::BySourceTimestamp),
        )?;
    }
    if let Some(h) = q.history {
        w.param(PID_HISTORY, |b| {
            b.extend_from_slice(&u32::from(h.kind == HistoryKind::KeepAll).to_le_bytes());
            b.extend_from_slice(&h.depth.to_le_bytes());
        })?;
    }
    if let Some(p) = q.presentation {
        let scope: u32 = match p.access_scope {
            PresentationAccessScope::Instance => 0,
            PresentationAccessScope::Topic => 1,
            PresentationAccessScope::Group => 2,
        };
        w.param(PID_PRESENTATION, |b| {
            b.extend_from_slice(&scope.to_le_bytes());
            b.push(u8::from(p.coherent_access));
            b.push(u8::from(p.ordered_access));
        })?;
    }
    if let Some(parts) = &q.partition {
        w.param(PID_PARTITION, |b| {
            b.extend_from_slice(&(parts.len() as u32).to_le_bytes());
            for part in parts {
                put_string(b, part);
                while b.len() % 4 != 0 {
                    b.push(0);
                }
            }
        })?;
    }
    if let Some(d) = &q.user_data {
        w.octets(PID_USER_DATA, d)?;
    }
    if let Some(d) = &q.topic_data {
        w.octets(PID_TOPIC_DATA, d)?;
    }
    if let Some(d) = &q.group_data {
        w.octets(PID_GROUP_DATA, d)?;
    }
    if vendor_pids {
        if let Some(ad) = q.autodispose_unregistered {
            w.param(PID_PRISMTECH_WRITER_AUTODISPOSE, |b| b.push(u8::from(ad)))?;
        }
    }
    Ok(())
}

/// Minimal payload carrying only a key GUID, as synthesized for keyhash-only
/// dispose/unregister samples.
pub fn encode_key_only(field: KeyField, key: &KeyHash) -> Vec<u8> {
    let pid = match field {
        KeyField::Participant => PID_PARTICIPANT_GUID,
        KeyField::Group => PID_GROUP_GUID,
        KeyField::Endpoint => PID_ENDPOINT_GUID,
    };
    let mut w = PlWriter::new();
    w.buf.extend_from_slice(&pid.to_le_bytes());
    w.buf.extend_from_slice(&16u16.to_le_bytes());
    w.buf.extend_from_slice(key);
    w.finish()
}

/// Key hash for a GUID-keyed built-in instance.
pub fn guid_key_hash(guid: &GUID) -> KeyHash {
    guid.as_bytes()
}

/// Rebuild a GUID from a built-in key hash.
pub fn guid_from_key_hash(kh: &KeyHash) -> GUID {
    let mut prefix = [0u8; 12];
    prefix.copy_from_slice(&kh[..12]);
    GUID::new(
        GuidPrefix(prefix),
        EntityId([kh[12], kh[13], kh[14], kh[15]]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::discovery::types::Presence;
    use std::net::Ipv4Addr;

    fn guid(last: u8) -> GUID {
        GUID::new(GuidPrefix([0xab; 12]), EntityId([0, 0, last, 0xc1]))
    }

    #[test]
    fn test_spdp_like_payload_survives_encoding() {
        let mut p = DiscoveryPayload {
            participant_guid: Some(guid(1)),
            builtin_endpoint_set: Some(BES_DEFAULT),
            protocol_version: Some(ProtocolVersion::V2_1),
            vendor_id: Some(VendorId::HDDS),
            participant_lease_duration: Some(Duration::from_secs(30)),
            ..Default::default()
        };
        p.default_unicast_locators
            .push(Locator::udpv4(Ipv4Addr::new(10, 0, 0, 5), 7411));
        p.metatraffic_multicast_locators
            .push(Locator::udpv4(Ipv4Addr::new(239, 255, 0, 1), 7400));
        p.qos.user_data = Some(b"hello".to_vec());

        let bytes = encode(&p, VendorId::HDDS).expect("encode");
        assert_eq!(&bytes[..4], &[0x00, 0x03, 0x00, 0x00]);
        assert_eq!(bytes.len() % 4, 0);
        let decoded = decode(&bytes, VendorId::HDDS).expect("decode");
        assert_eq!(decoded, p);
    }

    #[test]
    fn test_oversized_parameter_rejected() {
        let mut p = DiscoveryPayload {
            participant_guid: Some(guid(1)),
            ..Default::default()
        };
        p.qos.user_data = Some(vec![0x5a; 70_000]);
        assert!(matches!(
            encode(&p, VendorId::HDDS),
            Err(DiscoveryError::InvalidData { .. })
        ));

        // largest value that still fits: 4-byte length prefix + data
        p.qos.user_data = Some(vec![0x5a; usize::from(u16::MAX) - 3 - 4]);
        let bytes = encode(&p, VendorId::HDDS).expect("fits");
        let decoded = decode(&bytes, VendorId::HDDS).expect("decode");
        assert_eq!(decoded.qos.user_data, p.qos.user_data);
    }

    #[test]
    fn test_big_endian_list() {
        // PL_CDR_BE: GUID + builtin endpoint set + sentinel
        let mut buf = vec![0x00, 0x02, 0x00, 0x00];
        buf.extend_from_slice(&PID_PARTICIPANT_GUID.to_be_bytes());
        buf.extend_from_slice(&16u16.to_be_bytes());
        buf.extend_from_slice(&guid(7).as_bytes());
        buf.extend_from_slice(&PID_BUILTIN_ENDPOINT_SET.to_be_bytes());
        buf.extend_from_slice(&4u16.to_be_bytes());
        buf.extend_from_slice(&0x3fu32.to_be_bytes());
        buf.extend_from_slice(&PID_SENTINEL.to_be_bytes());
        buf.extend_from_slice(&[0, 0]);

        let p = decode(&buf, VendorId::RTI).expect("decode");
        assert_eq!(p.participant_guid, Some(guid(7)));
        assert_eq!(p.builtin_endpoint_set, Some(0x3f));
    }

    #[test]
    fn test_truncated_and_bad_encapsulation() {
        assert_eq!(decode(&[0, 3], VendorId::HDDS), Err(ParseError::TruncatedData));
        assert_eq!(
            decode(&[0x12, 0x34, 0, 0, 1, 0, 0, 0], VendorId::HDDS),
            Err(ParseError::InvalidEncapsulation)
        );
        // no sentinel
        let mut buf = vec![0x00, 0x03, 0x00, 0x00];
        buf.extend_from_slice(&PID_BUILTIN_ENDPOINT_SET.to_le_bytes());
        buf.extend_from_slice(&4u16.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes());
        assert_eq!(decode(&buf, VendorId::HDDS), Err(ParseError::TruncatedData));
    }

    #[test]
    fn test_vendor_pids_ignored_for_other_vendors() {
        let p = DiscoveryPayload {
            participant_guid: Some(guid(2)),
            prismtech_builtin_endpoint_set: Some(PTBES_CM_PARTICIPANT_WRITER),
            ..Default::default()
        };
        let bytes = encode(&p, VendorId::HDDS).expect("encode");
        let from_pt = decode(&bytes, VendorId::PRISMTECH_OSPL).expect("decode");
        assert_eq!(from_pt.prismtech_builtin_endpoint_set, Some(PTBES_CM_PARTICIPANT_WRITER));
        let from_rti = decode(&bytes, VendorId::RTI).expect("decode");
        assert_eq!(from_rti.prismtech_builtin_endpoint_set, None);
        assert_eq!(from_rti.participant_guid, Some(guid(2)));
    }

    #[test]
    fn test_unknown_must_understand_rejected() {
        let mut buf = vec![0x00, 0x03, 0x00, 0x00];
        buf.extend_from_slice(&(0x4000u16 | 0x0123).to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&PID_SENTINEL.to_le_bytes());
        buf.extend_from_slice(&[0, 0]);
        assert_eq!(decode(&buf, VendorId::HDDS), Err(ParseError::InvalidFormat));
    }

    #[test]
    fn test_qos_parameters() {
        let mut p = DiscoveryPayload {
            endpoint_guid: Some(guid(3)),
            ..Default::default()
        };
        p.qos = Qos::writer_default();
        p.qos.topic_name = Some("Square".into());
        p.qos.type_name = Some("ShapeType".into());
        p.qos.partition = Some(vec!["a".into(), "bcdef".into()]);
        p.qos.durability = Some(DurabilityKind::TransientLocal);
        p.qos.deadline = Some(Duration::from_millis(1500));

        let decoded = decode(&encode(&p, VendorId::HDDS).expect("encode"), VendorId::HDDS).expect("decode");
        assert_eq!(decoded.qos.topic_name.as_deref(), Some("Square"));
        assert_eq!(decoded.qos.partition, p.qos.partition);
        assert_eq!(decoded.qos.durability, Some(DurabilityKind::TransientLocal));
        assert!(decoded.qos.is_reliable());
        assert_eq!(decoded.qos.deadline, Some(Duration::from_millis(1500)));
        assert_eq!(decoded.qos.liveliness, p.qos.liveliness);
        assert_eq!(decoded.qos.autodispose_unregistered, Some(true));
    }

    #[test]
    fn test_duration_fraction_rounding() {
        let mut b = Vec::new();
        put_duration(&mut b, Duration::from_millis(100));
        let v = Value { data: &b, le: true };
        assert_eq!(v.duration_at(0).expect("duration"), Duration::from_millis(100));

        b.clear();
        put_duration(&mut b, DURATION_INFINITE);
        let v = Value { data: &b, le: true };
        assert_eq!(v.duration_at(0).expect("duration"), DURATION_INFINITE);
    }

    #[test]
    fn test_byte_swapped_port_tolerated() {
        assert_eq!(decode_locator_port(7400), 7400);
        assert_eq!(decode_locator_port(7400u32.swap_bytes()), 7400);
    }

    #[test]
    fn test_inline_qos_parse() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&PID_KEY_HASH.to_le_bytes());
        buf.extend_from_slice(&16u16.to_le_bytes());
        buf.extend_from_slice(&guid(4).as_bytes());
        buf.extend_from_slice(&PID_STATUS_INFO.to_le_bytes());
        buf.extend_from_slice(&4u16.to_le_bytes());
        buf.extend_from_slice(&[0, 0, 0, 3]);
        buf.extend_from_slice(&PID_SENTINEL.to_le_bytes());
        buf.extend_from_slice(&[0, 0]);

        let iq = InlineQos::parse(&buf, true).expect("inline qos");
        assert_eq!(iq.status_info, Some(StatusInfo::DISPOSE_UNREGISTER));
        assert_eq!(iq.key_hash, Some(guid(4).as_bytes()));
    }

    #[test]
    fn test_key_only_payload() {
        let key = guid_key_hash(&guid(9));
        let bytes = encode_key_only(KeyField::Group, &key);
        let p = decode(&bytes, VendorId::RTI).expect("decode");
        assert_eq!(p.group_guid, Some(guid(9)));
        assert_eq!(p.present().0, Presence::GROUP_GUID);
        assert_eq!(guid_from_key_hash(&key), guid(9));
    }
}
