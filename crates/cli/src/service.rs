//! Simulated position service
//!
//! Answers attribute requests and produces update notifications the way a
//! positioning service does, including a GNSS fix status entry that this
//! consumer does not decode.

use bytes::Bytes;
use contracts::{AttributeKey, AttributeMask, Snapshot};
use wire_codec::{decode_request, encode_update, DecodeError, WireValue};

/// GNSS fix status wire code (sent as uint16)
const GNSS_FIX_STATUS: u16 = 0x0070;
/// 3D fix
const FIX_STATUS_3D: u16 = 3;

const BASE_LATITUDE: f64 = 47.31608607;
const BASE_LONGITUDE: f64 = 6.23329262;
const BASE_ALTITUDE: f64 = 337.0;

pub struct SimulatedService {
    position: Snapshot,
    tick: u64,
}

impl Default for SimulatedService {
    fn default() -> Self {
        Self {
            position: Snapshot::new()
                .with(AttributeKey::Latitude, BASE_LATITUDE)
                .with(AttributeKey::Longitude, BASE_LONGITUDE)
                .with(AttributeKey::Altitude, BASE_ALTITUDE)
                .with(AttributeKey::Speed, 0.0),
            tick: 0,
        }
    }
}

impl SimulatedService {
    /// Reply to an encoded attribute request
    pub fn handle_request(&self, request: &[u8]) -> Result<Bytes, DecodeError> {
        let keys = decode_request(request)?;

        let mut entries: Vec<WireValue> = self
            .position
            .restricted_to(keys)
            .iter()
            .map(|(key, value)| {
                WireValue::entry(
                    WireValue::UInt16(key.wire_code()),
                    WireValue::variant(WireValue::Double(value)),
                )
            })
            .collect();
        entries.push(WireValue::entry(
            WireValue::UInt16(GNSS_FIX_STATUS),
            WireValue::variant(WireValue::UInt16(FIX_STATUS_3D)),
        ));

        Ok(WireValue::dict(entries).to_bytes())
    }

    /// Advance the simulated vehicle and encode the change notification
    ///
    /// Latitude, longitude and speed change every tick; altitude every tenth.
    pub fn next_update(&mut self) -> Bytes {
        self.tick += 1;
        let t = self.tick as f64;

        let mut changed = AttributeMask::from(AttributeKey::Latitude)
            | AttributeKey::Longitude
            | AttributeKey::Speed;
        self.position
            .insert(AttributeKey::Latitude, BASE_LATITUDE + 0.001 * (t / 20.0).sin());
        self.position
            .insert(AttributeKey::Longitude, BASE_LONGITUDE + 0.001 * (t / 20.0).cos());
        self.position
            .insert(AttributeKey::Speed, 12.0 + 3.0 * (t / 10.0).sin());

        if self.tick % 10 == 0 {
            changed |= AttributeKey::Altitude;
            self.position
                .insert(AttributeKey::Altitude, BASE_ALTITUDE + ((self.tick / 10) % 5) as f64);
        }

        encode_update(changed, &self.position.restricted_to(changed))
    }
}
