//! Google encoded-polyline codec (1e-5 precision), the format the ride
//! backend stores route geometry in.

use crate::ride::LatLng;

const PRECISION: f64 = 1e5;

/// Errors encountered while decoding an encoded polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolylineError {
    /// A varint chunk ran past the end of the input.
    Truncated,
    /// Byte outside the printable encoding range.
    InvalidByte(u8),
}

/// Decodes an encoded polyline into ordered coordinates.
pub fn decode(encoded: &str) -> Result<Vec<LatLng>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut coordinates = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        let (delta_lat, next) = decode_value(bytes, index)?;
        let (delta_lng, after) = decode_value(bytes, next)?;
        lat += delta_lat;
        lng += delta_lng;
        index = after;
        coordinates.push(LatLng {
            latitude: lat as f64 / PRECISION,
            longitude: lng as f64 / PRECISION,
        });
    }

    Ok(coordinates)
}

fn decode_value(bytes: &[u8], mut index: usize) -> Result<(i64, usize), PolylineError> {
    let mut result: u64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes.get(index).ok_or(PolylineError::Truncated)?;
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidByte(byte));
        }
        let chunk = (byte - 63) as u64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        index += 1;
        if chunk & 0x20 == 0 {
            break;
        }
    }

    let magnitude = (result >> 1) as i64;
    let value = if result & 1 == 1 { !magnitude } else { magnitude };
    Ok((value, index))
}

/// Encodes coordinates into an encoded polyline. Fixture-building
/// counterpart of [decode].
#[cfg(any(test, feature = "test-helpers"))]
pub fn encode(coordinates: &[LatLng]) -> String {
    let mut encoded = String::new();
    let mut previous_lat: i64 = 0;
    let mut previous_lng: i64 = 0;

    for coordinate in coordinates {
        let lat = (coordinate.latitude * PRECISION).round() as i64;
        let lng = (coordinate.longitude * PRECISION).round() as i64;
        encode_value(lat - previous_lat, &mut encoded);
        encode_value(lng - previous_lng, &mut encoded);
        previous_lat = lat;
        previous_lng = lng;
    }

    encoded
}

#[cfg(any(test, feature = "test-helpers"))]
fn encode_value(value: i64, encoded: &mut String) {
    // Zigzag so the sign bit lands in bit 0, matching decode's inversion.
    let mut remaining = ((value << 1) ^ (value >> 63)) as u64;
    loop {
        let mut chunk = (remaining & 0x1f) as u8;
        remaining >>= 5;
        if remaining > 0 {
            chunk |= 0x20;
        }
        encoded.push((chunk + 63) as char);
        if remaining == 0 {
            break;
        }
    }
}
