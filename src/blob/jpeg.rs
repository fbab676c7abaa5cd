//! Embedded JPEG extraction by marker scan
//!
//! Preview blobs are not described by the record schema; the only reliable
//! way to pull the image out is to look for the JPEG Start-Of-Image marker
//! going forward and the End-Of-Image marker going backward. Everything
//! around the markers (tensor headers, padding) is ignored.

/// JPEG Start Of Image (SOI)
const SOI: [u8; 2] = [0xFF, 0xD8];
/// JPEG End Of Image (EOI)
const EOI: [u8; 2] = [0xFF, 0xD9];

/// Extract the embedded JPEG from a blob, if there is one.
///
/// Scans forward for the first SOI marker, then backward from the end of the
/// buffer for the last EOI marker, and returns the inclusive range between
/// them. Returns None when either marker is missing or the EOI does not come
/// after the SOI. This never fails hard: a blob without an image is a normal
/// outcome, not an error.
pub fn extract_jpeg(data: &[u8]) -> Option<Vec<u8>> {
    let start = data.windows(2).position(|w| w == SOI)?;
    let end = data.windows(2).rposition(|w| w == EOI)?;
    // end indexes the 0xFF of the EOI pair; the slice is inclusive of both markers
    if end <= start {
        return None;
    }
    Some(data[start..end + 2].to_vec())
}
