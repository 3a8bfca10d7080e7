//! JPEG DCT-coefficient carrier (component C6).
//!
//! Never touches decoded pixels: reads and writes the quantized
//! coefficient blocks directly via `raw`'s libjpeg-turbo bindings, in the
//! canonical traversal order defined below, which both embed and extract
//! must agree on bit-for-bit.

mod raw;

use mozjpeg_sys::JBLOCK;

use crate::error::Error;
use crate::header::{Header, HEADER_SIZE, LsbMode};
use raw::{JpegCompress, JpegDecompress};

const BLOCK_SIZE: usize = 64;

/// One component's usable AC coefficients, flattened in canonical order:
/// block rows top-to-bottom, blocks left-to-right within a row, then
/// `k = 1..63` in natural (row-major) order within each block. The DC
/// coefficient (`k = 0`) is never touched.
struct ComponentCoefficients {
    /// Pointers into libjpeg's own block storage, one per usable AC slot,
    /// in canonical order. Valid only while the owning `JpegDecompress` is
    /// alive.
    slots: Vec<*mut i16>,
}

/// Walk every component's virtual coefficient array, in canonical
/// component order, and collect raw pointers to every AC coefficient.
///
/// # Safety
/// `coef_arrays` must have been produced by `decompress.read_coefficients()`
/// and `decompress` must outlive the returned pointers.
unsafe fn collect_canonical_slots(
    decompress: &mut JpegDecompress,
    coef_arrays: *mut mozjpeg_sys::jvirt_barray_ptr,
) -> Vec<ComponentCoefficients> {
    let mut components = Vec::with_capacity(decompress.num_components());

    for ci in 0..decompress.num_components() {
        let (blocks_wide, blocks_high) = decompress.component_block_dims(ci);
        let mut slots = Vec::new();

        for row in 0..blocks_high {
            unsafe {
                let row_ptr = decompress.access_virt_barray(coef_arrays, ci, row, 1, true);
                for col in 0..blocks_wide {
                    let block: *mut JBLOCK = *row_ptr.add(col as usize);
                    let coeffs = block as *mut i16;
                    for k in 1..BLOCK_SIZE {
                        slots.push(coeffs.add(k));
                    }
                }
            }
        }
        components.push(ComponentCoefficients { slots });
    }
    components
}

/// Usable AC-coefficient bit capacity across all components.
pub fn capacity_bits(jpeg_data: &[u8]) -> Result<usize, Error> {
    let mut decompress = JpegDecompress::new(jpeg_data)?;
    let coef_arrays = decompress.read_coefficients()?;
    let components = unsafe { collect_canonical_slots(&mut decompress, coef_arrays) };
    Ok(components.iter().map(|c| c.slots.len()).sum())
}

fn write_bit(slot: *mut i16, bit: u8) {
    unsafe {
        let value = *slot;
        let mut new_value = (value & !1) | (bit as i16 & 1);
        if !(-1024..=1023).contains(&new_value) {
            new_value = (value & !0b11) | (bit as i16 & 1);
        }
        *slot = new_value;
    }
}

fn read_bit(slot: *mut i16) -> u8 {
    unsafe { (*slot & 1) as u8 }
}

fn pack_into_slots(slots: &[*mut i16], payload: &[u8]) -> Result<(), Error> {
    let total_bits = payload.len() * 8;
    if total_bits > slots.len() {
        return Err(Error::CapacityError);
    }
    for (i, slot) in slots.iter().enumerate().take(total_bits) {
        let byte = payload[i / 8];
        let bit = (byte >> (7 - (i % 8))) & 1;
        write_bit(*slot, bit);
    }
    Ok(())
}

fn unpack_from_slots(slots: &[*mut i16], nbytes: usize) -> Result<Vec<u8>, Error> {
    let total_bits = nbytes * 8;
    if total_bits > slots.len() {
        return Err(Error::CapacityError);
    }
    let mut out = vec![0u8; nbytes];
    for (i, slot) in slots.iter().enumerate().take(total_bits) {
        let bit = read_bit(*slot);
        let byte_idx = i / 8;
        let pos = 7 - (i % 8) as u8;
        out[byte_idx] |= bit << pos;
    }
    Ok(out)
}

fn all_slots(components: &[ComponentCoefficients]) -> Vec<*mut i16> {
    components.iter().flat_map(|c| c.slots.iter().copied()).collect()
}

/// Embed `header` (`lsb_mode` forced to `OneBit`, per §4.5 step 2) and
/// `ciphertext` into `jpeg_data`'s AC coefficients, returning a
/// syntactically baseline-sequential re-encode.
pub fn embed(jpeg_data: &[u8], mut header: Header, ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
    let mut decompress = JpegDecompress::new(jpeg_data)?;
    let coef_arrays = decompress.read_coefficients()?;
    let components = unsafe { collect_canonical_slots(&mut decompress, coef_arrays) };
    let slots = all_slots(&components);

    let header_bits = HEADER_SIZE * 8;
    if header_bits > slots.len() {
        return Err(Error::CapacityError);
    }
    header.lsb_mode = LsbMode::OneBit;
    header.write_size = (HEADER_SIZE + ciphertext.len()) as u64;

    let header_bytes = header.serialize();
    pack_into_slots(&slots[..header_bits], &header_bytes)?;
    let body_bits_needed = ciphertext.len() * 8;
    if header_bits + body_bits_needed > slots.len() {
        return Err(Error::CapacityError);
    }
    pack_into_slots(&slots[header_bits..header_bits + body_bits_needed], ciphertext)?;

    let mut compress = JpegCompress::new();
    compress.copy_critical_parameters_from(&mut decompress);
    let out = compress.write_coefficients(coef_arrays)?;
    decompress.finish()?;
    Ok(out)
}

/// Parse the header only.
pub fn probe(jpeg_data: &[u8]) -> Result<Header, Error> {
    let mut decompress = JpegDecompress::new(jpeg_data)?;
    let coef_arrays = decompress.read_coefficients()?;
    let components = unsafe { collect_canonical_slots(&mut decompress, coef_arrays) };
    let slots = all_slots(&components);

    let header_bytes = unpack_from_slots(&slots, HEADER_SIZE)?;
    Header::parse(&header_bytes)
}

/// Extract the header and the raw (still-encrypted) ciphertext body.
pub fn extract(jpeg_data: &[u8]) -> Result<(Header, Vec<u8>), Error> {
    let mut decompress = JpegDecompress::new(jpeg_data)?;
    let coef_arrays = decompress.read_coefficients()?;
    let components = unsafe { collect_canonical_slots(&mut decompress, coef_arrays) };
    let slots = all_slots(&components);

    let header_bytes = unpack_from_slots(&slots, HEADER_SIZE)?;
    let header = Header::parse(&header_bytes)?;

    let body_len = (header.write_size as usize)
        .checked_sub(HEADER_SIZE)
        .ok_or_else(|| Error::InvalidHeader("write_size smaller than header size".to_string()))?;
    let header_bits = HEADER_SIZE * 8;
    let body_bits = body_len * 8;
    if header_bits + body_bits > slots.len() {
        return Err(Error::InvalidHeader(
            "declared write_size exceeds available AC coefficients".to_string(),
        ));
    }
    let ciphertext = unpack_from_slots(&slots[header_bits..header_bits + body_bits], body_len)?;
    Ok((header, ciphertext))
}

#[cfg(test)]
mod tests {
    // End-to-end embed/extract against a real JPEG fixture lives in
    // tests/facade_scenarios.rs (S4/S5); these exercise the canonical-order
    // bit math directly against synthetic storage, without FFI.
    use super::*;

    #[test]
    fn write_bit_clamps_at_upper_clamp_boundary() {
        let mut value: i16 = 1023;
        write_bit(&mut value as *mut i16, 0);
        assert!((-1024..=1023).contains(&value));
        assert_eq!(value & 1, 0);
    }

    #[test]
    fn write_bit_clamps_at_lower_clamp_boundary() {
        let mut value: i16 = -1024;
        write_bit(&mut value as *mut i16, 1);
        assert!((-1024..=1023).contains(&value));
        assert_eq!(value & 1, 1);
    }

    #[test]
    fn write_then_read_bit_round_trips() {
        let mut value: i16 = 42;
        write_bit(&mut value as *mut i16, 1);
        assert_eq!(read_bit(&mut value as *mut i16), 1);
        write_bit(&mut value as *mut i16, 0);
        assert_eq!(read_bit(&mut value as *mut i16), 0);
    }

    #[test]
    fn pack_unpack_slots_round_trip() {
        let mut storage = vec![0i16; 64];
        let slots: Vec<*mut i16> = storage.iter_mut().map(|v| v as *mut i16).collect();
        let payload = [0b1011_0010u8, 0b0000_1111u8];
        pack_into_slots(&slots[..16], &payload).unwrap();
        let back = unpack_from_slots(&slots[..16], 2).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn pack_rejects_insufficient_capacity() {
        let mut storage = vec![0i16; 4];
        let slots: Vec<*mut i16> = storage.iter_mut().map(|v| v as *mut i16).collect();
        let payload = [0xFFu8; 2];
        assert!(matches!(pack_into_slots(&slots, &payload), Err(Error::CapacityError)));
    }
}
