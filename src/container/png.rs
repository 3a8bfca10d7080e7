//! PNG pixel carrier (component C5).
//!
//! Treats the decoded pixel buffer as one linear host byte sequence and
//! delegates all bit-level work to [`crate::bitpack`]. Grounded on
//! `examples/mathyslv-pnger`'s PNG decode/encode plumbing
//! (`decode_png_info`/`read_image_data`/`encode_png_with_data` in its
//! `lib.rs`) and its `utils::setup_png_encoder`/`copy_png_metadata` for
//! lossless metadata-preserving re-encode.
//!
//! Images with a 4th (alpha) channel are not special-cased: alpha bytes are
//! usable hosts like any other, provided the source alpha was fully opaque
//! (the caller's responsibility to check if that matters to them — this
//! carrier does not reject partially-transparent images, it simply treats
//! every byte of the decoded buffer uniformly).

use std::io::{BufWriter, Cursor};

use png::{Decoder, Info, Reader};

use crate::bitpack::{pack_1bpb, pack_2bpb, unpack_1bpb, unpack_2bpb};
use crate::error::Error;
use crate::header::{Header, HEADER_SIZE, LsbMode};
use crate::utils::setup_png_encoder;

fn decode(png_data: &[u8]) -> Result<(Reader<Cursor<&[u8]>>, Info<'static>), Error> {
    let decoder = Decoder::new(Cursor::new(png_data));
    let reader = decoder
        .read_info()
        .map_err(|e| Error::DecodeImage(e.to_string()))?;
    let info = reader.info().clone();
    Ok((reader, info))
}

fn read_image_data(reader: &mut Reader<Cursor<&[u8]>>) -> Result<Vec<u8>, Error> {
    let mut image_data = vec![0u8; reader.output_buffer_size()];
    reader
        .next_frame(&mut image_data)
        .map_err(|e| Error::DecodeImage(e.to_string()))?;
    Ok(image_data)
}

fn encode(info: &Info, image_data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut writer_buffer = BufWriter::new(Vec::new());
    let encoder =
        setup_png_encoder(info, &mut writer_buffer).map_err(|e| Error::EncodeImage(e.to_string()))?;

    let mut writer = encoder
        .write_header()
        .map_err(|e| Error::EncodeImage(e.to_string()))?;
    writer
        .write_image_data(image_data)
        .map_err(|e| Error::EncodeImage(e.to_string()))?;
    writer
        .finish()
        .map_err(|e| Error::EncodeImage(e.to_string()))?;

    writer_buffer
        .into_inner()
        .map_err(|e| Error::EncodeImage(format!("failed to extract output buffer: {e}")))
}

/// Usable host byte count `N` of a decoded PNG: width × height × channels.
pub fn capacity_bytes(png_data: &[u8]) -> Result<usize, Error> {
    let (mut reader, _info) = decode(png_data)?;
    Ok(read_image_data(&mut reader)?.len())
}

/// Select the packing mode and pack `header` (with `lsb_mode` filled in)
/// followed by `ciphertext` into `image_data`, per spec §4.4 steps 1-3.
fn select_mode_and_pack(
    image_data: &mut [u8],
    mut header: Header,
    ciphertext: &[u8],
) -> Result<Header, Error> {
    let n = image_data.len();
    let header_bits = HEADER_SIZE * 8;
    if header_bits > n {
        return Err(Error::CapacityError);
    }
    let remaining = n - header_bits;
    let body_bits_needed = ciphertext.len() * 8;

    header.lsb_mode = if body_bits_needed <= remaining {
        LsbMode::OneBit
    } else if body_bits_needed <= 2 * remaining {
        LsbMode::TwoBits
    } else {
        return Err(Error::CapacityError);
    };
    header.write_size = (HEADER_SIZE + ciphertext.len()) as u64;

    let header_bytes = header.serialize();
    pack_1bpb(image_data, &header_bytes, 0)?;
    match header.lsb_mode {
        LsbMode::OneBit => pack_1bpb(image_data, ciphertext, header_bits)?,
        LsbMode::TwoBits => pack_2bpb(image_data, ciphertext, header_bits)?,
        LsbMode::NoUsed => {
            return Err(Error::InternalBug(
                "mode selection never chooses NoUsed".to_string(),
            ));
        }
    }
    Ok(header)
}

/// Embed `header` (its `lsb_mode`/`write_size` are overwritten here) and
/// `ciphertext` into `png_data`, returning the re-encoded PNG bytes.
pub fn embed(png_data: &[u8], header: Header, ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
    let (mut reader, info) = decode(png_data)?;
    let mut image_data = read_image_data(&mut reader)?;
    select_mode_and_pack(&mut image_data, header, ciphertext)?;
    encode(&info, &image_data)
}

/// Parse the header only, without reading or decrypting the body.
pub fn probe(png_data: &[u8]) -> Result<Header, Error> {
    let (mut reader, _info) = decode(png_data)?;
    let image_data = read_image_data(&mut reader)?;
    let header_bytes = unpack_1bpb(&image_data, 0, HEADER_SIZE)?;
    Header::parse(&header_bytes)
}

/// Extract the header and the raw ciphertext body (still encrypted).
pub fn extract(png_data: &[u8]) -> Result<(Header, Vec<u8>), Error> {
    let (mut reader, _info) = decode(png_data)?;
    let image_data = read_image_data(&mut reader)?;
    let header_bytes = unpack_1bpb(&image_data, 0, HEADER_SIZE)?;
    let header = Header::parse(&header_bytes)?;

    let body_len = (header.write_size as usize)
        .checked_sub(HEADER_SIZE)
        .ok_or_else(|| Error::InvalidHeader("write_size smaller than header size".to_string()))?;
    let offset = HEADER_SIZE * 8;
    let ciphertext = match header.lsb_mode {
        LsbMode::OneBit => unpack_1bpb(&image_data, offset, body_len)?,
        LsbMode::TwoBits => unpack_2bpb(&image_data, offset, body_len)?,
        LsbMode::NoUsed => {
            return Err(Error::InvalidHeader(
                "lsb_mode NoUsed cannot carry an embedded body".to_string(),
            ));
        }
    };
    Ok((header, ciphertext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{ContainerExt, ContainerKind};

    fn make_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let mut image_data = Vec::new();
        for _ in 0..(width * height) {
            image_data.extend_from_slice(&color);
        }
        let mut out = Vec::new();
        {
            let mut cursor = Cursor::new(&mut out);
            let mut encoder = png::Encoder::new(&mut cursor, width, height);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&image_data).unwrap();
        }
        out
    }

    fn blank_header() -> Header {
        Header {
            container_kind: ContainerKind::Photo,
            extension: ContainerExt::Png,
            write_size: 0,
            lsb_mode: LsbMode::OneBit,
            filename: "cover.png".to_string(),
        }
    }

    #[test]
    fn embed_extract_round_trip_one_bit_mode() {
        let png = make_png(64, 64, [10, 20, 30]);
        let ciphertext = vec![0xAB; 50];
        let embedded = embed(&png, blank_header(), &ciphertext).unwrap();
        let (header, extracted) = extract(&embedded).unwrap();
        assert_eq!(header.lsb_mode, LsbMode::OneBit);
        assert_eq!(extracted, ciphertext);
    }

    #[test]
    fn embed_extract_round_trip_two_bit_mode() {
        // 256x256x3 = 196608 host bytes; force a body too big for 1bpb but
        // fine at 2bpb.
        let png = make_png(256, 256, [5, 5, 5]);
        let n = capacity_bytes(&png).unwrap();
        let one_bit_remaining = n - HEADER_SIZE * 8;
        let ciphertext = vec![0x11u8; one_bit_remaining / 8 + 1000];
        let embedded = embed(&png, blank_header(), &ciphertext).unwrap();
        let (header, extracted) = extract(&embedded).unwrap();
        assert_eq!(header.lsb_mode, LsbMode::TwoBits);
        assert_eq!(extracted, ciphertext);
    }

    #[test]
    fn embed_fails_with_capacity_error_when_too_small() {
        // 4x4x3 = 48 host bytes, header alone needs 8384 bits of host space.
        let png = make_png(4, 4, [1, 2, 3]);
        let err = embed(&png, blank_header(), b"hi").unwrap_err();
        assert!(matches!(err, Error::CapacityError));
    }

    #[test]
    fn one_bit_mode_changes_each_byte_by_at_most_one() {
        let png = make_png(64, 64, [128, 128, 128]);
        let ciphertext = vec![0xFF; 10];
        let embedded = embed(&png, blank_header(), &ciphertext).unwrap();

        let (mut before_reader, _) = decode(&png).unwrap();
        let before = read_image_data(&mut before_reader).unwrap();
        let (mut after_reader, _) = decode(&embedded).unwrap();
        let after = read_image_data(&mut after_reader).unwrap();

        for (b, a) in before.iter().zip(after.iter()) {
            let diff = (*b as i16 - *a as i16).abs();
            assert!(diff <= 1, "byte changed by {diff}, expected at most 1");
        }
    }

    #[test]
    fn probe_does_not_consume_or_disturb_extraction() {
        let png = make_png(64, 64, [7, 7, 7]);
        let ciphertext = vec![0x42; 20];
        let embedded = embed(&png, blank_header(), &ciphertext).unwrap();

        let probed = probe(&embedded).unwrap();
        let (extracted_header, extracted_body) = extract(&embedded).unwrap();
        assert_eq!(probed, extracted_header);
        assert_eq!(extracted_body, ciphertext);
    }

    #[test]
    fn probe_on_unembedded_image_fails() {
        let png = make_png(32, 32, [9, 9, 9]);
        assert!(probe(&png).is_err());
    }
}
