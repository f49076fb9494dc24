use enough::Unstoppable;
use rgb::RGBA8;
use zentga::field::{AuthorComments, Field, Footer, Fraction, KeyColor, SIGNATURE, SoftwareVersion};
use zentga::*;

fn keep() -> EncodeRequest {
    EncodeRequest::new().with_timestamp(TimestampPolicy::Keep)
}

fn gradient(w: u16, h: u16, bpp: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; w as usize * h as usize * bpp];
    for (i, px) in pixels.chunks_exact_mut(bpp).enumerate() {
        let x = i % w as usize;
        let y = i / w as usize;
        for (c, v) in px.iter_mut().enumerate() {
            *v = (x * 16 + y * 3 + c * 40) as u8;
        }
    }
    pixels
}

fn full_image() -> TgaImage {
    let mut img = TgaImage::new(20, 10, 32, ImageType::RleTrueColor)
        .with_alpha_bits(8)
        .with_origin(ImageOrigin::TopLeft)
        .with_image_id(ImageId::terminated("roundtrip"));
    img.pixels = Some(gradient(20, 10, 4));
    img.upgrade_to_extended();
    img.generate_postage_stamp().unwrap();
    img.add_developer_entry(1, b"first".to_vec()).unwrap();
    img.add_developer_entry(2, vec![0xAB; 7]).unwrap();
    img.add_developer_entry(40, vec![1, 2, 3]).unwrap();

    let ext = img.extension_mut().unwrap();
    let m = &mut ext.metadata;
    m.author_name = "A. Painter".into();
    m.author_comments = AuthorComments::new("line one\nline two");
    m.job_name = "cover art".into();
    m.software_id = "zentga".into();
    m.software_version = SoftwareVersion {
        number: 101,
        letter: b'a',
    };
    m.key_color = KeyColor(RGBA8::new(1, 2, 3, 4));
    m.pixel_aspect_ratio = Fraction::new(1, 1);
    m.gamma = Fraction::new(22, 10);
    m.timestamp = TimeStamp {
        month: 6,
        day: 15,
        year: 2023,
        hour: 8,
        minute: 30,
        second: 0,
    };
    ext.vendor_data = b"vendor".to_vec();
    ext.scan_line_table = Some((0..10).map(|r| 1000 + r * 80).collect());
    ext.color_correction_table = Some((0..1024).map(|i| i as u16 * 64).collect());
    img
}

// ── Whole-file round trips ───────────────────────────────────────────

#[test]
fn truecolor24_raw_roundtrip() {
    let mut img = TgaImage::new(5, 3, 24, ImageType::TrueColor);
    img.pixels = Some(gradient(5, 3, 3));
    let bytes = serialize(&img).unwrap();
    assert_eq!(bytes.len(), 18 + 45);
    assert_eq!(parse(&bytes).unwrap(), img);
}

#[test]
fn truecolor24_rle_roundtrip() {
    let mut img = TgaImage::new(64, 4, 24, ImageType::RleTrueColor);
    let mut pixels = vec![0u8; 64 * 4 * 3];
    pixels[300..330].fill(0x7F);
    img.pixels = Some(pixels);
    let bytes = serialize(&img).unwrap();
    assert!(bytes.len() < 18 + 64 * 4 * 3);
    assert_eq!(parse(&bytes).unwrap(), img);
}

#[test]
fn color_mapped_roundtrip() {
    let palette = [
        RGBA8::new(255, 0, 0, 255),
        RGBA8::new(0, 255, 0, 255),
        RGBA8::new(0, 0, 255, 255),
    ];
    let mut img = TgaImage::new(3, 2, 8, ImageType::RleColorMapped).with_origin(ImageOrigin::TopLeft);
    img.set_palette(&palette, ColorMapEntrySize::Rgb888).unwrap();
    img.pixels = Some(vec![0, 1, 2, 2, 2, 0]);

    let bytes = serialize(&img).unwrap();
    assert_eq!(&bytes[3..8], &[0, 0, 3, 0, 24]);
    let back = parse(&bytes).unwrap();
    assert_eq!(back, img);
    assert_eq!(
        back.to_rgba8().unwrap(),
        [
            palette[0], palette[1], palette[2], palette[2], palette[2], palette[0]
        ]
    );
}

#[test]
fn full_extended_roundtrip() {
    let img = full_image();
    let bytes = keep().encode(&img, Unstoppable).unwrap();
    let back = DecodeRequest::new(&bytes).decode(Unstoppable).unwrap();
    assert_eq!(back, img);
    // and the second save is byte-identical
    assert_eq!(keep().encode(&back, Unstoppable).unwrap(), bytes);
}

#[test]
fn layout_matches_written_bytes() {
    let img = full_image();
    let layout = resolve(&img, TimestampPolicy::Keep).unwrap();
    let bytes = keep().encode(&img, Unstoppable).unwrap();
    assert_eq!(bytes.len(), layout.file_len as usize);

    let footer = Footer::decode(&bytes[bytes.len() - 26..]).unwrap();
    assert_eq!(Some(footer), layout.footer);

    let dir = footer.developer_directory_offset as usize;
    assert_eq!(&bytes[dir..dir + 2], &3u16.to_le_bytes());
    for entry in &layout.developer_directory {
        let at = entry.offset as usize;
        let data = &img.developer().unwrap().entries;
        let want = data.iter().find(|e| e.tag == entry.tag).unwrap();
        assert_eq!(&bytes[at..at + entry.size as usize], &want.data[..]);
    }

    let ext = layout.extension.unwrap();
    let at = ext.offset as usize;
    assert_eq!(&bytes[at..at + 2], &(495u16 + 6).to_le_bytes());
    assert_eq!(&bytes[at + 495..at + 501], b"vendor");
    let stamp_at = ext.offsets.postage_stamp as usize;
    assert_eq!(&bytes[stamp_at..stamp_at + 2], &[20, 10]);
    let scan_at = ext.offsets.scan_line as usize;
    assert_eq!(&bytes[scan_at..scan_at + 4], &1000u32.to_le_bytes());
    let cc_at = ext.offsets.color_correction as usize;
    assert_eq!(&bytes[cc_at + 2..cc_at + 4], &64u16.to_le_bytes());
    assert_eq!(cc_at + 2048 + 26, bytes.len());
}

#[test]
fn fixed_timestamp_is_written() {
    let img = full_image();
    let ts = TimeStamp {
        month: 1,
        day: 2,
        year: 2030,
        hour: 3,
        minute: 4,
        second: 5,
    };
    let bytes = EncodeRequest::new()
        .with_timestamp(TimestampPolicy::Fixed(ts))
        .encode(&img, Unstoppable)
        .unwrap();
    let back = parse(&bytes).unwrap();
    assert_eq!(back.extension().unwrap().metadata.timestamp, ts);
    // the source image is not touched
    assert_eq!(img.extension().unwrap().metadata.timestamp.year, 2023);
}

// ── Offset invariants ────────────────────────────────────────────────

#[test]
fn absent_sections_have_zero_offsets() {
    let mut img = TgaImage::new(4, 4, 8, ImageType::BlackWhite);
    let layout = resolve(&img, TimestampPolicy::Keep).unwrap();
    assert!(layout.footer.is_none());
    assert!(layout.extension.is_none());

    img.format = FormatVersion::Extended {
        developer: None,
        extension: None,
    };
    let footer = resolve(&img, TimestampPolicy::Keep).unwrap().footer.unwrap();
    assert_eq!(footer.extension_offset, 0);
    assert_eq!(footer.developer_directory_offset, 0);

    img.upgrade_to_extended();
    let layout = resolve(&img, TimestampPolicy::Keep).unwrap();
    assert_ne!(layout.footer.unwrap().extension_offset, 0);
    let offsets = layout.extension.unwrap().offsets;
    assert_eq!(offsets.scan_line, 0);
    assert_eq!(offsets.postage_stamp, 0);
    assert_eq!(offsets.color_correction, 0);

    img.generate_postage_stamp().unwrap();
    let offsets = resolve(&img, TimestampPolicy::Keep)
        .unwrap()
        .extension
        .unwrap()
        .offsets;
    assert_ne!(offsets.postage_stamp, 0);
    assert_eq!(offsets.scan_line, 0);
}

#[test]
fn duplicate_developer_tags_fail_save() {
    let mut img = TgaImage::new(1, 1, 8, ImageType::BlackWhite);
    img.upgrade_to_extended();
    for tag in [5, 6, 5] {
        img.add_developer_entry(tag, vec![tag as u8]).unwrap();
    }
    assert!(matches!(
        serialize(&img),
        Err(TgaError::DuplicateDeveloperTag(5))
    ));
}

#[test]
fn unsorted_developer_entries_load_sorted() {
    let mut img = TgaImage::new(1, 1, 8, ImageType::BlackWhite);
    img.upgrade_to_extended();
    for tag in [30, 10, 20] {
        img.add_developer_entry(tag, vec![tag as u8; 2]).unwrap();
    }
    let back = parse(&keep().encode(&img, Unstoppable).unwrap()).unwrap();
    let tags: Vec<u16> = back
        .developer()
        .unwrap()
        .entries
        .iter()
        .map(|e| e.tag)
        .collect();
    assert_eq!(tags, [10, 20, 30]);
}

// ── Legacy fallback ──────────────────────────────────────────────────

#[test]
fn corrupted_signature_reads_as_legacy() {
    let img = full_image();
    let mut bytes = keep().encode(&img, Unstoppable).unwrap();
    let n = bytes.len();
    bytes[n - 10] ^= 0xFF;
    let back = parse(&bytes).unwrap();
    assert_eq!(back.format, FormatVersion::Legacy);
    assert_eq!(back.pixels, img.pixels);
    assert_eq!(back.image_id, img.image_id);
}

#[test]
fn signature_before_the_tail_is_ignored() {
    let mut img = TgaImage::new(2, 2, 8, ImageType::BlackWhite);
    img.pixels = Some(vec![1, 2, 3, 4]);
    let mut bytes = serialize(&img).unwrap();
    // a footer-looking record that is not at the very end
    bytes.extend_from_slice(&Footer::default().to_bytes());
    bytes.push(0);
    let back = parse(&bytes).unwrap();
    assert_eq!(back.format, FormatVersion::Legacy);
    assert_eq!(back.pixels, img.pixels);
}

#[test]
fn info_sees_the_footer() {
    let img = full_image();
    let bytes = keep().encode(&img, Unstoppable).unwrap();
    let info = ImageInfo::from_bytes(&bytes).unwrap();
    assert_eq!((info.width, info.height, info.pixel_depth), (20, 10, 32));
    assert_eq!(info.image_type, ImageType::RleTrueColor);
    assert!(info.extended);
    assert!(bytes.windows(16).any(|w| w == SIGNATURE));
}

#[test]
fn image_id_with_trailing_nul_roundtrips() {
    for id in [ImageId::new("abc\0"), ImageId::terminated("abc\0"), ImageId::terminated("abc")] {
        let img = TgaImage::new(1, 1, 8, ImageType::BlackWhite).with_image_id(id);
        assert_eq!(parse(&serialize(&img).unwrap()).unwrap(), img);
    }
}

// ── Concrete packet scenarios ────────────────────────────────────────

#[test]
fn two_black_pixels_encode_as_a_count_two_run() {
    assert_eq!(encode_rle(&[0; 6], 2, 1, 3).unwrap(), [0x81, 0, 0, 0]);
}

#[test]
fn two_distinct_pixels_encode_as_one_raw_packet() {
    assert_eq!(
        encode_rle(&[1, 2, 3, 4, 5, 6], 2, 1, 3).unwrap(),
        [0x01, 1, 2, 3, 4, 5, 6]
    );
}

#[test]
fn color_map_length_mismatch_fails_save() {
    for len in [5, 7] {
        let mut img = TgaImage::new(1, 1, 8, ImageType::ColorMapped);
        img.color_map_spec = ColorMapSpec {
            first_entry_index: 0,
            length: 2,
            entry_size: ColorMapEntrySize::Rgb888,
        };
        img.color_map = Some(vec![0; len]);
        assert!(matches!(
            serialize(&img),
            Err(TgaError::MalformedLength { .. })
        ));
    }
}

// ── Pixel expansion ──────────────────────────────────────────────────

#[test]
fn argb1555_truecolor_expands_alpha() {
    let mut img = TgaImage::new(2, 1, 16, ImageType::TrueColor).with_alpha_bits(1);
    let opaque_red: u16 = 0x8000 | (31 << 10);
    let clear_blue: u16 = 31;
    let mut px = opaque_red.to_le_bytes().to_vec();
    px.extend_from_slice(&clear_blue.to_le_bytes());
    img.pixels = Some(px);
    let back = parse(&serialize(&img).unwrap()).unwrap();
    assert_eq!(
        back.to_rgba8().unwrap(),
        [RGBA8::new(255, 0, 0, 255), RGBA8::new(0, 0, 255, 0)]
    );
}

#[test]
fn postage_stamp_expands() {
    let img = full_image();
    let stamp = img.postage_stamp_rgba8().unwrap();
    assert_eq!(stamp.len(), 20 * 10);
    assert_eq!(stamp, img.to_rgba8().unwrap());
}
