#![no_main]
use libfuzzer_sys::fuzz_target;
use zentga::*;

fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_pixels: Some(1 << 22),
        max_memory_bytes: Some(64 << 20),
        ..Default::default()
    };
    let Ok(image) = DecodeRequest::new(data)
        .with_limits(&limits)
        .decode(enough::Unstoppable)
    else {
        return;
    };

    // Not every parsed file is writable (e.g. duplicate developer tags)
    let encoder = EncodeRequest::new().with_timestamp(TimestampPolicy::Keep);
    let Ok(first) = encoder.encode(&image, enough::Unstoppable) else {
        return;
    };
    // A v1.0 file whose pixel data happens to end in the footer signature
    // reads back as v2.0
    if !image.is_extended() && ImageInfo::from_bytes(&first).is_ok_and(|i| i.extended) {
        return;
    }
    let Ok(reparsed) = parse(&first) else {
        panic!("written file failed to parse");
    };
    assert_eq!(image.pixels, reparsed.pixels, "roundtrip pixel mismatch");
    assert_eq!(image.image_spec, reparsed.image_spec);
    assert_eq!(image.color_map, reparsed.color_map);

    // A written file is a fixed point
    let second = encoder
        .encode(&reparsed, enough::Unstoppable)
        .expect("re-encode of a written file");
    assert_eq!(first, second, "second write differs");
});
