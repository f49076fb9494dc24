#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parsing and probing must never panic
    let _ = zentga::ImageInfo::from_bytes(data);
    let limits = zentga::Limits {
        max_pixels: Some(1 << 22),
        max_memory_bytes: Some(64 << 20),
        ..Default::default()
    };
    let Ok(image) = zentga::DecodeRequest::new(data)
        .with_limits(&limits)
        .decode(enough::Unstoppable)
    else {
        return;
    };
    let _ = image.to_rgba8();
    let _ = image.postage_stamp_rgba8();
});
