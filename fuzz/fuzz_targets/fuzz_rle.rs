#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&shape, pixels)) = data.split_first() else {
        return;
    };
    let bpp = usize::from(shape & 3) + 1;
    let width = usize::from(shape >> 2) + 1;
    let rows = pixels.len() / (width * bpp);
    if rows == 0 {
        return;
    }
    let pixels = &pixels[..rows * width * bpp];

    let encoded = zentga::encode_rle(pixels, width, rows, bpp).expect("valid buffer");
    let decoded = zentga::decode_rle(&encoded, width, rows, bpp).expect("own output decodes");
    assert_eq!(decoded, pixels);

    // Arbitrary packet streams must never panic
    let _ = zentga::decode_rle(pixels, width, rows, bpp);
});
