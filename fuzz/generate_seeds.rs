#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn header(image_type: u8, cmap: (u8, u16, u8), w: u16, h: u16, depth: u8, descriptor: u8) -> Vec<u8> {
    let mut out = vec![0, cmap.0, image_type];
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&cmap.1.to_le_bytes());
    out.push(cmap.2);
    out.extend_from_slice(&[0, 0, 0, 0]);
    out.extend_from_slice(&w.to_le_bytes());
    out.extend_from_slice(&h.to_le_bytes());
    out.push(depth);
    out.push(descriptor);
    out
}

fn footer(extension: u32, developer: u32) -> Vec<u8> {
    let mut out = extension.to_le_bytes().to_vec();
    out.extend_from_slice(&developer.to_le_bytes());
    out.extend_from_slice(b"TRUEVISION-XFILE.\0");
    out
}

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // True-color 24-bit 2x2, bottom-left
    let mut tc = header(2, (0, 0, 0), 2, 2, 24, 0);
    tc.extend_from_slice(&[0, 0, 255, 0, 255, 0, 255, 0, 0, 128, 128, 128]);
    fs::write(format!("{dir}/truecolor_2x2.tga"), &tc).unwrap();

    // RLE true-color 32-bit 4x1 with alpha: one run, one raw
    let mut rle = header(10, (0, 0, 0), 4, 1, 32, 0x28);
    rle.extend_from_slice(&[0x82, 1, 2, 3, 255, 0x00, 4, 5, 6, 0]);
    fs::write(format!("{dir}/rle_truecolor_4x1.tga"), &rle).unwrap();

    // Color-mapped 8-bit 2x1 with a 2-entry 24-bit map
    let mut cm = header(1, (1, 2, 24), 2, 1, 8, 0);
    cm.extend_from_slice(&[0, 0, 255, 255, 0, 0]);
    cm.extend_from_slice(&[1, 0]);
    fs::write(format!("{dir}/colormapped_2x1.tga"), &cm).unwrap();

    // Gray 1x1 with an empty v2.0 footer
    let mut v2 = header(3, (0, 0, 0), 1, 1, 8, 0);
    v2.push(0x80);
    v2.extend_from_slice(&footer(0, 0));
    fs::write(format!("{dir}/gray_v2_footer.tga"), &v2).unwrap();

    // Gray 1x1 with a developer directory holding one entry
    let mut dev = header(3, (0, 0, 0), 1, 1, 8, 0);
    dev.push(0x10);
    dev.extend_from_slice(b"abc"); // entry data at 19
    dev.extend_from_slice(&1u16.to_le_bytes()); // directory at 22
    dev.extend_from_slice(&7u16.to_le_bytes());
    dev.extend_from_slice(&19u32.to_le_bytes());
    dev.extend_from_slice(&3u32.to_le_bytes());
    dev.extend_from_slice(&footer(0, 22));
    fs::write(format!("{dir}/gray_developer.tga"), &dev).unwrap();

    // Gray 1x1 with a bare 495-byte extension area
    let mut ext = header(3, (0, 0, 0), 1, 1, 8, 0);
    ext.push(0x20);
    let mut block = vec![0u8; 495];
    block[..2].copy_from_slice(&495u16.to_le_bytes());
    ext.extend_from_slice(&block);
    ext.extend_from_slice(&footer(19, 0));
    fs::write(format!("{dir}/gray_extension.tga"), &ext).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/short_header.bin"), &tc[..10]).unwrap();
    fs::write(format!("{dir}/truncated_rle.bin"), &rle[..21]).unwrap();
    fs::write(format!("{dir}/bad_type.bin"), header(7, (0, 0, 0), 1, 1, 8, 0)).unwrap();

    println!("Generated seed corpus in {dir}/");
}
