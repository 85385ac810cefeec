#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};

use bca_crc::{Image, SRecordWriteOptions, Segment, encode_bca, parse_srec, write_srec};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn temp_dir(prefix: &str) -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let mut dir = std::env::temp_dir();
    dir.push(format!("bca_crc_{prefix}_{}_{}", std::process::id(), id));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn write_file(path: &Path, data: &[u8]) {
    std::fs::write(path, data).unwrap();
}

pub fn run_bca_crc(args: &[String]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bca-crc"))
        .args(args)
        .output()
        .unwrap()
}

pub fn assert_success(output: &Output) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("bca-crc failed: {stderr}");
    }
}

pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(13).wrapping_add(seed))
        .collect()
}

/// Application bytes at 0x4300..0x4400 and a BCA at 0x83C0 covering them.
pub fn app_image(expected_crc: u32) -> Image {
    Image::with_segments(vec![
        Segment::new(0x4300, pattern(0x100, 1)),
        Segment::new(0x83C0, encode_bca(0x4300, 0x100, expected_crc).to_vec()),
    ])
}

pub fn write_srec_file(path: &Path, image: &Image) {
    let data = write_srec(image, &SRecordWriteOptions::default());
    write_file(path, &data);
}

pub fn read_srec_file(path: &Path) -> Image {
    let data = std::fs::read(path).unwrap();
    parse_srec(&data).unwrap().normalized().unwrap()
}
