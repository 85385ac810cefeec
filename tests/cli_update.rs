mod common;

use bca_crc::{Image, Segment, crc32_bca, encode_bca, parse_srec};
use common::{
    app_image, assert_success, pattern, read_srec_file, run_bca_crc, temp_dir, write_file,
    write_srec_file,
};

#[test]
fn test_cli_patches_crc_to_file() {
    let dir = temp_dir("cli_update");
    let input = dir.join("app.srec");
    let out = dir.join("out.srec");
    write_srec_file(&input, &app_image(0));

    let output = run_bca_crc(&[
        input.display().to_string(),
        "-o".to_string(),
        out.display().to_string(),
    ]);
    assert_success(&output);
    assert!(output.stdout.is_empty());

    let patched = read_srec_file(&out);
    let crc = crc32_bca(&pattern(0x100, 1));
    assert_eq!(
        patched.read_bytes_contiguous(0x83CC, 4).unwrap(),
        crc.to_le_bytes().to_vec()
    );
    assert_eq!(patched, app_image(crc).normalized().unwrap());
}

#[test]
fn test_cli_writes_stdout_by_default() {
    let dir = temp_dir("cli_stdout");
    let input = dir.join("app.srec");
    write_srec_file(&input, &app_image(0));

    let output = run_bca_crc(&[input.display().to_string()]);
    assert_success(&output);

    let patched = parse_srec(&output.stdout).unwrap().normalized().unwrap();
    let crc = crc32_bca(&pattern(0x100, 1));
    assert_eq!(patched, app_image(crc).normalized().unwrap());
}

#[test]
fn test_cli_custom_bca_address() {
    let dir = temp_dir("cli_address");
    let input = dir.join("app.srec");
    let out = dir.join("out.srec");

    let mut data = pattern(0x40, 5);
    data[..16].copy_from_slice(&encode_bca(0x1000, 0x40, 0));
    let source = Image::with_segments(vec![Segment::new(0x1000, data.clone())]);
    write_srec_file(&input, &source);

    let output = run_bca_crc(&[
        "-b".to_string(),
        "0x1000".to_string(),
        "-o".to_string(),
        out.display().to_string(),
        input.display().to_string(),
    ]);
    assert_success(&output);

    let mut elided = data[..0xC].to_vec();
    elided.extend_from_slice(&data[0x10..]);
    let patched = read_srec_file(&out);
    assert_eq!(
        patched.read_bytes_contiguous(0x100C, 4).unwrap(),
        crc32_bca(&elided).to_le_bytes().to_vec()
    );
}

#[test]
fn test_cli_key_mismatch_writes_nothing() {
    let dir = temp_dir("cli_mismatch");
    let input = dir.join("app.srec");
    let out = dir.join("out.srec");
    let source = Image::with_segments(vec![Segment::new(0x83C0, vec![0; 0x10])]);
    write_srec_file(&input, &source);

    let output = run_bca_crc(&[
        input.display().to_string(),
        "-o".to_string(),
        out.display().to_string(),
    ]);
    assert!(!output.status.success());
    assert!(!out.exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("key mismatch"), "{stderr}");
}

#[test]
fn test_cli_missing_bca_fails() {
    let dir = temp_dir("cli_missing");
    let input = dir.join("app.srec");
    write_srec_file(
        &input,
        &Image::with_segments(vec![Segment::new(0x4300, vec![0xAA; 0x10])]),
    );

    let output = run_bca_crc(&[input.display().to_string()]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not find Bootloader Configuration Area"), "{stderr}");
}

#[test]
fn test_cli_rejects_contradictory_records() {
    let dir = temp_dir("cli_overlap");
    let input = dir.join("app.srec");
    write_file(&input, b"S1061000010203E3\r\nS1041001FFEB\r\nS9030000FC\r\n");

    let output = run_bca_crc(&[input.display().to_string()]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_cli_bad_record_checksum() {
    let dir = temp_dir("cli_bad_checksum");
    let input = dir.join("app.srec");
    write_file(&input, b"S1061000010203E4\r\n");

    let output = run_bca_crc(&[input.display().to_string()]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("checksum mismatch at line 1: expected E3, got E4"),
        "{stderr}"
    );
}

#[test]
fn test_cli_verify() {
    let dir = temp_dir("cli_verify");
    let stale = dir.join("stale.srec");
    let fresh = dir.join("fresh.srec");
    write_srec_file(&stale, &app_image(0));
    write_srec_file(&fresh, &app_image(crc32_bca(&pattern(0x100, 1))));

    let output = run_bca_crc(&["--verify".to_string(), stale.display().to_string()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("CRC mismatch"));

    let output = run_bca_crc(&["--verify".to_string(), fresh.display().to_string()]);
    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("CRC OK"));
}

#[test]
fn test_cli_output_verifies() {
    let dir = temp_dir("cli_roundtrip");
    let input = dir.join("app.srec");
    let out = dir.join("out.srec");
    write_srec_file(&input, &app_image(0x1234_5678));

    assert_success(&run_bca_crc(&[
        input.display().to_string(),
        "-o".to_string(),
        out.display().to_string(),
    ]));
    assert_success(&run_bca_crc(&[
        "--verify".to_string(),
        out.display().to_string(),
    ]));
}

#[test]
fn test_cli_debug_logs_bca() {
    let dir = temp_dir("cli_debug");
    let input = dir.join("app.srec");
    write_srec_file(&input, &app_image(0));

    let output = run_bca_crc(&["-d".to_string(), input.display().to_string()]);
    assert_success(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Found BCA at 0x83C0"), "{stderr}");
}
