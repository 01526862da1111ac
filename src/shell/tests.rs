use super::*;
use crate::config::LibrarySettings;
use crate::probe::NoProbe;
use crate::test_support::{write_tagged, write_track};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tempfile::tempdir;

fn shell(root: &Path) -> Shell {
    let library = LibraryManager::create(root, LibrarySettings::default()).with_probe(NoProbe);
    Shell::with_library(library, Settings::default())
}

fn exec(shell: &mut Shell, line: &str) -> String {
    let mut out = Vec::new();
    shell.execute(line, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn run(shell: &mut Shell, input: &str) -> String {
    let mut out = Vec::new();
    shell.run(Cursor::new(input.to_string()), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn sample_library(dir: &Path) {
    write_tagged(
        &dir.join("a.mp3"),
        &[(b"TIT2", "Zebra"), (b"TPE1", "Blur"), (b"TYER", "1997"), (b"TCON", "Rock")],
    );
    write_tagged(
        &dir.join("b.mp3"),
        &[(b"TIT2", "apple"), (b"TPE1", "Air"), (b"TYER", "1998"), (b"TCON", "Electronic")],
    );
    write_tagged(&dir.join("c.mp3"), &[(b"TIT2", "Mango"), (b"TYER", "1997")]);
}

#[test]
fn split_word_separates_command_and_arguments() {
    assert_eq!(split_word("  filter artist  The Band "), ("filter", "artist  The Band"));
    assert_eq!(split_word("list"), ("list", ""));
    assert_eq!(split_word(""), ("", ""));
}

#[test]
fn run_scans_then_reads_until_quit() {
    let dir = tempdir().unwrap();
    sample_library(dir.path());
    let mut sh = shell(dir.path());

    let out = run(&mut sh, "list\nquit\nlist\n");
    assert!(out.contains("Found 3 audio files."));
    assert!(out.contains("1. Blur - Zebra"));
    assert!(out.contains("3. Unknown artist - Mango"));
    assert!(out.contains("Total: 3 files."));
    // Nothing after quit is executed.
    assert_eq!(out.matches("Total: 3 files.").count(), 1);
}

#[test]
fn run_ends_at_end_of_input_and_stops_monitor() {
    let dir = tempdir().unwrap();
    let mut sh = shell(dir.path());

    let out = run(&mut sh, "monitor 3600\n");
    assert!(out.contains("Found 0 audio files."));
    assert!(out.contains("interval: 3600 seconds"));
    assert!(!sh.is_monitoring());
}

#[test]
fn run_warns_about_a_missing_root() {
    let dir = tempdir().unwrap();
    let mut sh = shell(&dir.path().join("nope"));

    let out = run(&mut sh, "");
    assert!(out.contains("Warning: cannot read"));
    assert!(out.contains("Found 0 audio files."));
}

#[test]
fn empty_and_unknown_commands() {
    let dir = tempdir().unwrap();
    let mut sh = shell(dir.path());

    assert_eq!(exec(&mut sh, "   "), "");
    assert!(exec(&mut sh, "frobnicate").contains("Unknown command: frobnicate"));
    let mut out = Vec::new();
    assert_eq!(sh.execute("quit", &mut out).unwrap(), Flow::Quit);
    assert_eq!(sh.execute("help", &mut out).unwrap(), Flow::Continue);
}

#[test]
fn info_refers_to_the_last_listing() {
    let dir = tempdir().unwrap();
    sample_library(dir.path());
    let mut sh = shell(dir.path());
    exec(&mut sh, "scan");

    exec(&mut sh, "sort title");
    let listing = exec(&mut sh, "list");
    assert!(listing.contains("1. Air - apple"));

    // A file removed after listing does not shift the numbers.
    fs::remove_file(dir.path().join("b.mp3")).unwrap();
    sh.library().reconcile_once(dir.path(), true);

    let info = exec(&mut sh, "info 1");
    assert!(info.contains("Title: apple"));
    assert!(info.contains("Artist: Air"));
    assert!(info.contains("Year: 1998"));
    assert!(info.contains("Genre: Electronic"));
    assert!(info.contains("Album: Unknown"));
    assert!(info.contains("Album image: Not present"));
}

#[test]
fn info_rejects_bad_numbers() {
    let dir = tempdir().unwrap();
    sample_library(dir.path());
    let mut sh = shell(dir.path());

    assert!(exec(&mut sh, "info").contains("Specify file number."));
    assert!(exec(&mut sh, "info 1").contains("No audio files found."));

    exec(&mut sh, "scan");
    assert!(exec(&mut sh, "info 0").contains("Invalid number."));
    assert!(exec(&mut sh, "info x").contains("Invalid number."));
    assert!(exec(&mut sh, "info 4").contains("There are only 3 files."));
}

#[test]
fn info_describes_the_cover() {
    let dir = tempdir().unwrap();
    let mut payload = vec![0u8];
    payload.extend_from_slice(b"image/jpeg\0");
    payload.push(3);
    payload.push(0);
    payload.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3]);

    let mut body = b"APIC".to_vec();
    body.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    body.extend_from_slice(&[0, 0]);
    body.extend_from_slice(&payload);
    let mut bytes = b"ID3\x03\x00\x00\x00\x00\x00".to_vec();
    bytes.push(body.len() as u8);
    bytes.extend_from_slice(&body);
    fs::write(dir.path().join("cover.mp3"), bytes).unwrap();

    let mut sh = shell(dir.path());
    exec(&mut sh, "scan");
    let info = exec(&mut sh, "info 1");
    assert!(info.contains("Title: cover.mp3"));
    assert!(info.contains("Album image: Present (7 bytes, JPEG, front cover)"));
}

#[test]
fn sort_validates_its_key() {
    let dir = tempdir().unwrap();
    let mut sh = shell(dir.path());

    assert!(exec(&mut sh, "sort").contains("Specify sorting criterion"));
    assert!(exec(&mut sh, "sort colour").contains("Invalid sorting criterion."));
    let out = exec(&mut sh, "sort YEAR");
    assert!(out.contains("Sorting by year..."));
    assert!(out.contains("Sorting completed."));
}

#[test]
fn filter_then_reset() {
    let dir = tempdir().unwrap();
    sample_library(dir.path());
    let mut sh = shell(dir.path());
    exec(&mut sh, "scan");

    assert!(exec(&mut sh, "filter").contains("Specify filter type"));
    assert!(exec(&mut sh, "filter artist").contains("Specify filter text."));
    assert!(exec(&mut sh, "filter mood happy").contains("Invalid filter type."));

    let out = exec(&mut sh, "filter year 1997");
    assert!(out.contains("Found 2 matching files."));
    let listing = exec(&mut sh, "list");
    assert!(listing.contains("Audio files (filtered):"));
    assert!(listing.contains("Total: 2 files."));

    exec(&mut sh, "sort title");
    let listing = exec(&mut sh, "list");
    assert!(listing.contains("1. Unknown artist - Mango"));
    assert!(listing.contains("2. Blur - Zebra"));

    assert!(exec(&mut sh, "filter artist bl").contains("Found 1 matching files."));

    assert!(exec(&mut sh, "reset").contains("Filter removed."));
    assert!(exec(&mut sh, "list").contains("Total: 3 files."));
}

#[test]
fn scan_of_another_directory_adds_to_the_catalog() {
    let dir = tempdir().unwrap();
    let other = tempdir().unwrap();
    write_track(&dir.path().join("a.mp3"), "A", "X");
    write_track(&other.path().join("b.mp3"), "B", "Y");
    let mut sh = shell(dir.path());

    exec(&mut sh, "scan");
    let out = exec(&mut sh, &format!("scan {}", other.path().display()));
    assert!(out.contains("Found 1 audio files."));
    assert_eq!(sh.library().len(), 2);
}

#[test]
fn monitor_and_stop() {
    let dir = tempdir().unwrap();
    let mut sh = shell(dir.path());

    assert!(exec(&mut sh, "stop").contains("Continuous scanning is not active."));

    let out = exec(&mut sh, "monitor 0");
    assert!(out.contains("interval: 60 seconds"));
    assert!(sh.is_monitoring());
    assert!(exec(&mut sh, "monitor").contains("already active"));

    let out = exec(&mut sh, "stop");
    assert!(out.contains("Continuous scanning stopped."));
    assert!(!sh.is_monitoring());

    let elsewhere = dir.path().display().to_string();
    let out = exec(&mut sh, &format!("monitor {elsewhere}"));
    assert!(out.contains(&format!("directory: {elsewhere}")));
    exec(&mut sh, "stop");
}

#[test]
fn config_prints_toml() {
    let dir = tempdir().unwrap();
    let mut sh = shell(dir.path());
    let out = exec(&mut sh, "config");
    assert!(out.contains("[reconcile]"));
    assert!(out.contains("interval_secs = 60"));
}

#[test]
fn format_duration_pads_seconds() {
    assert_eq!(format_duration(0), "0:00");
    assert_eq!(format_duration(65), "1:05");
    assert_eq!(format_duration(3600), "60:00");
}
