use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use tempfile::tempdir;
use tuneshelf::config::{LibrarySettings, ReconcileSettings};
use tuneshelf::library::{Filter, SortKey};
use tuneshelf::probe::NoProbe;
use tuneshelf::{LibraryManager, Reconciler, tag};

/// A v2.4 tag with Latin-1 text frames.
fn id3v24(frames: &[(&[u8; 4], &str)]) -> Vec<u8> {
    let syncsafe = |n: u32| {
        [
            ((n >> 21) & 0x7F) as u8,
            ((n >> 14) & 0x7F) as u8,
            ((n >> 7) & 0x7F) as u8,
            (n & 0x7F) as u8,
        ]
    };

    let mut body = Vec::new();
    for (id, value) in frames {
        body.extend_from_slice(&id[..]);
        body.extend_from_slice(&syncsafe(value.len() as u32 + 1));
        body.extend_from_slice(&[0, 0, 0]);
        body.extend_from_slice(value.as_bytes());
    }
    // Padding.
    body.extend_from_slice(&[0; 32]);

    let mut out = b"ID3\x04\x00\x00".to_vec();
    out.extend_from_slice(&syncsafe(body.len() as u32));
    out.extend_from_slice(&body);
    out.extend_from_slice(b"audio frames follow");
    out
}

/// Write through a temporary name so a concurrent walk never sees half a file.
fn write_track(dir: &Path, n: usize) {
    let bytes = id3v24(&[
        (b"TIT2", &format!("Title {n}")),
        (b"TPE1", &format!("Artist {n}")),
        (b"TDRC", &format!("{}", 1990 + n % 5)),
        (b"TRCK", &format!("{n}/99")),
    ]);
    let tmp = dir.join(format!("track{n}.part"));
    fs::write(&tmp, bytes).unwrap();
    fs::rename(&tmp, dir.join(format!("track{n}.mp3"))).unwrap();
}

fn manager(root: &Path) -> LibraryManager {
    LibraryManager::create(root, LibrarySettings::default()).with_probe(NoProbe)
}

#[test]
fn read_tag_parses_a_file_on_disk() {
    let dir = tempdir().unwrap();
    write_track(dir.path(), 7);

    let meta = tag::read_tag(&dir.path().join("track7.mp3"))
        .unwrap()
        .unwrap();
    assert_eq!(meta.title, "Title 7");
    assert_eq!(meta.artist, "Artist 7");
    assert_eq!(meta.year, 1992);
    assert_eq!(meta.track_number, 7);
}

#[test]
fn scan_query_and_reconcile() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("disc2");
    fs::create_dir(&nested).unwrap();
    for n in 1..=4 {
        write_track(dir.path(), n);
    }
    write_track(&nested, 5);
    fs::write(dir.path().join("cover.jpg"), b"not audio").unwrap();

    let mgr = manager(dir.path());
    mgr.check_root().unwrap();
    let summary = mgr.scan();
    assert_eq!(summary.added(), 5);
    assert_eq!(mgr.len(), 5);

    let by_track: Vec<u32> = mgr
        .sorted(SortKey::Track)
        .iter()
        .map(|e| e.metadata.track_number)
        .collect();
    assert_eq!(by_track, vec![1, 2, 3, 4, 5]);

    let filter = Filter::parse("year", "1991").unwrap();
    let hits = mgr.filter(&filter);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].metadata.title, "Title 1");

    // Rescanning replaces rather than duplicates.
    let again = mgr.scan();
    assert_eq!(again.new_entries, 0);
    assert_eq!(again.replaced, 5);
    assert_eq!(mgr.len(), 5);

    fs::remove_file(dir.path().join("track2.mp3")).unwrap();
    write_track(&nested, 6);
    let report = mgr.reconcile_once(dir.path(), true);
    assert_eq!(report.removed, vec![dir.path().join("track2.mp3")]);
    assert_eq!(report.added, vec![nested.join("track6.mp3")]);
    assert_eq!(mgr.len(), 5);

    // A pass over an unchanged tree changes nothing.
    assert!(mgr.reconcile_once(dir.path(), true).is_empty());
}

#[test]
fn readers_never_see_torn_entries_while_reconciling() {
    let dir = tempdir().unwrap();
    for n in 0..10 {
        write_track(dir.path(), n);
    }
    let mgr = manager(dir.path());
    mgr.scan();

    let settings = ReconcileSettings {
        interval_secs: 1,
        ..ReconcileSettings::default()
    };
    let mut reconciler = Reconciler::new(&mgr, &settings);
    reconciler.start();

    thread::scope(|s| {
        let reader = s.spawn(|| {
            let deadline = Instant::now() + Duration::from_millis(2500);
            let mut reads = 0u64;
            while Instant::now() < deadline {
                for entry in mgr.entries() {
                    let n = entry.metadata.title.trim_start_matches("Title ");
                    assert_eq!(entry.metadata.artist, format!("Artist {n}"));
                    assert_eq!(
                        entry.path.file_name().unwrap().to_string_lossy(),
                        format!("track{n}.mp3")
                    );
                }
                reads += 1;
            }
            reads
        });

        for n in 10..20 {
            write_track(dir.path(), n);
            let _ = fs::remove_file(dir.path().join(format!("track{}.mp3", n - 10)));
            thread::sleep(Duration::from_millis(100));
        }

        assert!(reader.join().unwrap() > 0);
    });

    // Let one more pass settle the final state.
    let passes = reconciler.passes();
    let deadline = Instant::now() + Duration::from_secs(10);
    while reconciler.passes() <= passes && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }
    reconciler.stop();

    let mut titles: Vec<String> = mgr
        .entries()
        .iter()
        .map(|e| e.metadata.title.clone())
        .collect();
    titles.sort();
    let mut expected: Vec<String> = (10..20).map(|n| format!("Title {n}")).collect();
    expected.sort();
    assert_eq!(titles, expected);
}
