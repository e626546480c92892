//! End-to-end runs: command files on disk, loaded and executed by the harness.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use fieldlock::generate::write_command_files;
use fieldlock::{
    Command, FileSource, Harness, HarnessConfig, Scenario, Script, SharedRecord, load_scripts,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_single_worker_script_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "thread0.txt", "write 0 5\nwrite 1 9\nstring\n");

    let scripts = load_scripts(&[FileSource::new(path)]);
    let record = SharedRecord::default();
    let report = Harness::default().run_on(&record, &scripts).unwrap();

    assert_eq!(report.commands_loaded, vec![3]);
    assert_eq!(report.final_snapshot.values(), &[5, 9]);
    assert_eq!(record.get(0), 5);
    assert_eq!(record.get(1), 9);
}

#[test]
fn test_three_writers_one_survives() {
    let dir = tempfile::tempdir().unwrap();
    let sources: Vec<_> = (1..=3)
        .map(|id| {
            FileSource::new(write_file(
                dir.path(),
                &format!("thread{id}.txt"),
                &format!("write 0 {id}\n"),
            ))
        })
        .collect();

    let record = SharedRecord::default();
    Harness::default()
        .run_on(&record, &load_scripts(&sources))
        .unwrap();

    let value = record.get(0);
    assert!([1, 2, 3].contains(&value), "unexpected value {value}");
}

#[test]
fn test_malformed_line_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "bad.txt", "foo bar baz\nread 0\n");

    let scripts = load_scripts(&[FileSource::new(path)]);

    assert_eq!(scripts[0].commands(), &[Command::Read { field: 0 }]);
}

#[test]
fn test_unreadable_file_runs_as_idle_worker() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_file(dir.path(), "good.txt", "write 1 4\n");
    let sources = [
        FileSource::new(dir.path().join("missing.txt")),
        FileSource::new(good),
    ];

    let report = Harness::default().run(&load_scripts(&sources)).unwrap();

    assert_eq!(report.commands_loaded, vec![0, 1]);
    assert_eq!(report.final_snapshot.values(), &[0, 4]);
}

#[test]
fn test_generated_workload_completes() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(2024);

    for scenario in Scenario::ALL {
        let prefix = dir.path().join(scenario.name());
        let paths = write_command_files(scenario, 2_000, &prefix, 3, &mut rng).unwrap();
        let sources: Vec<_> = paths.into_iter().map(FileSource::new).collect();

        let report = Harness::default().run(&load_scripts(&sources)).unwrap();

        assert_eq!(report.commands_loaded, vec![2_000; 3]);
        assert!(report.stats.iter().all(|s| s.total() == 2_000));
        for value in report.final_snapshot.values() {
            assert!((0..=1000).contains(value));
        }
    }
}

#[test]
fn test_mixed_workers_finish_within_timeout() {
    // Every worker mixes single-field operations with full snapshots.
    let scripts: Vec<Script> = (0..8_usize)
        .map(|worker| {
            (0..20_000_usize)
                .map(|i| match (worker + i) % 5 {
                    0 => Command::Read { field: i % 2 },
                    1 => Command::Write {
                        field: (i + 1) % 2,
                        value: i as i64,
                    },
                    _ => Command::SnapshotAll,
                })
                .collect()
        })
        .collect();

    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let report = Harness::default().run(&scripts);
        tx.send(report.map(|r| r.workers())).unwrap();
    });

    let workers = rx
        .recv_timeout(Duration::from_secs(60))
        .expect("harness deadlocked")
        .unwrap();
    assert_eq!(workers, 8);
}

#[test]
fn test_snapshots_never_tear_under_contention() {
    // Worker 0 writes k to field 0 then field 1, so any consistent view has
    // field0 - field1 in {0, 1}. The other workers check every snapshot.
    let record = SharedRecord::default();
    let writer: Script = (1..=50_000_i64)
        .flat_map(|k| {
            [
                Command::Write { field: 0, value: k },
                Command::Write { field: 1, value: k },
            ]
        })
        .collect();

    std::thread::scope(|s| {
        let record = &record;
        s.spawn(move || {
            Harness::default().run_on(record, &[writer]).unwrap();
        });

        for _ in 0..3 {
            s.spawn(move || {
                for _ in 0..10_000 {
                    let snap = record.snapshot_all();
                    let diff = snap.values()[0] - snap.values()[1];
                    assert!(diff == 0 || diff == 1, "torn snapshot {snap}");
                }
            });
        }
    });

    assert_eq!(record.snapshot_all().values(), &[50_000, 50_000]);
}

#[test]
fn test_config_field_count_applies() {
    let harness = Harness::new(HarnessConfig { field_count: 3 });
    let report = harness
        .run(&[Script::new(vec![Command::Write { field: 2, value: 1 }])])
        .unwrap();
    assert_eq!(report.final_snapshot.to_string(), "Field0=0; Field1=0; Field2=1");
}
