// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
#![allow(clippy::unwrap_used)]
//! End-to-end behaviour of the local history facade

use localhistory_compression::CompressionAlgorithm;
use localhistory_config::Config;
use localhistory_storage::MemoryContentStorage;
use localhistory_versioning::{HistoryError, LocalHistory};
use tempfile::TempDir;

fn memory_history() -> LocalHistory {
    LocalHistory::new(Box::new(MemoryContentStorage::new()))
}

fn config_in(dir: &TempDir, compression: CompressionAlgorithm) -> Config {
    let mut config = Config::default();
    config.storage.path = dir.path().to_path_buf();
    config.storage.compression = compression;
    config
}

#[test]
fn commands_group_changes_for_checkpoints() {
    let mut history = memory_history();
    history.create_directory("src").unwrap();
    let checkpoint = history.put_checkpoint();

    history.begin_command(Some("Refactor"));
    history.create_file("src/a.rs", Some(b"fn a() {}".as_slice()), 1).unwrap();
    history.create_file("src/b.rs", Some(b"fn b() {}".as_slice()), 1).unwrap();
    history.rename("src/a.rs", "c.rs").unwrap();
    assert_eq!(history.end_command().unwrap(), Some(2));

    let undone = history.revert_to_previous_state(history.put_checkpoint()).unwrap();
    assert_eq!(undone.len(), 1);
    assert_eq!(undone[0].name.as_deref(), Some("Refactor"));
    assert_eq!(history.put_checkpoint(), checkpoint);
    assert!(!history.root().has_entry("src/b.rs"));

    history.replay(undone).unwrap();
    assert_eq!(history.content("src/c.rs").unwrap(), b"fn a() {}");
}

#[test]
fn revisions_and_selection_follow_a_file() {
    let mut history = memory_history();
    history.create_directory("doc").unwrap();
    history
        .create_file("doc/notes.md", Some(b"intro\nbody".as_slice()), 1)
        .unwrap();
    history
        .change_file_content("doc/notes.md", Some(b"title\nintro\nbody".as_slice()), 2)
        .unwrap();
    history.rename("doc/notes.md", "README.md").unwrap();
    history
        .change_file_content(
            "doc/README.md",
            Some(b"title\n\nintro\nbody\nfooter".as_slice()),
            3,
        )
        .unwrap();

    let revisions = history.revisions("doc/README.md").unwrap();
    let paths: Vec<_> = revisions.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["doc/notes.md", "doc/notes.md", "doc/README.md", "doc/README.md"]
    );
    assert_eq!(history.load_revision(&revisions[0]).unwrap(), b"intro\nbody");

    // Select "intro\nbody" in the latest revision.
    let mut calc = history.selection_calculator("doc/README.md", 2, 4).unwrap();
    assert_eq!(calc.target(), 3);
    for index in (0..=3).rev() {
        assert!(calc.can_calculate_for(index));
        assert_eq!(calc.selection_for(index).unwrap().text(), "intro\nbody");
    }
    assert!(!calc.is_stale(history.changes()));
}

#[test]
fn selection_goes_stale_after_new_changes() {
    let mut history = memory_history();
    history.create_file("f", Some(b"a".as_slice()), 1).unwrap();
    let generation = history.changes().generation();
    {
        let calc = history.selection_calculator("f", 0, 1).unwrap();
        assert!(!calc.is_stale(history.changes()));
    }
    history.change_file_content("f", Some(b"b".as_slice()), 2).unwrap();
    assert!(history.changes().generation() > generation);

    let revisions = history.revisions("f").unwrap();
    let calc = localhistory_versioning::SelectionCalculator::new(
        history.storage(),
        revisions,
        1,
        0,
        1,
        generation,
        100,
    )
    .unwrap();
    assert!(calc.is_stale(history.changes()));
}

#[test]
fn purge_releases_only_unreachable_content() {
    let mut history = memory_history();
    history.create_file("f", Some(b"one".as_slice()), 1).unwrap();
    history.change_file_content("f", Some(b"two".as_slice()), 2).unwrap();
    history.create_file("g", Some(b"gone".as_slice()), 3).unwrap();
    history.delete("g").unwrap();
    assert_eq!(history.stats().live_records, 3);

    let report = history
        .purge_obsolete(localhistory_versioning::now_millis() + 1)
        .unwrap();
    assert_eq!(report.sets_removed, 4);
    assert_eq!(report.handles_released, 2);
    assert_eq!(history.stats().live_records, 1);
    assert_eq!(history.content("f").unwrap(), b"two");
    assert!(history.changes().is_empty());

    let revisions = history.revisions("f").unwrap();
    assert_eq!(revisions.len(), 1);
    assert!(revisions[0].is_initial());
}

#[test]
fn purge_expired_keeps_recent_history() {
    let mut history = memory_history();
    history.create_file("f", None, 1).unwrap();
    let report = history.purge_expired().unwrap();
    assert_eq!(report.sets_removed, 0);
    assert_eq!(history.changes().len(), 1);
}

#[test]
fn persisted_history_reopens() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, CompressionAlgorithm::Zstd);
    let checkpoint = {
        let mut history = LocalHistory::open(&config).unwrap();
        history.create_directory("proj").unwrap();
        history
            .create_file("proj/main.rs", Some(b"fn main() {}".as_slice()), 10)
            .unwrap();
        let checkpoint = history.put_checkpoint();
        history
            .change_file_content("proj/main.rs", Some(b"fn main() { run() }".as_slice()), 20)
            .unwrap();
        history.close().unwrap();
        checkpoint
    };

    let mut history = LocalHistory::open(&config).unwrap();
    assert_eq!(history.content("proj/main.rs").unwrap(), b"fn main() { run() }");
    assert_eq!(history.revisions("proj/main.rs").unwrap().len(), 2);

    let id = history.create_file("proj/lib.rs", None, 30).unwrap();
    assert!(id.0 > 2);

    history.revert_to_that_state(checkpoint).unwrap();
    assert_eq!(history.content("proj/main.rs").unwrap(), b"fn main() {}");
    assert!(!history.root().has_entry("proj/lib.rs"));
}

#[test]
fn uncompressed_history_reopens() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, CompressionAlgorithm::None);
    {
        let mut history = LocalHistory::open(&config).unwrap();
        history.create_file("note", Some(b"plain".as_slice()), 1).unwrap();
        history.save().unwrap();
    }
    let history = LocalHistory::open(&config).unwrap();
    assert_eq!(history.content("note").unwrap(), b"plain");
    assert!(history.state_path().unwrap().exists());
}

#[test]
fn corrupt_state_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, CompressionAlgorithm::None);
    std::fs::write(config.change_log_path(), b"\xff\xff\xff").unwrap();
    assert!(matches!(
        LocalHistory::open(&config),
        Err(HistoryError::Serialization(_))
    ));
}
