#![allow(dead_code)]

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use genome_windows::partition::{read_lift, read_sizes};
use genome_windows::GenomePartition;

fn snapshot_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("snapshots")
}

pub fn data_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

pub fn assert_snapshot(name: &str, actual: &str) {
    let path = snapshot_root().join(name);
    if std::env::var("GENOME_WINDOWS_UPDATE_SNAPSHOTS").is_ok() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create snapshot directory");
        }
        fs::write(&path, actual).expect("write snapshot");
        return;
    }

    let expected =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("snapshot {:?} not found", path));
    if normalize(&expected) != normalize(actual) {
        panic!(
            "Snapshot mismatch for {:?}. Set GENOME_WINDOWS_UPDATE_SNAPSHOTS=1 to regenerate.\nExpected:\n{}\nActual:\n{}",
            path,
            expected,
            actual
        );
    }
}

fn normalize(input: &str) -> String {
    input.replace("\r\n", "\n")
}

/// Partition of the `mixed` fixture: lifted gaps, an unplaced scaffold and
/// a skipped mitochondrion.
pub fn mixed_partition() -> GenomePartition {
    let sizes = read_sizes(BufReader::new(
        File::open(data_path("mixed.sizes")).expect("open sizes fixture"),
    ))
    .expect("sizes fixture parses");
    let lift = read_lift(BufReader::new(
        File::open(data_path("mixed.lift")).expect("open lift fixture"),
    ))
    .expect("lift fixture parses");

    GenomePartition::builder()
        .window_size(400)
        .overlap(50)
        .max_gap(10)
        .min_unplaced_size(100)
        .unplaced(["chrUn_*"])
        .skip(["chrM"])
        .lift(lift)
        .build(sizes)
        .expect("fixture partitions")
}
