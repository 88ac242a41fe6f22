//! Common test utilities for samtools-mcp integration tests.
//!
//! Provides `StubSamtools`: a shell-script stand-in for the real samtools
//! binary that records every argv it receives and emits canned output per
//! subcommand, so tests exercise the full dispatch path without samtools
//! installed.

#![allow(dead_code)] // Test utilities may not all be used in every test file
#![cfg(unix)]

use samtools_mcp::SamtoolsRunner;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tempfile::TempDir;

/// A fake samtools binary living in a temp directory.
pub struct StubSamtools {
    pub dir: TempDir,
    bin: PathBuf,
    log: PathBuf,
}

impl StubSamtools {
    /// Creates a stub that succeeds with canned per-subcommand output.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let log = dir.path().join("calls.log");
        let script = format!(
            r#"#!/bin/sh
printf '%s\n' "$*" >> "{log}"
case "$1" in
--version)
    echo "samtools 1.19 (test stub)"
    echo "Using htslib 1.19"
    ;;
--help)
    echo "Usage: samtools <command> [options]"
    ;;
view)
    if [ "$2" = "-c" ]; then echo 42; fi
    if [ "$2" = "--help" ]; then echo "Usage: samtools view [options]"; fi
    ;;
flagstat)
    printf '10 + 0 in total (QC-passed reads + QC-failed reads)\n'
    printf '10 + 0 mapped (100.00%% : N/A)\n'
    ;;
idxstats)
    printf 'chr1\t248956422\t8\t0\n'
    printf '*\t0\t0\t2\n'
    ;;
depth)
    printf 'chr1\t1\t3\nchr1\t2\t4\nchr1\t3\t4\n'
    ;;
faidx)
    case "$*" in
    *chr*) printf '>chr1:1-8\nACGTACGT\n' ;;
    esac
    ;;
*)
    ;;
esac
"#,
            log = log.display()
        );
        let bin = write_script(&dir, "samtools-stub", &script);
        Self { dir, bin, log }
    }

    /// Creates a stub that always fails like a truncated BAM would.
    pub fn failing() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let log = dir.path().join("calls.log");
        let script = format!(
            r#"#!/bin/sh
printf '%s\n' "$*" >> "{log}"
echo '[E::hts_open_format] Failed to open file' >&2
exit 2
"#,
            log = log.display()
        );
        let bin = write_script(&dir, "samtools-stub", &script);
        Self { dir, bin, log }
    }

    /// Creates a stub that fails but reports the problem on stdout only,
    /// like samtools subcommands that print usage errors there.
    pub fn failing_stdout() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let log = dir.path().join("calls.log");
        let script = format!(
            r#"#!/bin/sh
printf '%s\n' "$*" >> "{log}"
echo 'region "chr99" specifies an unknown reference name'
exit 1
"#,
            log = log.display()
        );
        let bin = write_script(&dir, "samtools-stub", &script);
        Self { dir, bin, log }
    }

    /// A runner wired to the stub binary.
    pub fn runner(&self) -> SamtoolsRunner {
        SamtoolsRunner::new(self.bin.clone())
    }

    /// The stub binary path as a string, for command-echo assertions.
    pub fn bin_str(&self) -> String {
        self.bin.to_string_lossy().into_owned()
    }

    /// Every argv line the stub has received, in call order.
    pub fn calls(&self) -> Vec<String> {
        match fs::read_to_string(&self.log) {
            Ok(content) => content.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Writes a file into the stub's temp directory and returns its path
    /// as a string, for use as a tool input_file.
    pub fn write_file(&self, name: &str, content: &[u8]) -> String {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write test file");
        path.to_string_lossy().into_owned()
    }

    /// A path inside the stub's temp directory (not created).
    pub fn path(&self, name: &str) -> String {
        self.dir.path().join(name).to_string_lossy().into_owned()
    }
}

impl Default for StubSamtools {
    fn default() -> Self {
        Self::new()
    }
}

fn write_script(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write stub script");
    let mut perms = fs::metadata(&path).expect("stat stub script").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod stub script");
    path
}
