//! Atomic replacement of the state file.
//!
//! Contents are written to a hidden temporary sibling, synced, then renamed
//! over the target so readers never observe a partial file.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Component, Utf8Path};
use cap_std::fs::{Dir, OpenOptions};

use crate::domain::ports::ClientStateStoreError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replace `path` inside `dir` with `contents`.
///
/// # Errors
///
/// Returns [`ClientStateStoreError::Io`] when `path` is not a bare file name
/// or any filesystem step fails. The temporary file is removed on failure.
pub(crate) fn write_atomic(
    dir: &Dir,
    path: &Utf8Path,
    contents: &str,
) -> Result<(), ClientStateStoreError> {
    let mut components = path.components();
    let (Some(Utf8Component::Normal(file_name)), None) = (components.next(), components.next())
    else {
        return Err(ClientStateStoreError::io(format!(
            "state path {path} must be a bare file name"
        )));
    };
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(".{file_name}.tmp.{}.{nanos}.{counter}", std::process::id());

    if let Err(err) = write_temp(dir, &tmp_name, contents) {
        discard(dir, &tmp_name);
        return Err(ClientStateStoreError::io(format!("writing {tmp_name}: {err}")));
    }
    if let Err(err) = dir.rename(&tmp_name, dir, file_name) {
        discard(dir, &tmp_name);
        return Err(ClientStateStoreError::io(format!("replacing {path}: {err}")));
    }
    if dir.open(".").and_then(|parent| parent.sync_all()).is_err() {
        // Directory sync is best effort.
    }
    Ok(())
}

fn write_temp(dir: &Dir, tmp_name: &str, contents: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

fn discard(dir: &Dir, tmp_name: &str) {
    if dir.remove_file(tmp_name).is_err() {
        // Nothing left to clean up.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cap_std::ambient_authority;

    fn temp_dir() -> (tempfile::TempDir, Dir) {
        let temp = tempfile::tempdir().expect("temp dir");
        let dir = Dir::open_ambient_dir(temp.path(), ambient_authority()).expect("open dir");
        (temp, dir)
    }

    #[test]
    fn replaces_existing_contents_without_leaving_temp_files() {
        let (_temp, dir) = temp_dir();
        let path = Utf8Path::new("client-state.json");
        write_atomic(&dir, path, "{\"a\":1}").expect("first write");
        write_atomic(&dir, path, "{\"a\":2}").expect("second write");

        assert_eq!(dir.read_to_string(path).expect("read"), "{\"a\":2}");
        let names: Vec<String> = dir
            .entries()
            .expect("entries")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["client-state.json".to_owned()]);
    }

    #[test]
    fn nested_paths_are_rejected() {
        let (_temp, dir) = temp_dir();
        let err = write_atomic(&dir, Utf8Path::new("nested/state.json"), "{}")
            .expect_err("nested path");
        assert!(matches!(err, ClientStateStoreError::Io { .. }));
    }
}
