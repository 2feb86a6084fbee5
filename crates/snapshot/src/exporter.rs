use crate::target::{CollisionPolicy, SnapshotTarget};
use crate::{Result, SnapshotError};
use impact_protocol::{ChangeSet, PassResponses};
use std::error::Error as _;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Snapshot body for `changes` as answered in `responses`.
///
/// Units without a response are written as empty blocks.
pub fn render(changes: &ChangeSet, responses: &PassResponses) -> String {
    let mut out = String::new();
    for unit in &changes.sorted() {
        out.push_str(&unit.path_string());
        out.push_str("[\n");
        if let Some(affected) = responses.affected_for(unit) {
            for name in affected.sorted() {
                out.push('\t');
                out.push_str(name.as_str());
                out.push_str(",\n");
            }
        }
        out.push_str("]\n");
    }
    out
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotExporter {
    collision: CollisionPolicy,
}

impl SnapshotExporter {
    pub fn new(collision: CollisionPolicy) -> Self {
        Self { collision }
    }

    /// Export stamped with the current time. Failures are logged, never raised.
    pub fn export(
        &self,
        target: &SnapshotTarget,
        changes: &ChangeSet,
        responses: &PassResponses,
    ) -> Option<PathBuf> {
        match self.try_export(target, changes, responses) {
            Ok(path) => Some(path),
            Err(e) => {
                log::error!("Snapshot export failed: {}", error_chain(&e));
                None
            }
        }
    }

    pub fn try_export(
        &self,
        target: &SnapshotTarget,
        changes: &ChangeSet,
        responses: &PassResponses,
    ) -> Result<PathBuf> {
        self.export_at(target, current_unix_ms(), changes, responses)
    }

    /// Export with an explicit timestamp.
    pub fn export_at(
        &self,
        target: &SnapshotTarget,
        timestamp_ms: u64,
        changes: &ChangeSet,
        responses: &PassResponses,
    ) -> Result<PathBuf> {
        if !target.dir().as_os_str().is_empty() {
            fs::create_dir_all(target.dir()).map_err(|source| SnapshotError::CreateDir {
                path: target.dir().to_path_buf(),
                source,
            })?;
        }

        let body = render(changes, responses);
        let (path, file) = self.open_snapshot(target, timestamp_ms)?;
        write_body(file, &body).map_err(|source| SnapshotError::Write {
            path: path.clone(),
            source,
        })?;
        log::info!(
            "Wrote snapshot {} ({} units)",
            path.display(),
            changes.len()
        );
        Ok(path)
    }

    /// Open the file for `timestamp_ms`. Under `Unique` the name is claimed
    /// atomically, so an existing file is never opened.
    fn open_snapshot(&self, target: &SnapshotTarget, timestamp_ms: u64) -> Result<(PathBuf, File)> {
        let write_error = |path: PathBuf, source| SnapshotError::Write { path, source };
        match self.collision {
            CollisionPolicy::Overwrite => {
                let path = target.file_for(timestamp_ms, 0);
                OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(&path)
                    .map(|file| (path.clone(), file))
                    .map_err(|source| write_error(path, source))
            }
            CollisionPolicy::Unique => {
                let mut attempt = 0;
                loop {
                    let path = target.file_for(timestamp_ms, attempt);
                    match OpenOptions::new().write(true).create_new(true).open(&path) {
                        Ok(file) => return Ok((path, file)),
                        Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                        Err(source) => return Err(write_error(path, source)),
                    }
                }
            }
        }
    }
}

fn write_body(file: File, body: &str) -> std::io::Result<()> {
    let mut writer = BufWriter::new(file);
    writer.write_all(body.as_bytes())?;
    writer.flush()
}

fn error_chain(err: &SnapshotError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|dur| u64::try_from(dur.as_millis()).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use impact_protocol::{AffectedSet, ChangeUnit, UnitResponse};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn responses(entries: Vec<(&str, Vec<&str>)>) -> PassResponses {
        let mut pass = PassResponses::new(2);
        for (unit, affected) in entries {
            let affected: AffectedSet = affected.into_iter().collect();
            pass.record(UnitResponse::ok(ChangeUnit::new(unit), affected));
        }
        pass
    }

    #[test]
    fn units_and_affected_names_are_sorted() {
        let changes: ChangeSet = ["z.class", "a.class"].into_iter().map(ChangeUnit::new).collect();
        let pass = responses(vec![("z.class", vec!["y", "x"]), ("a.class", vec!["y", "x"])]);

        assert_eq!(
            render(&changes, &pass),
            "a.class[\n\tx,\n\ty,\n]\nz.class[\n\tx,\n\ty,\n]\n"
        );
    }

    #[test]
    fn missing_and_empty_responses_render_empty_blocks() {
        let changes: ChangeSet = ["a.class", "b.class"].into_iter().map(ChangeUnit::new).collect();
        let mut pass = PassResponses::new(1);
        pass.record(UnitResponse::failed(ChangeUnit::new("a.class"), "boom"));

        assert_eq!(render(&changes, &pass), "a.class[\n]\nb.class[\n]\n");
    }

    #[test]
    fn empty_change_set_renders_nothing() {
        assert_eq!(render(&ChangeSet::new(), &PassResponses::new(1)), "");
    }

    #[test]
    fn overwrite_replaces_same_millisecond_file() {
        let temp = tempdir().unwrap();
        let target = SnapshotTarget::new(temp.path().join("out/snap")).unwrap();
        let exporter = SnapshotExporter::default();
        let changes: ChangeSet = ["a.class"].into_iter().map(ChangeUnit::new).collect();

        let first = exporter
            .export_at(&target, 5, &changes, &responses(vec![("a.class", vec!["T1"])]))
            .unwrap();
        let second = exporter
            .export_at(&target, 5, &changes, &responses(vec![("a.class", vec!["T2"])]))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&second).unwrap(), "a.class[\n\tT2,\n]\n");
    }

    #[test]
    fn unique_policy_suffixes_taken_names() {
        let temp = tempdir().unwrap();
        let target = SnapshotTarget::new(temp.path().join("snap")).unwrap();
        let exporter = SnapshotExporter::new(CollisionPolicy::Unique);
        let changes = ChangeSet::new();
        let pass = PassResponses::new(1);

        let first = exporter.export_at(&target, 9, &changes, &pass).unwrap();
        let second = exporter.export_at(&target, 9, &changes, &pass).unwrap();
        let third = exporter.export_at(&target, 9, &changes, &pass).unwrap();

        assert_eq!(first, temp.path().join("snap9.txt"));
        assert_eq!(second, temp.path().join("snap9-1.txt"));
        assert_eq!(third, temp.path().join("snap9-2.txt"));
    }

    #[test]
    fn unique_policy_leaves_existing_files_untouched() {
        let temp = tempdir().unwrap();
        let target = SnapshotTarget::new(temp.path().join("snap")).unwrap();
        fs::write(temp.path().join("snap7.txt"), "kept").unwrap();
        fs::write(temp.path().join("snap7-1.txt"), "kept too").unwrap();
        let changes: ChangeSet = ["a.class"].into_iter().map(ChangeUnit::new).collect();

        let path = SnapshotExporter::new(CollisionPolicy::Unique)
            .export_at(&target, 7, &changes, &responses(vec![("a.class", vec!["T"])]))
            .unwrap();

        assert_eq!(path, temp.path().join("snap7-2.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "a.class[\n\tT,\n]\n");
        assert_eq!(fs::read_to_string(temp.path().join("snap7.txt")).unwrap(), "kept");
        assert_eq!(fs::read_to_string(temp.path().join("snap7-1.txt")).unwrap(), "kept too");
    }

    #[test]
    fn unwritable_directory_is_logged_not_raised() {
        let temp = tempdir().unwrap();
        let blocker = temp.path().join("taken");
        fs::write(&blocker, b"not a directory").unwrap();
        let target = SnapshotTarget::new(blocker.join("snap")).unwrap();

        let exporter = SnapshotExporter::default();
        let err = exporter
            .try_export(&target, &ChangeSet::new(), &PassResponses::new(1))
            .unwrap_err();
        assert!(matches!(err, SnapshotError::CreateDir { .. }));
        assert!(error_chain(&err).contains("taken"));
        assert_eq!(
            exporter.export(&target, &ChangeSet::new(), &PassResponses::new(1)),
            None
        );
    }
}
