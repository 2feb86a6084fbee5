use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Per-project worker arguments, looked up in the working directory.
pub const CUSTOM_ARGS_FILE: &str = "infinitest.args";

/// Arguments from `<working_directory>/infinitest.args`; empty when the file is absent.
pub fn read_custom_arguments(working_directory: &Path) -> Vec<String> {
    let path = working_directory.join(CUSTOM_ARGS_FILE);
    match fs::read_to_string(&path) {
        Ok(contents) => {
            let args = parse_custom_arguments(&contents);
            log::debug!("Read {} custom arguments from {}", args.len(), path.display());
            args
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
        Err(err) => {
            log::warn!("Failed to read {}: {err}", path.display());
            Vec::new()
        }
    }
}

/// One or more whitespace-separated arguments per line; blank lines are skipped.
pub fn parse_custom_arguments(contents: &str) -> Vec<String> {
    contents
        .lines()
        .flat_map(str::split_whitespace)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn splits_lines_and_whitespace() {
        let args = parse_custom_arguments("-Xdebug\n\n  -Dfoo=bar   -ea \r\n");
        assert_eq!(args, vec!["-Xdebug", "-Dfoo=bar", "-ea"]);
    }

    #[test]
    fn missing_file_yields_nothing() {
        let temp = tempdir().unwrap();
        assert!(read_custom_arguments(temp.path()).is_empty());

        fs::write(temp.path().join(CUSTOM_ARGS_FILE), "-Xmx1g").unwrap();
        assert_eq!(read_custom_arguments(temp.path()), vec!["-Xmx1g"]);
    }
}
