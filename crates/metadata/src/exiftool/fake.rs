//! A shell stand-in for `exiftool -stay_open True -@ -`.
//!
//! It answers `-ver` with [`VERSION`] and every lookup with the file's stem
//! as the tag value, so `/photos/beach.jpg` yields `beach`. A few stems
//! change the behaviour: `crash` exits mid-request, `slow` answers after two
//! seconds, `empty` prints nothing (as exiftool does for an unreadable file).

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub(crate) const VERSION: &str = "13.00";

const SCRIPT: &str = r#"#!/bin/sh
ver=""
file=""
while IFS= read -r line; do
    case "$line" in
        -stay_open) read -r rest; exit 0 ;;
        -ver) ver=1 ;;
        -execute*)
            id="${line#-execute}"
            if [ -n "$ver" ]; then
                echo "13.00"
            else
                name=$(basename "$file" .jpg)
                case "$name" in
                    crash) exit 3 ;;
                    slow) sleep 2 ;;
                esac
                if [ "$name" != "empty" ]; then
                    printf '[{"SourceFile": "%s", "Keywords": "%s"}]\n' "$file" "$name"
                fi
            fi
            echo "{ready$id}"
            ver=""
            file=""
            ;;
        -*) ;;
        *) file="$line" ;;
    esac
done
"#;

/// Write the script into `dir` and make it executable.
pub(crate) fn script(dir: &Path) -> PathBuf {
    let path = dir.join("exiftool");
    std::fs::write(&path, SCRIPT).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
