// Transient workspace for compiled snippets and retained preview files

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, TempDir};

/// Per-execution scratch directory
///
/// Every artifact the compiled pipeline produces (source file, binary,
/// `.class` files) lives inside this directory. Dropping the `Scratch`
/// removes the directory and everything in it, on every exit path.
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    pub fn new() -> io::Result<Self> {
        let dir = Builder::new().prefix("blockrun-").tempdir()?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Write `code` to a uniquely named file with the given suffix
    ///
    /// Uniqueness comes from the tempfile allocator; the file stays inside
    /// the scratch dir so cleanup is covered by the directory drop.
    pub fn write_source(&self, suffix: &str, code: &str) -> io::Result<PathBuf> {
        let mut file = Builder::new()
            .prefix("snippet-")
            .suffix(suffix)
            .tempfile_in(self.dir.path())?;
        file.write_all(code.as_bytes())?;
        file.flush()?;
        let (_handle, path) = file.keep().map_err(|e| e.error)?;
        Ok(path)
    }

    /// Rename an allocated file within the scratch dir
    ///
    /// Used for toolchains that mandate an identifier-derived filename
    /// (javac). Fails if the target already exists.
    pub fn rename(&self, path: &Path, file_name: &str) -> io::Result<PathBuf> {
        let target = self.dir.path().join(file_name);
        if target.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("target already exists: {}", target.display()),
            ));
        }
        std::fs::rename(path, &target)?;
        Ok(target)
    }
}

/// Write a markup snippet to a retained temp file for preview
///
/// Unlike scratch artifacts this file is deliberately never deleted: it has
/// to stay viewable after the request returns.
pub fn persist_preview(code: &str) -> io::Result<PathBuf> {
    let mut file = Builder::new().prefix("preview-").suffix(".html").tempfile()?;
    file.write_all(code.as_bytes())?;
    file.flush()?;
    let (_handle, path) = file.keep().map_err(|e| e.error)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_source_lands_in_scratch_dir() {
        let scratch = Scratch::new().unwrap();
        let path = scratch.write_source(".c", "int main() { return 0; }").unwrap();

        assert!(path.starts_with(scratch.dir()));
        assert_eq!(path.extension().unwrap(), "c");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "int main() { return 0; }"
        );
    }

    #[test]
    fn test_scratch_drop_removes_all_artifacts() {
        let scratch = Scratch::new().unwrap();
        let src = scratch.write_source(".cpp", "// code").unwrap();
        let extra = scratch.dir().join("a.out");
        std::fs::write(&extra, b"binary").unwrap();
        let dir = scratch.dir().to_path_buf();

        drop(scratch);

        assert!(!src.exists());
        assert!(!extra.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn test_rename_within_scratch() {
        let scratch = Scratch::new().unwrap();
        let src = scratch.write_source(".java", "class Main {}").unwrap();
        let renamed = scratch.rename(&src, "Main.java").unwrap();

        assert!(!src.exists());
        assert!(renamed.exists());
        assert_eq!(renamed.file_name().unwrap(), "Main.java");
    }

    #[test]
    fn test_rename_refuses_existing_target() {
        let scratch = Scratch::new().unwrap();
        let first = scratch.write_source(".java", "class Main {}").unwrap();
        let _taken = scratch.rename(&first, "Main.java").unwrap();

        let second = scratch.write_source(".java", "class Main { int x; }").unwrap();
        let err = scratch.rename(&second, "Main.java").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_preview_file_is_retained() {
        let path = persist_preview("<h1>hi</h1>").unwrap();
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<h1>hi</h1>");
        // Retention is the contract; remove manually so tests stay tidy.
        std::fs::remove_file(path).unwrap();
    }
}
