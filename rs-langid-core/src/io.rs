use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::{env, io};

use tempfile::NamedTempFile;

/// Reads a whole text file into memory.
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents)
}

/// Writes `bytes` to `path` atomically.
///
/// The data goes to a temporary file in the same directory first, which is
/// then renamed over `path`, so readers never see a partial file.
pub(crate) fn write_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> io::Result<()> {
	let path = path.as_ref();
	let parent = match path.parent() {
		Some(p) if !p.as_os_str().is_empty() => p,
		_ => Path::new("."),
	};
	fs::create_dir_all(parent)?;

	let temp_file = NamedTempFile::new_in(parent)?;
	{
		let mut writer = BufWriter::new(&temp_file);
		writer.write_all(bytes)?;
		writer.flush()?;
	}
	temp_file.persist(path).map_err(|e| e.error)?;
	Ok(())
}

/// Language name of a corpus file: its file stem, which must be valid UTF-8.
pub(crate) fn language_name<P: AsRef<Path>>(corpus_path: P) -> io::Result<String> {
	let path = corpus_path.as_ref();
	match path.file_stem().map(|stem| stem.to_str()) {
		Some(Some(name)) if !name.trim().is_empty() => Ok(name.to_owned()),
		Some(_) => Err(io::Error::new(
			io::ErrorKind::InvalidData,
			format!("{} does not name a language", path.display()),
		)),
		None => Err(io::Error::new(io::ErrorKind::InvalidInput, format!("{} has no file name", path.display()))),
	}
}

/// Corpus directory to scan: an empty path, `.` or `./` is the working directory.
pub(crate) fn resolve_folder(dir: &Path) -> PathBuf {
	if dir.as_os_str().is_empty() || dir == Path::new(".") {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		dir.to_path_buf()
	}
}

/// Lists all files with a given extension in a directory, sorted by name.
///
/// Returns file names only (no paths).
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	// read_dir order is platform dependent, letter ids depend on training order
	files.sort();
	Ok(files)
}
