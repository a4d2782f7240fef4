use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Every file below `dir` (recursively) whose extension is one of `extensions`
/// (compared case-insensitively), sorted by path.
pub fn find_files(dir: &Path, extensions: &[&str]) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if has_extension(&path, extensions) {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

/// `file` relocated from `in_dir` to `out_dir`; parent directories are created.
pub fn mirror_path(in_dir: &Path, out_dir: &Path, file: &Path) -> io::Result<PathBuf> {
    let relative = file.strip_prefix(in_dir).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not below {}", file.display(), in_dir.display()),
        )
    })?;
    let target = out_dir.join(relative);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(target)
}
