/// Fails unless `path` exists.
///
/// # Arguments
/// * `path` - Input file or directory given on the command line.
pub fn check_path<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(anyhow::anyhow!("Input path does not exist: {}", path.display()));
    }
    anyhow::Ok(())
}

/// Creates the parent directory of `path` if it is missing.
pub fn ensure_parent_dir_exist<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    anyhow::Ok(())
}

/// Lists files in `dir` with the given extension, sorted by path.
pub fn files_with_extension<P: AsRef<std::path::Path>>(
    dir: P,
    extension: &str,
) -> anyhow::Result<Vec<std::path::PathBuf>> {
    let mut paths = std::fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .map_or(false, |ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect::<Vec<_>>();
    paths.sort();
    anyhow::Ok(paths)
}

/// Output page path for `input` inside `output_dir`: `<output_dir>/<stem>.html`.
pub fn html_path_for<P: AsRef<std::path::Path>, Q: AsRef<std::path::Path>>(
    input: P,
    output_dir: Q,
) -> anyhow::Result<std::path::PathBuf> {
    let stem = input
        .as_ref()
        .file_stem()
        .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", input.as_ref().display()))?;
    anyhow::Ok(output_dir.as_ref().join(format!("{}.html", stem.to_string_lossy())))
}
