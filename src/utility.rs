use std::{
    env,
    ffi::OsStr,
    os::windows::ffi::OsStrExt,
    path::{Path, PathBuf},
};

pub fn to_wstring(s: &str) -> Vec<u16> {
    OsStr::new(s)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

/// Directory holding the running executable; the config file and the log
/// file live next to it.
pub fn exe_dir() -> Option<PathBuf> {
    let exe_path = env::current_exe().ok()?;
    exe_path.parent().map(Path::to_path_buf)
}

pub fn path_to_file_uri(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    if normalized.starts_with('/') {
        format!("file://{normalized}")
    } else {
        format!("file:///{normalized}")
    }
}
