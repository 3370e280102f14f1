use std::ffi::c_void;

use windows::Win32::UI::WindowsAndMessaging::{
    SystemParametersInfoW, SPIF_SENDCHANGE, SPIF_UPDATEINIFILE, SPI_GETDESKWALLPAPER,
    SPI_SETDESKWALLPAPER, SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS,
};

use crate::{info, utility::to_wstring};

const WALLPAPER_PATH_CAPACITY: usize = 260;

/// Reads the user's current static wallpaper path from the per-user desktop
/// settings. An empty string means no wallpaper is set.
pub fn current_wallpaper() -> Result<String, String> {
    unsafe {
        let mut buf = [0u16; WALLPAPER_PATH_CAPACITY];
        SystemParametersInfoW(
            SPI_GETDESKWALLPAPER,
            buf.len() as u32,
            Some(buf.as_mut_ptr() as *mut c_void),
            SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
        )
        .map_err(|e| format!("SystemParametersInfoW(SPI_GETDESKWALLPAPER) failed: {e:?}"))?;

        let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
        Ok(String::from_utf16_lossy(&buf[..len]))
    }
}

/// Writes the desktop wallpaper path, persisting it to the user profile and
/// broadcasting the change. An empty path clears to the default blank
/// wallpaper.
pub fn set_wallpaper(path: &str) -> Result<(), String> {
    info!("[LPV][WALL] Setting wallpaper: '{}'", path);
    unsafe {
        let mut wide = to_wstring(path);
        SystemParametersInfoW(
            SPI_SETDESKWALLPAPER,
            0,
            Some(wide.as_mut_ptr() as *mut c_void),
            SPIF_UPDATEINIFILE | SPIF_SENDCHANGE,
        )
        .map_err(|e| format!("SystemParametersInfoW(SPI_SETDESKWALLPAPER) failed: {e:?} (path: '{path}')"))
    }
}
