use windows::{
    core::{w, BOOL},
    Win32::{
        Foundation::{HWND, LPARAM, WPARAM},
        UI::WindowsAndMessaging::{
            EnumWindows, FindWindowExW, FindWindowW, GetSystemMetrics, SendMessageTimeoutW,
            SMTO_NORMAL, SM_CXSCREEN, SM_CYSCREEN,
        },
    },
};

use crate::{info, warn};

pub fn primary_display_size() -> (i32, i32) {
    unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) }
}

/// Resolves the desktop window that hosts the wallpaper layer: the WorkerW
/// sibling that the shell keeps behind the icon view. Returns `None` only
/// when Progman itself is missing (non-standard shell); callers then skip
/// reparenting and run as a bottom-most floating window.
pub fn locate_wallpaper_host() -> Option<HWND> {
    unsafe {
        let progman = FindWindowW(w!("Progman"), None).ok()?;
        info!("[LPV][HOST] Progman={:?}", progman);

        // Ask the shell to spawn the WorkerW layer. Implementations disagree
        // on the wParam (0 and 0xD are both in the wild); send both with a
        // bounded wait so a hung shell degrades to the fallback chain.
        let mut spawn_result = 0usize;
        for wparam in [0usize, 0xD] {
            let _ = SendMessageTimeoutW(
                progman,
                0x052C,
                WPARAM(wparam),
                LPARAM(0),
                SMTO_NORMAL,
                1000,
                Some(&mut spawn_result),
            );
        }

        let mut defview_host: Option<HWND> = None;
        unsafe extern "system" fn enum_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
            let out = (lparam.0 as *mut Option<HWND>).as_mut().unwrap();
            if FindWindowExW(Some(hwnd), None, w!("SHELLDLL_DefView"), None).ok().is_some() {
                *out = Some(hwnd);
                return BOOL(0);
            }
            BOOL(1)
        }
        let _ = EnumWindows(
            Some(enum_proc),
            LPARAM((&mut defview_host) as *mut Option<HWND> as isize),
        );

        if let Some(host) = defview_host {
            info!("[LPV][HOST] DefView host={:?}", host);

            if let Some(workerw) = FindWindowExW(None, Some(host), w!("WorkerW"), None).ok() {
                info!("[LPV][HOST] WorkerW sibling selected={:?}", workerw);
                return Some(workerw);
            }

            if let Some(workerw) = FindWindowExW(Some(progman), None, w!("WorkerW"), None).ok() {
                info!("[LPV][HOST] WorkerW under Progman selected={:?}", workerw);
                return Some(workerw);
            }

            warn!("[LPV][HOST] No WorkerW found; using DefView host as fallback");
            return Some(host);
        }

        if let Some(workerw) = FindWindowExW(Some(progman), None, w!("WorkerW"), None).ok() {
            warn!("[LPV][HOST] No DefView host; fallback WorkerW selected={:?}", workerw);
            return Some(workerw);
        }

        warn!("[LPV][HOST] Final fallback to Progman");
        Some(progman)
    }
}
