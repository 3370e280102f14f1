use std::{ffi::c_void, path::Path, ptr, sync::OnceLock};

use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
        Graphics::Gdi::{
            GetDC, ReleaseDC, SetStretchBltMode, StretchDIBits, BITMAPINFO, BITMAPINFOHEADER,
            BI_RGB, COLORONCOLOR, DIB_RGB_COLORS, SRCCOPY,
        },
        System::LibraryLoader::GetModuleHandleW,
        UI::WindowsAndMessaging::{
            CreateWindowExW, DefWindowProcW, DestroyWindow, GetClientRect, GetWindowLongW,
            RegisterClassW, SetParent, SetWindowLongW, SetWindowPos, GWL_STYLE, HWND_BOTTOM,
            SWP_FRAMECHANGED, SWP_NOACTIVATE, SWP_SHOWWINDOW, WINDOW_EX_STYLE, WINDOW_STYLE,
            WNDCLASSW, WS_CHILD, WS_CLIPCHILDREN, WS_CLIPSIBLINGS, WS_EX_NOACTIVATE,
            WS_EX_TOOLWINDOW, WS_POPUP, WS_VISIBLE,
        },
    },
};

use crate::{
    commands::Command,
    config::PlayerConfig,
    desktop_host, error, info,
    playback::{FramePoll, Player, VideoFrame},
    session::Session,
    wallpaper_store, warn,
};

const SURFACE_CLASS_NAME: PCWSTR = w!("LpvWallpaperSurface");

/// What the owning event loop should do after a command was applied.
pub enum LoopDirective {
    Continue,
    Quit,
}

/// The wallpaper surface and everything it owns: the Win32 window embedded
/// under the desktop host, the media player, and the session state. All of
/// it lives on the UI thread; commands arrive here after crossing the
/// listener channel.
pub struct WallpaperWindow {
    hwnd: HWND,
    player: Option<Player>,
    session: Session,
}

impl WallpaperWindow {
    /// Builds the window and starts playback. The original wallpaper path
    /// is captured first, before anything on the desktop is touched; a
    /// failed capture is logged and recorded as empty, never fatal. A
    /// missing desktop host or an undecodable file degrade (floating
    /// window / decoder-less session) instead of failing construction.
    pub fn new(video_path: &str, config: &PlayerConfig) -> Result<Self, String> {
        let original_wallpaper = match wallpaper_store::current_wallpaper() {
            Ok(path) => {
                info!("[LPV][WALL] Captured original wallpaper: '{}'", path);
                path
            }
            Err(e) => {
                warn!("[LPV][WALL] Failed to read current wallpaper: {}", e);
                String::new()
            }
        };

        ensure_surface_class()?;

        let (width, height) = desktop_host::primary_display_size();
        let hwnd = create_wallpaper_surface(width, height)?;
        info!("[LPV][UI] Wallpaper surface created: {:?} ({}x{})", hwnd, width, height);

        match desktop_host::locate_wallpaper_host() {
            Some(host) => match embed_under_host(hwnd, host, width, height) {
                Ok(()) => info!("[LPV][UI] Surface embedded under desktop host {:?}", host),
                Err(e) => {
                    warn!("[LPV][UI] {}; continuing as a floating window", e);
                    pin_to_bottom(hwnd, width, height);
                }
            },
            None => {
                warn!("[LPV][UI] Desktop host not found; continuing as a floating window");
                pin_to_bottom(hwnd, width, height);
            }
        }

        let player = match Player::open(Path::new(video_path), config.volume) {
            Ok(player) => Some(player),
            Err(e) => {
                error!("[LPV][MEDIA] Failed to open '{}': {}", video_path, e);
                None
            }
        };

        let session = Session::new(
            video_path.to_string(),
            original_wallpaper,
            config.volume,
            config.frame_rate,
        );
        info!(
            "[LPV][LIFE] Session started for '{}' at {} ms/frame",
            session.video_path,
            session.frame_interval().as_millis()
        );

        Ok(Self {
            hwnd,
            player,
            session,
        })
    }

    pub fn frame_interval(&self) -> std::time::Duration {
        self.session.frame_interval()
    }

    /// One frame-pump tick. Does nothing while paused, stopping, or
    /// decoder-less. End-of-stream seeks back to zero so the video loops;
    /// decode and present errors are logged and the next tick retries.
    pub fn pump_frame(&mut self) {
        if !self.session.should_pump() {
            return;
        }
        let Some(player) = self.player.as_mut() else {
            return;
        };

        match player.poll_frame() {
            FramePoll::Frame(frame) => {
                if let Err(e) = present_frame(self.hwnd, &frame) {
                    warn!("[LPV][RENDER] {}", e);
                }
            }
            FramePoll::EndOfStream => {
                if let Err(e) = player.seek_to_start() {
                    warn!("[LPV][MEDIA] {}", e);
                }
            }
            FramePoll::Pending => {}
        }
    }

    /// Parses and applies one control line. Every outcome, including a
    /// malformed payload, answers with a single status line on stdout;
    /// nothing here can fail past the diagnostics.
    pub fn handle_line(&mut self, line: &str) -> LoopDirective {
        match Command::parse(line) {
            Ok(command) => self.apply(command),
            Err(e) => {
                println!("{}", e.usage());
                LoopDirective::Continue
            }
        }
    }

    pub fn apply(&mut self, command: Command) -> LoopDirective {
        match command {
            Command::Play => {
                if !self.session.is_alive() {
                    println!("Wallpaper already removed.");
                    return LoopDirective::Continue;
                }
                match self.session.play() {
                    Some(volume) => {
                        if let Some(player) = &self.player {
                            player.set_volume(volume);
                        }
                        println!("Playing video and audio.");
                    }
                    None => println!("Already playing."),
                }
            }
            Command::Pause => {
                if !self.session.is_alive() {
                    println!("Wallpaper already removed.");
                    return LoopDirective::Continue;
                }
                let live_volume = self
                    .player
                    .as_ref()
                    .map(|p| p.volume())
                    .unwrap_or(self.session.current_volume());
                if self.session.pause(live_volume) {
                    if let Some(player) = &self.player {
                        player.set_volume(0.0);
                    }
                    println!("Pausing video and muting audio.");
                } else {
                    println!("Already paused.");
                }
            }
            Command::SetVolume(level) => {
                if !self.session.is_alive() {
                    println!("Wallpaper already removed.");
                    return LoopDirective::Continue;
                }
                let applied = self.session.set_volume(level);
                if let Some(player) = &self.player {
                    player.set_volume(applied);
                }
                println!("Setting volume to {applied}.");
            }
            Command::SetFrameRate(rate) => {
                if !self.session.is_alive() {
                    println!("Wallpaper already removed.");
                    return LoopDirective::Continue;
                }
                match self.session.set_frame_rate(rate) {
                    Some(interval) => {
                        println!("Setting frame rate to {rate} fps.");
                        println!(
                            "Frame rate set to {rate} fps (Interval: {} ms).",
                            interval.as_millis()
                        );
                    }
                    None => println!("Frame rate must be greater than 0."),
                }
            }
            Command::Remove => {
                self.teardown();
                println!("Removing video wallpaper.");
            }
            Command::Exit => {
                self.teardown();
                println!("Exiting application.");
                return LoopDirective::Quit;
            }
            Command::Unknown(line) => {
                info!("[LPV][CMD] Unknown command line: '{}'", line);
                println!("Unknown command.");
            }
        }

        LoopDirective::Continue
    }

    /// Shared Remove/Exit path: stop the pump, release the decoder, restore
    /// the captured wallpaper, destroy the window. Only the first call does
    /// any of it; Exit after Remove just quits the loop.
    pub fn teardown(&mut self) {
        if !self.session.begin_teardown() {
            info!("[LPV][LIFE] Teardown already completed");
            return;
        }

        if let Some(mut player) = self.player.take() {
            player.close();
        }

        restore_original_wallpaper(&self.session.original_wallpaper);

        unsafe {
            if let Err(e) = DestroyWindow(self.hwnd) {
                warn!("[LPV][UI] DestroyWindow failed: {:?}", e);
            }
        }

        info!("[LPV][LIFE] Teardown complete for '{}'", self.session.video_path);
    }
}

fn restore_original_wallpaper(original: &str) {
    if original.is_empty() {
        println!("No original wallpaper found. Setting default blank wallpaper.");
        if let Err(e) = wallpaper_store::set_wallpaper("") {
            warn!("[LPV][WALL] {}", e);
        }
    } else {
        println!("Restoring original wallpaper: {original}");
        if let Err(e) = wallpaper_store::set_wallpaper(original) {
            warn!("[LPV][WALL] {}", e);
        }
    }
}

fn ensure_surface_class() -> Result<(), String> {
    static CLASS_ONCE: OnceLock<bool> = OnceLock::new();
    if CLASS_ONCE.get().is_some() {
        return Ok(());
    }

    let hinstance = unsafe {
        GetModuleHandleW(None)
            .map(|h| HINSTANCE(h.0))
            .map_err(|e| format!("GetModuleHandleW failed: {e:?}"))?
    };

    let wc = WNDCLASSW {
        lpfnWndProc: Some(surface_window_proc),
        hInstance: hinstance,
        lpszClassName: SURFACE_CLASS_NAME,
        ..Default::default()
    };

    unsafe {
        let _ = RegisterClassW(&wc);
    }

    let _ = CLASS_ONCE.set(true);
    Ok(())
}

unsafe extern "system" fn surface_window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    DefWindowProcW(hwnd, msg, wparam, lparam)
}

/// Creates the frameless, tool-style, no-activate surface as a hidden
/// top-level window. Reparenting (or the floating fallback) shows it.
fn create_wallpaper_surface(width: i32, height: i32) -> Result<HWND, String> {
    let style = WINDOW_STYLE((WS_POPUP | WS_CLIPSIBLINGS | WS_CLIPCHILDREN).0);
    let ex_style = WINDOW_EX_STYLE((WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE).0);

    let hinstance = unsafe {
        GetModuleHandleW(None)
            .map(|h| HINSTANCE(h.0))
            .map_err(|e| format!("GetModuleHandleW failed: {e:?}"))?
    };

    let hwnd = unsafe {
        CreateWindowExW(
            ex_style,
            SURFACE_CLASS_NAME,
            PCWSTR::null(),
            style,
            0,
            0,
            width,
            height,
            None,
            None,
            Some(hinstance),
            Some(ptr::null()),
        )
    }
    .map_err(|e| format!("CreateWindowExW failed: {e:?}"))?;

    Ok(hwnd)
}

/// Converts the surface to a child window and hangs it under the desktop
/// host, pinned to the bottom of the sibling order.
fn embed_under_host(hwnd: HWND, host: HWND, width: i32, height: i32) -> Result<(), String> {
    unsafe {
        let style = GetWindowLongW(hwnd, GWL_STYLE) as u32;
        let new_style = (style & !WS_POPUP.0) | WS_CHILD.0 | WS_VISIBLE.0;
        let _ = SetWindowLongW(hwnd, GWL_STYLE, new_style as i32);

        SetParent(hwnd, Some(host)).map_err(|e| format!("SetParent failed: {e:?}"))?;

        if SetWindowPos(
            hwnd,
            Some(HWND_BOTTOM),
            0,
            0,
            width,
            height,
            SWP_NOACTIVATE | SWP_SHOWWINDOW | SWP_FRAMECHANGED,
        )
        .is_err()
        {
            return Err("SetWindowPos failed after reparenting".to_string());
        }
    }

    Ok(())
}

/// Degraded mode: no desktop host, so the surface stays a top-level window
/// kept below every sibling.
fn pin_to_bottom(hwnd: HWND, width: i32, height: i32) {
    unsafe {
        if SetWindowPos(
            hwnd,
            Some(HWND_BOTTOM),
            0,
            0,
            width,
            height,
            SWP_NOACTIVATE | SWP_SHOWWINDOW,
        )
        .is_err()
        {
            warn!("[LPV][UI] SetWindowPos failed for floating surface");
        }
    }
}

/// Blits one BGRx frame onto the surface, stretched to the current client
/// rectangle.
fn present_frame(hwnd: HWND, frame: &VideoFrame) -> Result<(), String> {
    unsafe {
        let mut client = RECT::default();
        GetClientRect(hwnd, &mut client)
            .map_err(|e| format!("GetClientRect failed: {e:?}"))?;
        let dest_width = (client.right - client.left).max(1);
        let dest_height = (client.bottom - client.top).max(1);

        let hdc = GetDC(Some(hwnd));
        if hdc.is_invalid() {
            return Err("GetDC failed for wallpaper surface".to_string());
        }

        let bmi = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: frame.width as i32,
                biHeight: -(frame.height as i32), // negative for top-down rows
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                biSizeImage: 0,
                biXPelsPerMeter: 0,
                biYPelsPerMeter: 0,
                biClrUsed: 0,
                biClrImportant: 0,
            },
            bmiColors: [Default::default()],
        };

        SetStretchBltMode(hdc, COLORONCOLOR);
        let scanlines = StretchDIBits(
            hdc,
            0,
            0,
            dest_width,
            dest_height,
            0,
            0,
            frame.width as i32,
            frame.height as i32,
            Some(frame.data.as_ptr() as *const c_void),
            &bmi,
            DIB_RGB_COLORS,
            SRCCOPY,
        );
        ReleaseDC(Some(hwnd), hdc);

        if scanlines == 0 {
            return Err("StretchDIBits drew no scanlines".to_string());
        }
    }

    Ok(())
}
