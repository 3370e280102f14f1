mod commands;
mod config;
mod desktop_host;
mod logging;
mod playback;
mod session;
mod utility;
mod wallpaper_store;
mod wallpaper_window;

use std::{
	path::PathBuf,
	sync::mpsc,
	thread,
	time::{Duration, Instant},
};
use windows::Win32::UI::HiDpi::{
	SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
};
use windows::Win32::UI::WindowsAndMessaging::{
	DispatchMessageW, PeekMessageW, TranslateMessage, MSG, PM_REMOVE, WM_QUIT,
};

use crate::{
	commands::spawn_listener,
	config::PlayerConfig,
	wallpaper_window::{LoopDirective, WallpaperWindow},
};

pub const APP_NAME: &str = "lpv-wallpaper";
pub const DEBUG_NAME: &str = "LPV";

fn config_path() -> PathBuf {
	utility::exe_dir()
		.map(|dir| dir.join("config.yaml"))
		.unwrap_or_else(|| PathBuf::from("config.yaml"))
}

fn enable_per_monitor_dpi_awareness() {
	unsafe {
		if SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2).is_err() {
			warn!(
				"[{}] Failed to set process DPI awareness to PerMonitorV2; the surface may be scaled",
				DEBUG_NAME
			);
		}
	}
}

fn main() -> windows::core::Result<()> {
	let Some(video_path) = std::env::args().nth(1) else {
		println!("Please provide a video file as an argument.");
		println!("Usage: {} <video-path>", APP_NAME);
		return Ok(());
	};

	let config_path = config_path();
	let config = PlayerConfig::load(&config_path).unwrap_or_default();
	logging::init(config.debug, &config.log_level);

	std::panic::set_hook(Box::new(|panic_info| {
		error!("[{}] Panic: {}", DEBUG_NAME, panic_info);
	}));

	info!("!---------- [{}] Starting video wallpaper ----------!", DEBUG_NAME);
	info!("[{}] Config loaded from {}", DEBUG_NAME, config_path.display());
	enable_per_monitor_dpi_awareness();

	let mut window = match WallpaperWindow::new(&video_path, &config) {
		Ok(window) => window,
		Err(e) => {
			error!("[{}] Failed to initialize the wallpaper window: {}", DEBUG_NAME, e);
			return Ok(());
		}
	};

	let (tx, rx) = mpsc::channel::<String>();
	let _listener = spawn_listener(tx);

	let loop_sleep = Duration::from_millis(config.tick_sleep_ms.max(1));
	let mut last_pump = Instant::now();

	loop {
		unsafe {
			let mut msg = MSG::default();
			while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
				if msg.message == WM_QUIT {
					warn!("[{}] WM_QUIT received, tearing down", DEBUG_NAME);
					window.teardown();
					return Ok(());
				}
				let _ = TranslateMessage(&msg);
				DispatchMessageW(&msg);
			}
		}

		while let Ok(line) = rx.try_recv() {
			if let LoopDirective::Quit = window.handle_line(&line) {
				info!("[{}] Exit requested, stopping event loop", DEBUG_NAME);
				return Ok(());
			}
		}

		if last_pump.elapsed() >= window.frame_interval() {
			last_pump = Instant::now();
			window.pump_frame();
		}

		thread::sleep(loop_sleep);
	}
}
