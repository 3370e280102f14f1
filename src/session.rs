use std::time::Duration;

/// Pump interval for a requested frame rate; `None` rejects rates <= 0.
pub fn interval_for_rate(rate: i32) -> Option<Duration> {
    if rate <= 0 {
        return None;
    }
    let ms = (1000.0 / rate as f64).round().max(1.0) as u64;
    Some(Duration::from_millis(ms))
}

/// Playback and lifecycle state for one wallpaper run. Owned by the
/// wallpaper window and only ever touched from the UI loop; everything in
/// here is pure state so the transitions can be exercised without a window
/// or a decoder.
///
/// `original_wallpaper` is captured exactly once, before the desktop is
/// touched, and is the only path the teardown restore will ever use.
pub struct Session {
    pub video_path: String,
    pub original_wallpaper: String,
    is_playing: bool,
    current_volume: f64,
    frame_interval: Duration,
    stop_requested: bool,
    terminating: bool,
}

impl Session {
    pub fn new(
        video_path: String,
        original_wallpaper: String,
        volume: f64,
        frame_rate: i32,
    ) -> Self {
        Self {
            video_path,
            original_wallpaper,
            is_playing: true,
            current_volume: volume.max(0.0),
            frame_interval: interval_for_rate(frame_rate)
                .unwrap_or(Duration::from_millis(33)),
            stop_requested: false,
            terminating: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.terminating
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_volume(&self) -> f64 {
        self.current_volume
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// The frame pump runs only while playing and not stopping.
    pub fn should_pump(&self) -> bool {
        !self.stop_requested && self.is_playing
    }

    /// Resume playback. Returns the saved volume to re-apply, or `None`
    /// when already playing (in which case the volume is left alone).
    pub fn play(&mut self) -> Option<f64> {
        if self.is_playing {
            return None;
        }
        self.is_playing = true;
        Some(self.current_volume)
    }

    /// Pause playback, saving `live_volume` (the adapter's current level)
    /// for the next `play`. Returns false when already paused, so a second
    /// pause cannot overwrite the saved level with the muted 0.0.
    pub fn pause(&mut self, live_volume: f64) -> bool {
        if !self.is_playing {
            return false;
        }
        self.is_playing = false;
        self.current_volume = live_volume.max(0.0);
        true
    }

    /// Stores the new level and returns the clamped value to hand to the
    /// adapter. Applies while paused too; `play` will then resume at it.
    pub fn set_volume(&mut self, level: f64) -> f64 {
        self.current_volume = level.max(0.0);
        self.current_volume
    }

    /// Reconfigures the pump interval; `None` leaves it unchanged.
    pub fn set_frame_rate(&mut self, rate: i32) -> Option<Duration> {
        let interval = interval_for_rate(rate)?;
        self.frame_interval = interval;
        Some(interval)
    }

    /// Enters the terminating state. Only the first call returns true;
    /// callers gate the actual teardown work (decoder close, wallpaper
    /// restore, window destruction) on it so the path stays idempotent.
    pub fn begin_teardown(&mut self) -> bool {
        if self.terminating {
            return false;
        }
        self.stop_requested = true;
        self.terminating = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(
            "C:\\videos\\loop.mp4".to_string(),
            "C:\\walls\\original.jpg".to_string(),
            1.0,
            30,
        )
    }

    #[test]
    fn default_interval_is_33ms() {
        assert_eq!(session().frame_interval(), Duration::from_millis(33));
    }

    #[test]
    fn interval_rounds_to_nearest_ms() {
        assert_eq!(interval_for_rate(30), Some(Duration::from_millis(33)));
        assert_eq!(interval_for_rate(24), Some(Duration::from_millis(42)));
        assert_eq!(interval_for_rate(60), Some(Duration::from_millis(17)));
        assert_eq!(interval_for_rate(1000), Some(Duration::from_millis(1)));
    }

    #[test]
    fn non_positive_rates_are_rejected() {
        assert_eq!(interval_for_rate(0), None);
        assert_eq!(interval_for_rate(-24), None);

        let mut s = session();
        assert!(s.set_frame_rate(0).is_none());
        assert!(s.set_frame_rate(-5).is_none());
        assert_eq!(s.frame_interval(), Duration::from_millis(33));
    }

    #[test]
    fn pause_then_play_restores_the_saved_volume() {
        let mut s = session();
        assert!(s.pause(0.37));
        assert!(!s.is_playing());
        assert_eq!(s.current_volume(), 0.37);
        assert_eq!(s.play(), Some(0.37));
        assert!(s.is_playing());
    }

    #[test]
    fn play_while_playing_is_a_no_op() {
        let mut s = session();
        assert!(s.is_playing());
        assert_eq!(s.play(), None);
        assert_eq!(s.current_volume(), 1.0);
    }

    #[test]
    fn double_pause_keeps_the_saved_volume() {
        let mut s = session();
        assert!(s.pause(0.8));
        // the adapter is muted now; a second pause must not save the 0.0
        assert!(!s.pause(0.0));
        assert_eq!(s.play(), Some(0.8));
    }

    #[test]
    fn volume_while_paused_is_what_play_resumes_at() {
        let mut s = session();
        s.pause(0.8);
        assert_eq!(s.set_volume(0.25), 0.25);
        assert_eq!(s.play(), Some(0.25));
    }

    #[test]
    fn volume_is_clamped_below_at_zero() {
        let mut s = session();
        assert_eq!(s.set_volume(-0.5), 0.0);
        assert_eq!(s.current_volume(), 0.0);
    }

    #[test]
    fn teardown_is_idempotent() {
        let mut s = session();
        assert!(s.begin_teardown());
        assert!(!s.begin_teardown());
        assert!(!s.begin_teardown());
        assert!(!s.is_alive());
        assert!(!s.should_pump());
    }

    #[test]
    fn commands_do_not_disturb_the_captured_wallpaper_path() {
        let mut s = session();
        s.set_volume(0.1);
        s.set_frame_rate(24);
        s.pause(0.1);
        s.play();
        s.begin_teardown();
        assert_eq!(s.original_wallpaper, "C:\\walls\\original.jpg");
    }

    #[test]
    fn pump_gate_follows_playing_state() {
        let mut s = session();
        assert!(s.should_pump());
        s.pause(1.0);
        assert!(!s.should_pump());
        s.play();
        assert!(s.should_pump());
    }
}
