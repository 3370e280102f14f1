use std::path::Path;

use gstreamer::prelude::*;
use gstreamer_app::AppSink;

use crate::{error, info, utility::path_to_file_uri, warn};

// playbin treats volume as a linear factor; 1.0 is unity gain and anything
// above amplifies, capped at the element's own maximum.
const MAX_VOLUME: f64 = 10.0;

const PREROLL_TIMEOUT_SECS: u64 = 5;

/// One decoded video frame: packed BGRx, 4 bytes per pixel, top-down.
pub struct VideoFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Result of one non-blocking frame poll.
pub enum FramePoll {
    Frame(VideoFrame),
    EndOfStream,
    Pending,
}

/// GStreamer-backed media player. A `playbin` pipeline decodes the file,
/// routes audio to the default output device with built-in volume control,
/// and delivers video through an `appsink` constrained to BGRx so frames
/// can be handed to GDI without conversion.
///
/// The appsink keeps at most 4 buffers and drops the oldest, so a caller
/// polling slower than the clock never stalls the pipeline.
pub struct Player {
    playbin: Option<gstreamer::Element>,
    appsink: AppSink,
}

impl Player {
    /// Opens `path` and starts playback at `volume`. Pre-rolls the pipeline
    /// first so an undecodable file fails here instead of surfacing as an
    /// endless stream of bus errors.
    pub fn open(path: &Path, volume: f64) -> Result<Self, String> {
        gstreamer::init().map_err(|e| format!("GStreamer init failed: {e}"))?;

        let uri = path_to_file_uri(path);
        info!("[LPV][MEDIA] Opening '{}'", uri);

        let appsink = AppSink::builder()
            .caps(
                &gstreamer::Caps::builder("video/x-raw")
                    .field("format", "BGRx")
                    .build(),
            )
            .max_buffers(4)
            .drop(true)
            .build();

        let playbin = gstreamer::ElementFactory::make("playbin")
            .property("uri", &uri)
            .build()
            .map_err(|e| format!("Failed to build playbin: {e}"))?;

        playbin.set_property("video-sink", &appsink);

        playbin
            .set_state(gstreamer::State::Paused)
            .map_err(|e| format!("Failed to pre-roll '{}': {e:?}", path.display()))?;

        let (result, state, _) =
            playbin.state(gstreamer::ClockTime::from_seconds(PREROLL_TIMEOUT_SECS));
        if result.is_err() || state != gstreamer::State::Paused {
            let _ = playbin.set_state(gstreamer::State::Null);
            return Err(format!("Cannot decode '{}'", path.display()));
        }

        playbin.set_property("volume", volume.clamp(0.0, MAX_VOLUME));

        playbin
            .set_state(gstreamer::State::Playing)
            .map_err(|e| format!("Failed to start playback: {e:?}"))?;

        Ok(Self {
            playbin: Some(playbin),
            appsink,
        })
    }

    /// Non-blocking poll for the next frame. Bus errors are logged and
    /// reported as `Pending`; playback simply stalls until the next poll
    /// (or until the session is torn down).
    pub fn poll_frame(&mut self) -> FramePoll {
        let Some(playbin) = self.playbin.as_ref() else {
            return FramePoll::Pending;
        };

        if let Some(bus) = playbin.bus() {
            while let Some(msg) = bus.pop() {
                use gstreamer::MessageView;

                match msg.view() {
                    MessageView::Eos(_) => return FramePoll::EndOfStream,
                    MessageView::Error(err) => {
                        error!(
                            "[LPV][MEDIA] Pipeline error from {:?}: {}",
                            err.src().map(|s| s.path_string()),
                            err.error()
                        );
                    }
                    _ => {}
                }
            }
        }

        match self.appsink.try_pull_sample(gstreamer::ClockTime::ZERO) {
            Some(sample) => match frame_from_sample(&sample) {
                Some(frame) => FramePoll::Frame(frame),
                None => FramePoll::Pending,
            },
            None if self.appsink.is_eos() => FramePoll::EndOfStream,
            None => FramePoll::Pending,
        }
    }

    /// Absolute flushing seek back to the start; called on end-of-stream so
    /// the video loops forever.
    pub fn seek_to_start(&self) -> Result<(), String> {
        let Some(playbin) = self.playbin.as_ref() else {
            return Ok(());
        };

        playbin
            .seek_simple(
                gstreamer::SeekFlags::FLUSH | gstreamer::SeekFlags::KEY_UNIT,
                gstreamer::ClockTime::ZERO,
            )
            .map_err(|e| format!("Seek to start failed: {e}"))
    }

    pub fn set_volume(&self, level: f64) {
        if let Some(playbin) = self.playbin.as_ref() {
            playbin.set_property("volume", level.clamp(0.0, MAX_VOLUME));
        }
    }

    pub fn volume(&self) -> f64 {
        self.playbin
            .as_ref()
            .map(|p| p.property::<f64>("volume"))
            .unwrap_or(0.0)
    }

    /// Releases the pipeline (decoder and audio device). Safe to call more
    /// than once; later calls are no-ops.
    pub fn close(&mut self) {
        if let Some(playbin) = self.playbin.take() {
            if let Err(e) = playbin.set_state(gstreamer::State::Null) {
                warn!("[LPV][MEDIA] Failed to stop pipeline: {e:?}");
            }
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.close();
    }
}

fn frame_from_sample(sample: &gstreamer::Sample) -> Option<VideoFrame> {
    let buffer = sample.buffer()?;
    let caps = sample.caps()?;
    let video_info = gstreamer_video::VideoInfo::from_caps(caps).ok()?;

    let width = video_info.width();
    let height = video_info.height();

    let map = buffer.map_readable().ok()?;
    let data = map.as_slice();

    let expected_size = (width * height * 4) as usize;
    if data.len() < expected_size {
        error!(
            "[LPV][MEDIA] Buffer size mismatch: got {}, expected {}",
            data.len(),
            expected_size
        );
        return None;
    }

    Some(VideoFrame {
        data: data[..expected_size].to_vec(),
        width,
        height,
    })
}
