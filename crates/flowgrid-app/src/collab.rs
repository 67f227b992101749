//! Narrow traits for the external collaborators named in spec §6. The core
//! only consumes these interfaces — no Faust/miniaudio/ImGui crate is
//! vendored or stubbed with fake FFI; a real backend implements the trait
//! out-of-tree. Each trait has a `Null` implementation for running the
//! core headless (tests, this crate's CLI) without a real backend.

use std::sync::Arc;

use flowgrid_path::Path;
use parking_lot::Mutex;

/// The device configuration the core publishes to the audio layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceConfig {
    pub device_name: String,
    pub sample_format: String,
    pub channels: u32,
    pub sample_rate: u32,
}

/// The small, explicitly-published slice of state the audio thread is
/// allowed to read (spec §5: "a small, explicitly published subset of
/// state... performs NO store access"). The UI thread publishes a new
/// config after every device-settings commit; the audio thread only ever
/// locks this to read the latest value, never the `Store` itself.
#[derive(Clone, Default)]
pub struct PublishedDeviceState {
    inner: Arc<Mutex<Option<DeviceConfig>>>,
}

impl PublishedDeviceState {
    /// An empty handle with no device published yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the published config. Called by the UI thread after a
    /// device-settings commit.
    pub fn publish(&self, config: DeviceConfig) {
        *self.inner.lock() = Some(config);
    }

    /// The most recently published config, if any. Safe to call from the
    /// audio thread: a short-lived lock, never held across a callback.
    pub fn current(&self) -> Option<DeviceConfig> {
        self.inner.lock().clone()
    }
}

/// Notifications the audio layer posts back to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    Started,
    Stopped,
    Rerouted,
}

/// The miniaudio-backed device layer: hands over a device configuration and
/// callback, and reports device lifecycle events. The core treats
/// `Rerouted` as a trigger to rescan devices.
pub trait AudioDeviceLayer {
    /// Starts the device described by `config`. Returns `Err` if the
    /// device failed to open (spec §7 kind 5, `DeviceError`) — the core
    /// surfaces this as a device-state field value and leaves the device
    /// stopped.
    fn start(&mut self, config: &DeviceConfig) -> Result<(), String>;

    /// Stops the currently running device, if any.
    fn stop(&mut self);

    /// Drains any events posted since the last poll.
    fn poll_events(&mut self) -> Vec<DeviceEvent>;
}

/// A backend that never starts a device and never posts events.
#[derive(Debug, Default)]
pub struct NullAudioDeviceLayer;

impl AudioDeviceLayer for NullAudioDeviceLayer {
    fn start(&mut self, _config: &DeviceConfig) -> Result<(), String> {
        Ok(())
    }

    fn stop(&mut self) {}

    fn poll_events(&mut self) -> Vec<DeviceEvent> {
        Vec::new()
    }
}

/// The result of a DSP compilation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileResult {
    /// Compilation succeeded; `params` names the compiled instance's
    /// exposed parameters.
    Success { params: Vec<String> },
    /// Compilation failed with this message.
    Failure { message: String },
}

/// The Faust-backed DSP compiler: given a text buffer's content, compiles
/// it to a DSP instance and parameter list. The core reacts to success or
/// failure by updating designated fields; it never blocks waiting for a
/// result.
pub trait DspCompiler {
    /// Compiles `source`, the current content of a text buffer.
    fn compile(&mut self, source: &str) -> CompileResult;
}

/// A backend that always fails to compile, naming the given buffer path in
/// its failure message — useful for exercising the failure-path field
/// updates without a real Faust toolchain.
#[derive(Debug, Default)]
pub struct NullDspCompiler;

impl DspCompiler for NullDspCompiler {
    fn compile(&mut self, _source: &str) -> CompileResult {
        CompileResult::Failure { message: "no DSP compiler backend attached".to_string() }
    }
}

/// The ImGui/ImPlot-backed UI layer: renders components by invoking widget
/// functions per their registered path, and enqueues actions in response
/// to user gestures. ImGui's own settings (docking, window positions) are
/// themselves components and round-trip through save/load like any other.
pub trait UiLayer {
    /// Renders the subtree rooted at `path`. A no-op backend does nothing;
    /// a real one walks the component tree from this path and invokes its
    /// widget functions.
    fn render(&mut self, path: &Path);
}

/// A backend that renders nothing.
#[derive(Debug, Default)]
pub struct NullUiLayer;

impl UiLayer for NullUiLayer {
    fn render(&mut self, _path: &Path) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_audio_device_layer_starts_without_error_and_posts_nothing() {
        let mut layer = NullAudioDeviceLayer;
        let config =
            DeviceConfig { device_name: "test".into(), sample_format: "f32".into(), channels: 2, sample_rate: 48000 };
        assert!(layer.start(&config).is_ok());
        assert!(layer.poll_events().is_empty());
    }

    #[test]
    fn null_dsp_compiler_always_fails() {
        let mut compiler = NullDspCompiler;
        assert!(matches!(compiler.compile("process = _;"), CompileResult::Failure { .. }));
    }

    #[test]
    fn null_ui_layer_render_is_a_no_op() {
        let mut ui = NullUiLayer;
        ui.render(&Path::root());
    }

    #[test]
    fn published_device_state_round_trips_latest_value() {
        let published = PublishedDeviceState::new();
        assert!(published.current().is_none());
        let config =
            DeviceConfig { device_name: "out".into(), sample_format: "f32".into(), channels: 2, sample_rate: 44100 };
        published.publish(config.clone());
        assert_eq!(published.current(), Some(config));
    }

    #[test]
    fn published_device_state_clones_share_the_same_slot() {
        let a = PublishedDeviceState::new();
        let b = a.clone();
        let config =
            DeviceConfig { device_name: "out".into(), sample_format: "f32".into(), channels: 1, sample_rate: 48000 };
        a.publish(config.clone());
        assert_eq!(b.current(), Some(config));
    }
}
