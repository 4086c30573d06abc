//! Keyboard session: owns at most one open keyboard and turns lighting
//! requests into frames on its transport.
//!
//! Every operation needs an open session and fails with
//! [`Error::NotOpen`] otherwise. Closing an already closed session is a
//! no-op.

use crate::config::TransportConfig;
use crate::device::{self, DeviceFilter, DeviceInfo, KeyboardModel};
use crate::effects::{self, NativeEffect, NativeEffectPart, NativeEffectStorage};
use crate::encoder;
use crate::error::{Error, Result};
use crate::hid::HidBackend;
use crate::keys::{Color, KeyColor, KeyGroup};
use crate::modes::{self, OnBoardMode, StartupMode};
use crate::protocol::{protocol, AllKeysStrategy};
use crate::report::Frame;
use crate::transport::{send_frame, Backend, Transport};
use std::time::Duration;
use tracing::{debug, info, warn};

struct OpenKeyboard {
    info: DeviceInfo,
    /// `None` when the backend reopens the device for every frame.
    transport: Option<Box<dyn Transport>>,
}

/// A lighting session on one keyboard.
pub struct KeyboardSession {
    backend: Box<dyn Backend>,
    config: TransportConfig,
    current: Option<OpenKeyboard>,
}

impl KeyboardSession {
    pub fn new(backend: Box<dyn Backend>, config: TransportConfig) -> Self {
        Self {
            backend,
            config,
            current: None,
        }
    }

    /// A session on the default hidapi backend.
    pub fn hid(config: TransportConfig) -> Self {
        Self::new(Box::new(HidBackend::new()), config)
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// All attached supported keyboards.
    pub fn list_devices(&mut self) -> Result<Vec<DeviceInfo>> {
        device::discover_devices(self.backend.as_mut())
    }

    /// Open the first keyboard matching `filter`, closing any open one first.
    ///
    /// On failure the session is left closed.
    pub fn open(&mut self, filter: &DeviceFilter) -> Result<()> {
        self.close()?;

        let candidates = self.backend.enumerate()?;
        let info = device::resolve(candidates, filter).ok_or_else(|| {
            Error::NotFound(format!(
                "no supported keyboard matches vid=0x{:04X} pid=0x{:04X} serial={:?}",
                filter.vendor_id, filter.product_id, filter.serial
            ))
        })?;

        let transport = self.backend.open(&info, &self.config)?;
        let transport = if self.backend.keeps_handle_open() {
            Some(transport)
        } else {
            transport.close()?;
            None
        };

        info!(model = info.model.name(), path = %info.path, backend = self.backend.name(), "Keyboard opened");
        self.current = Some(OpenKeyboard { info, transport });
        Ok(())
    }

    /// Release the keyboard. Does nothing when no keyboard is open.
    pub fn close(&mut self) -> Result<()> {
        let Some(open) = self.current.take() else {
            return Ok(());
        };
        debug!(model = open.info.model.name(), "Closing keyboard");
        match open.transport {
            Some(transport) => transport.close(),
            None => Ok(()),
        }
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_device(&self) -> Option<&DeviceInfo> {
        self.current.as_ref().map(|open| &open.info)
    }

    pub fn current_model(&self) -> Option<KeyboardModel> {
        self.current_device().map(|info| info.model)
    }

    fn model(&self) -> Result<KeyboardModel> {
        self.current_model().ok_or(Error::NotOpen)
    }

    fn send(&mut self, frame: &Frame) -> Result<()> {
        let Self {
            backend,
            config,
            current,
        } = self;
        let open = current.as_mut().ok_or(Error::NotOpen)?;
        match open.transport.as_mut() {
            Some(transport) => send_frame(transport.as_mut(), frame, config),
            None => {
                let mut transport = backend.open(&open.info, config)?;
                let result = send_frame(transport.as_mut(), frame, config);
                if let Err(e) = transport.close() {
                    warn!(error = %e, "Failed to close per-frame transport");
                }
                result
            }
        }
    }

    /// Send every frame even after a failure; the first error is returned.
    fn send_all(&mut self, frames: &[Frame]) -> Result<()> {
        let mut first_error = None;
        for (index, frame) in frames.iter().enumerate() {
            if let Err(e) = self.send(frame) {
                warn!(frame = index, error = %e, "Frame write failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Send frames in order, stopping at the first failure.
    fn send_sequence(&mut self, frames: &[Frame]) -> Result<()> {
        for frame in frames {
            self.send(frame)?;
        }
        Ok(())
    }

    pub fn set_key(&mut self, key_color: KeyColor) -> Result<()> {
        self.set_keys(&[key_color])
    }

    /// Set a batch of keys. Keys the model cannot address are skipped.
    pub fn set_keys(&mut self, key_colors: &[KeyColor]) -> Result<()> {
        let model = self.model()?;
        let frames = encoder::encode_keys(model, key_colors)?;
        debug!(model = model.name(), keys = key_colors.len(), frames = frames.len(), "Setting keys");
        self.send_all(&frames)
    }

    pub fn set_group_keys(&mut self, group: KeyGroup, color: Color) -> Result<()> {
        let key_colors: Vec<KeyColor> = group.keys().iter().map(|&key| KeyColor::new(key, color)).collect();
        self.set_keys(&key_colors)
    }

    pub fn set_all_keys(&mut self, color: Color) -> Result<()> {
        let model = self.model()?;
        match protocol(model).all_keys {
            AllKeysStrategy::Regions => {
                let regions = modes::regions(model).ok_or(Error::Unsupported {
                    operation: "all-keys lighting",
                    model,
                })?;
                for region in regions {
                    self.set_region(region, color)?;
                }
                Ok(())
            }
            AllKeysStrategy::NativeColor => self.set_native_effect(
                NativeEffect::Color,
                NativeEffectPart::Keys,
                Duration::ZERO,
                color,
                NativeEffectStorage::None,
            ),
            AllKeysStrategy::PerKey => self.set_keys(&encoder::all_key_assignments(color)),
            AllKeysStrategy::Unsupported => Err(Error::Unsupported {
                operation: "all-keys lighting",
                model,
            }),
        }
    }

    /// Make pending per-key changes visible. Boards without a commit step
    /// succeed without any I/O.
    pub fn commit(&mut self) -> Result<()> {
        let model = self.model()?;
        match encoder::encode_commit(model) {
            Some(frame) => self.send(&frame),
            None => Ok(()),
        }
    }

    pub fn set_region(&mut self, region: u8, color: Color) -> Result<()> {
        let frame = modes::encode_region(self.model()?, region, color)?;
        self.send(&frame)
    }

    pub fn set_startup_mode(&mut self, mode: StartupMode) -> Result<()> {
        let frame = modes::encode_startup_mode(self.model()?, mode)?;
        self.send(&frame)
    }

    pub fn set_on_board_mode(&mut self, mode: OnBoardMode) -> Result<()> {
        let frame = modes::encode_onboard_mode(self.model()?, mode)?;
        self.send(&frame)
    }

    pub fn set_mr_key(&mut self, value: u8) -> Result<()> {
        let frame = modes::encode_mr_key(self.model()?, value)?;
        self.send(&frame)
    }

    pub fn set_mn_key(&mut self, value: u8) -> Result<()> {
        let frame = modes::encode_mn_key(self.model()?, value)?;
        self.send(&frame)
    }

    pub fn set_gkeys_mode(&mut self, value: u8) -> Result<()> {
        let frame = modes::encode_gkeys_mode(self.model()?, value)?;
        self.send(&frame)
    }

    /// Start a firmware effect.
    ///
    /// For [`NativeEffectPart::All`] the indicator keys are set and
    /// committed first, then the effect is applied to the keys and to the
    /// logo; both must succeed.
    pub fn set_native_effect(
        &mut self,
        effect: NativeEffect,
        part: NativeEffectPart,
        period: Duration,
        color: Color,
        storage: NativeEffectStorage,
    ) -> Result<()> {
        let model = self.model()?;
        if part == NativeEffectPart::All {
            if let Some(indicators) = effects::indicator_color(effect, color) {
                self.set_group_keys(KeyGroup::Indicators, indicators)?;
                self.commit()?;
            }
            self.set_native_effect(effect, NativeEffectPart::Keys, period, color, storage)?;
            return self.set_native_effect(effect, NativeEffectPart::Logo, period, color, storage);
        }

        let frames = effects::encode_effect(model, effect, part, period, color, storage)?;
        debug!(model = model.name(), ?effect, ?part, frames = frames.len(), "Setting native effect");
        self.send_sequence(&frames)
    }
}

impl Drop for KeyboardSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "Failed to close keyboard session");
        }
    }
}
