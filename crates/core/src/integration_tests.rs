//! Integration tests: exercise the full flow against simulated keyboards.
//!
//! A mock backend stands in for the attached hardware and records every
//! frame, so these tests check the exact bytes a session puts on the wire
//! across discovery, encoding and transport.

#[cfg(test)]
mod tests {
    use crate::config::TransportConfig;
    use crate::device::{DeviceFilter, KeyboardModel};
    use crate::effects::{NativeEffect, NativeEffectPart, NativeEffectStorage};
    use crate::error::Error;
    use crate::keys::{Color, Key, KeyColor, KeyGroup};
    use crate::modes::StartupMode;
    use crate::pids;
    use crate::session::KeyboardSession;
    use crate::transport::mock::{keyboard, IoLog, MockBackend};
    use crate::LOGITECH_VID;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const RED: Color = Color::new(0xFF, 0x00, 0x00);

    fn padded(prefix: &[u8]) -> Vec<u8> {
        let mut v = prefix.to_vec();
        v.resize(20, 0);
        v
    }

    /// Open a session on a single simulated keyboard.
    fn create_mock_session(product_id: u16, interface: i32) -> (KeyboardSession, Arc<Mutex<IoLog>>) {
        create_mock_session_with(MockBackend::new(vec![keyboard(product_id, interface)]))
    }

    fn create_mock_session_with(backend: MockBackend) -> (KeyboardSession, Arc<Mutex<IoLog>>) {
        let log = backend.log();
        let config = TransportConfig {
            settle_delay_ms: 0,
            ..TransportConfig::default()
        };
        let mut session = KeyboardSession::new(Box::new(backend), config);
        session.open(&DeviceFilter::any()).unwrap();
        (session, log)
    }

    fn writes(log: &Arc<Mutex<IoLog>>) -> Vec<Vec<u8>> {
        log.lock().unwrap().writes.clone()
    }

    #[test]
    fn g810_commit_frame() {
        let (mut session, log) = create_mock_session(pids::G810, 1);
        session.commit().unwrap();
        assert_eq!(writes(&log), vec![padded(&[0x11, 0xFF, 0x0C, 0x5A])]);
        // Every write is followed by a drain read.
        assert_eq!(log.lock().unwrap().drains, 1);
    }

    #[test]
    fn g213_commit_makes_no_io() {
        let (mut session, log) = create_mock_session(pids::G213, 1);
        session.commit().unwrap();
        assert!(writes(&log).is_empty());
    }

    #[test]
    fn g213_startup_color_frame() {
        let (mut session, log) = create_mock_session(pids::G213, 1);
        session.set_startup_mode(StartupMode::Color).unwrap();
        assert_eq!(writes(&log), vec![padded(&[0x11, 0xFF, 0x0D, 0x5A, 0x00, 0x01, 0x02])]);
    }

    #[test]
    fn g815_same_color_batches_of_thirteen() {
        let (mut session, log) = create_mock_session(pids::G815, 1);
        let keys: Vec<KeyColor> = KeyGroup::Keys
            .keys()
            .iter()
            .take(30)
            .map(|&k| KeyColor::new(k, RED))
            .collect();
        session.set_keys(&keys).unwrap();
        let frames = writes(&log);
        assert_eq!(frames.len(), 3);
        assert!(frames.iter().all(|f| f.len() == 20 && f[..7] == [0x11, 0xFF, 0x10, 0x6C, 0xFF, 0x00, 0x00]));
    }

    #[test]
    fn g810_logo_requests_are_capped() {
        let (mut session, log) = create_mock_session(pids::G810, 1);
        let logos = vec![KeyColor::new(Key::Logo, RED); 5];
        session.set_keys(&logos).unwrap();
        let frames = writes(&log);
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][8..], &[0x01, 0xFF, 0, 0, 0x01, 0xFF, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn g410_numpad_is_dropped() {
        let (mut session, log) = create_mock_session(pids::G410, 1);
        let numpad: Vec<KeyColor> = KeyGroup::Numeric.keys().iter().map(|&k| KeyColor::new(k, RED)).collect();
        session.set_keys(&numpad).unwrap();
        assert!(writes(&log).is_empty());
    }

    #[test]
    fn set_keys_continues_after_write_failure() {
        let mut backend = MockBackend::new(vec![keyboard(pids::G815, 1)]);
        backend.failing_writes.insert(0);
        let (mut session, log) = create_mock_session_with(backend);
        let request = vec![
            KeyColor::new(Key::A, RED),
            KeyColor::new(Key::B, Color::new(0, 0xFF, 0)),
            KeyColor::new(Key::C, Color::new(0, 0, 0xFF)),
        ];
        assert!(matches!(session.set_keys(&request), Err(Error::Transport(_))));
        assert_eq!(writes(&log).len(), 3);
    }

    #[test]
    fn empty_key_request_fails_without_io() {
        let (mut session, log) = create_mock_session(pids::G810, 1);
        assert!(matches!(session.set_keys(&[]), Err(Error::EmptyRequest)));
        assert!(writes(&log).is_empty());
    }

    #[test]
    fn non_matching_filter_is_not_found() {
        let (mut session, _log) = create_mock_session(pids::G810, 1);
        let filter = DeviceFilter {
            vendor_id: LOGITECH_VID,
            product_id: pids::G910_SPECTRUM,
            ..DeviceFilter::default()
        };
        assert!(matches!(session.open(&filter), Err(Error::NotFound(_))));
        assert!(!session.is_open());
    }

    #[test]
    fn serial_filter_selects_among_identical_models() {
        let mut second = keyboard(pids::G810, 1);
        second.serial_number = Some("SECOND".into());
        second.path = "/dev/mock-second".into();
        let backend = MockBackend::new(vec![keyboard(pids::G810, 1), second]);
        let (mut session, _log) = create_mock_session_with(backend);
        let filter = DeviceFilter {
            serial: "SECOND".into(),
            ..DeviceFilter::default()
        };
        session.open(&filter).unwrap();
        assert_eq!(session.current_device().unwrap().path, "/dev/mock-second");
    }

    #[test]
    fn list_devices_skips_unknown_hardware() {
        let mut mouse = keyboard(0xC08B, 1);
        mouse.product = Some("G502".into());
        let mut backend = MockBackend::new(vec![mouse, keyboard(pids::G910_SPARK, 1), keyboard(pids::G915_RECEIVER, 2)]);
        backend.deny_open = true;
        let log = backend.log();
        let mut session = KeyboardSession::new(Box::new(backend), TransportConfig::default());
        let models: Vec<KeyboardModel> = session.list_devices().unwrap().iter().map(|d| d.model).collect();
        assert_eq!(models, vec![KeyboardModel::G910, KeyboardModel::G915]);
        assert_eq!(log.lock().unwrap().opens, 0);
    }

    #[test]
    fn close_twice_touches_transport_once() {
        let (mut session, log) = create_mock_session(pids::G915_RECEIVER, 2);
        session.close().unwrap();
        session.close().unwrap();
        assert_eq!(log.lock().unwrap().closes, 1);
        assert!(matches!(session.commit(), Err(Error::NotOpen)));
    }

    #[test]
    fn native_effect_all_parts_on_g810() {
        let (mut session, log) = create_mock_session(pids::G810, 1);
        session
            .set_native_effect(
                NativeEffect::Cycle,
                NativeEffectPart::All,
                Duration::from_millis(0x0500),
                RED,
                NativeEffectStorage::None,
            )
            .unwrap();
        let frames = writes(&log);
        // Indicators (white), commit, keys effect, logo effect.
        assert_eq!(frames.len(), 4);
        assert_eq!(&frames[0][..8], &[0x12, 0xFF, 0x0C, 0x3A, 0x00, 0x40, 0x00, 0x05]);
        assert_eq!(&frames[0][9..12], &[0xFF, 0xFF, 0xFF]);
        assert_eq!(frames[1], padded(&[0x11, 0xFF, 0x0C, 0x5A]));
        assert_eq!(&frames[2][..6], &[0x11, 0xFF, 0x0D, 0x3C, 0x00, 0x03]);
        assert_eq!(&frames[3][..6], &[0x11, 0xFF, 0x0D, 0x3C, 0x01, 0x03]);
    }

    #[test]
    fn native_effect_off_skips_indicators() {
        let (mut session, log) = create_mock_session(pids::G810, 1);
        session
            .set_native_effect(
                NativeEffect::Off,
                NativeEffectPart::All,
                Duration::ZERO,
                RED,
                NativeEffectStorage::None,
            )
            .unwrap();
        let frames = writes(&log);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0][4], 0x00);
        assert_eq!(frames[1][4], 0x01);
    }

    #[test]
    fn native_effect_all_stops_when_keys_fail() {
        let mut backend = MockBackend::new(vec![keyboard(pids::G815, 1)]);
        // Indicators, commit, setup, keys effect: fail the keys effect.
        backend.failing_writes.insert(3);
        let (mut session, log) = create_mock_session_with(backend);
        let result = session.set_native_effect(
            NativeEffect::Breathing,
            NativeEffectPart::All,
            Duration::from_millis(1000),
            RED,
            NativeEffectStorage::User,
        );
        assert!(result.is_err());
        assert_eq!(writes(&log).len(), 4);
    }

    #[test]
    fn native_effect_logo_on_g213_is_trivial() {
        let (mut session, log) = create_mock_session(pids::G213, 1);
        session
            .set_native_effect(
                NativeEffect::Color,
                NativeEffectPart::Logo,
                Duration::ZERO,
                RED,
                NativeEffectStorage::None,
            )
            .unwrap();
        assert!(writes(&log).is_empty());
    }

    #[test]
    fn g915_toggles_use_receiver_target() {
        let (mut session, log) = create_mock_session(pids::G915_RECEIVER, 2);
        session.set_mn_key(3).unwrap();
        session.set_gkeys_mode(0).unwrap();
        assert_eq!(
            writes(&log),
            vec![padded(&[0x11, 0x01, 0x12, 0x1C, 0x04]), padded(&[0x11, 0x01, 0x11, 0x2B, 0x00])]
        );
    }

    #[test]
    fn out_of_range_mode_is_rejected_before_io() {
        let (mut session, log) = create_mock_session(pids::G910_SPECTRUM, 1);
        assert!(matches!(session.set_mn_key(8), Err(Error::OutOfRange { .. })));
        assert!(writes(&log).is_empty());
    }

    #[test]
    fn set_all_keys_per_key_then_commit() {
        let (mut session, log) = create_mock_session(pids::G_PRO, 1);
        session.set_all_keys(RED).unwrap();
        session.commit().unwrap();
        let frames = writes(&log);
        assert!(frames.len() > 2);
        assert_eq!(frames.last().unwrap(), &padded(&[0x11, 0xFF, 0x0C, 0x5A]));
        assert!(frames.iter().all(|f| f[1] == 0xFF));
    }
}
