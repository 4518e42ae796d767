//! Hotkey events: codes, keymap and the observer chain.
//!
//! Every event is first offered to the registered observers in registration
//! order. An observer returning [`NotifyResult::Stop`] consumes the event;
//! otherwise it is translated through the keymap and reported to the
//! [`KeySink`].

use heapless::Vec;

use crate::ec::log::{trace, warn};

/// Event codes sent by the firmware.
pub mod codes {
    pub const KEY_CAPSLOCK: u32 = 0x01;
    pub const KEY_NUMLOCK: u32 = 0x02;
    pub const KEY_SCROLLLOCK: u32 = 0x03;

    pub const KEY_TOUCHPAD_ON: u32 = 0x04;
    pub const KEY_TOUCHPAD_OFF: u32 = 0x05;

    pub const KEY_BRIGHTNESSUP: u32 = 0x14;
    pub const KEY_BRIGHTNESSDOWN: u32 = 0x15;

    pub const OSD_RADIOON: u32 = 0x1A;
    pub const OSD_RADIOOFF: u32 = 0x1B;

    pub const KEY_MUTE: u32 = 0x35;
    pub const KEY_VOLUMEDOWN: u32 = 0x36;
    pub const KEY_VOLUMEUP: u32 = 0x37;

    pub const OSD_LIGHTBAR_ON: u32 = 0x39;
    pub const OSD_LIGHTBAR_OFF: u32 = 0x3A;

    pub const OSD_KB_LED_LEVEL0: u32 = 0x3B;
    pub const OSD_KB_LED_LEVEL1: u32 = 0x3C;
    pub const OSD_KB_LED_LEVEL2: u32 = 0x3D;
    pub const OSD_KB_LED_LEVEL3: u32 = 0x3E;
    pub const OSD_KB_LED_LEVEL4: u32 = 0x3F;

    pub const OSD_SUPER_KEY_LOCK_ENABLE: u32 = 0x40;
    pub const OSD_SUPER_KEY_LOCK_DISABLE: u32 = 0x41;

    pub const KEY_RFKILL: u32 = 0xA4;

    pub const OSD_SUPER_KEY_LOCK_TOGGLE: u32 = 0xA5;
    pub const OSD_LIGHTBAR_STATE_CHANGED: u32 = 0xA6;
    pub const OSD_FAN_BOOST_STATE_CHANGED: u32 = 0xA7;
    pub const OSD_DC_ADAPTER_CHANGED: u32 = 0xAB;
    pub const OSD_PERF_MODE_CHANGED: u32 = 0xB0;

    pub const KEY_KBDILLUMDOWN: u32 = 0xB1;
    pub const KEY_KBDILLUMUP: u32 = 0xB2;
    pub const KEY_FN_LOCK: u32 = 0xB8;
    pub const KEY_KBDILLUMTOGGLE: u32 = 0xB9;

    pub const OSD_KBD_BACKLIGHT_CHANGED: u32 = 0xF0;
}

/// Keys reported to the input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    KbdIllumToggle,
    KbdIllumDown,
    KbdIllumUp,
    Rfkill,
    FnEsc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeymapEntry {
    /// Known event handled by the firmware or another driver.
    Ignore,
    Key(Key),
}

/// Looks up `code` in the keymap.
pub fn keymap(code: u32) -> Option<KeymapEntry> {
    use self::codes::*;

    let entry = match code {
        OSD_KB_LED_LEVEL0..=OSD_KB_LED_LEVEL4 => KeymapEntry::Key(Key::KbdIllumToggle),
        KEY_RFKILL => KeymapEntry::Key(Key::Rfkill),
        KEY_KBDILLUMDOWN => KeymapEntry::Key(Key::KbdIllumDown),
        KEY_KBDILLUMUP => KeymapEntry::Key(Key::KbdIllumUp),
        KEY_FN_LOCK => KeymapEntry::Key(Key::FnEsc),
        KEY_KBDILLUMTOGGLE => KeymapEntry::Key(Key::KbdIllumToggle),

        KEY_CAPSLOCK
        | KEY_NUMLOCK
        | KEY_SCROLLLOCK
        | KEY_TOUCHPAD_ON
        | KEY_TOUCHPAD_OFF
        | KEY_BRIGHTNESSUP
        | KEY_BRIGHTNESSDOWN
        | OSD_RADIOON
        | OSD_RADIOOFF
        | KEY_MUTE
        | KEY_VOLUMEDOWN
        | KEY_VOLUMEUP
        | OSD_LIGHTBAR_ON
        | OSD_LIGHTBAR_OFF
        | OSD_SUPER_KEY_LOCK_ENABLE
        | OSD_SUPER_KEY_LOCK_DISABLE
        | OSD_SUPER_KEY_LOCK_TOGGLE
        | OSD_LIGHTBAR_STATE_CHANGED
        | OSD_FAN_BOOST_STATE_CHANGED
        | OSD_DC_ADAPTER_CHANGED
        | OSD_PERF_MODE_CHANGED
        | OSD_KBD_BACKLIGHT_CHANGED => KeymapEntry::Ignore,

        _ => return None,
    };
    Some(entry)
}

/// Receives keys produced by events.
pub trait KeySink {
    /// Reports a press and release of `key`.
    fn report(&mut self, key: Key);
}

/// Answer of an observer to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotifyResult {
    /// Not interested.
    Done,
    /// Handled, keep going.
    Ok,
    /// Handled; later observers and key reporting are skipped.
    Stop,
}

pub trait EventObserver {
    fn notify(&self, code: u32) -> NotifyResult;
}

impl core::fmt::Debug for dyn EventObserver + '_ {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("EventObserver")
    }
}

/// What happened to a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatched {
    Vetoed,
    Ignored,
    Reported(Key),
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ObserverId(u32);

/// Ordered chain of up to `N` observers.
pub struct EventDispatcher<'a, const N: usize> {
    observers: Vec<(ObserverId, &'a dyn EventObserver), N>,
    next_id: u32,
}

impl<'a, const N: usize> Default for EventDispatcher<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> EventDispatcher<'a, N> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            next_id: 0,
        }
    }

    /// Appends `observer` to the chain. Hands it back if the chain is full.
    pub fn register(
        &mut self,
        observer: &'a dyn EventObserver,
    ) -> Result<ObserverId, &'a dyn EventObserver> {
        let id = ObserverId(self.next_id);
        self.observers
            .push((id, observer))
            .map_err(|(_, observer)| observer)?;
        self.next_id = self.next_id.wrapping_add(1);
        Ok(id)
    }

    /// Removes an observer. Returns false if `id` was not registered.
    pub fn unregister(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(i, _)| *i != id);
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn dispatch(&self, code: u32, sink: &mut impl KeySink) -> Dispatched {
        for (_, observer) in self.observers.iter() {
            if observer.notify(code) == NotifyResult::Stop {
                trace!("event {:#04x} vetoed", code);
                return Dispatched::Vetoed;
            }
        }

        match keymap(code) {
            Some(KeymapEntry::Key(key)) => {
                sink.report(key);
                Dispatched::Reported(key)
            }
            Some(KeymapEntry::Ignore) => Dispatched::Ignored,
            None => {
                warn!("unknown event code {:#04x}", code);
                Dispatched::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};
    use std::vec::Vec as StdVec;

    #[derive(Default)]
    struct Keys(StdVec<Key>);

    impl KeySink for Keys {
        fn report(&mut self, key: Key) {
            self.0.push(key);
        }
    }

    struct Recorder<'a> {
        name: char,
        log: &'a RefCell<StdVec<char>>,
        answer: NotifyResult,
    }

    impl EventObserver for Recorder<'_> {
        fn notify(&self, _code: u32) -> NotifyResult {
            self.log.borrow_mut().push(self.name);
            self.answer
        }
    }

    struct Counter(Cell<usize>);

    impl EventObserver for Counter {
        fn notify(&self, _code: u32) -> NotifyResult {
            self.0.set(self.0.get() + 1);
            NotifyResult::Done
        }
    }

    #[test]
    fn keymap_covers_known_codes() {
        assert_eq!(
            keymap(codes::KEY_FN_LOCK),
            Some(KeymapEntry::Key(Key::FnEsc))
        );
        assert_eq!(
            keymap(codes::OSD_KB_LED_LEVEL3),
            Some(KeymapEntry::Key(Key::KbdIllumToggle))
        );
        assert_eq!(keymap(codes::KEY_MUTE), Some(KeymapEntry::Ignore));
        assert_eq!(
            keymap(codes::OSD_KBD_BACKLIGHT_CHANGED),
            Some(KeymapEntry::Ignore)
        );
        assert_eq!(keymap(0x99), None);
    }

    #[test]
    fn observers_run_in_registration_order() {
        let log = RefCell::new(StdVec::new());
        let a = Recorder {
            name: 'a',
            log: &log,
            answer: NotifyResult::Done,
        };
        let b = Recorder {
            name: 'b',
            log: &log,
            answer: NotifyResult::Ok,
        };

        let mut chain: EventDispatcher<'_, 4> = EventDispatcher::new();
        chain.register(&a).unwrap();
        chain.register(&b).unwrap();

        let mut keys = Keys::default();
        assert_eq!(
            chain.dispatch(codes::KEY_RFKILL, &mut keys),
            Dispatched::Reported(Key::Rfkill)
        );
        assert_eq!(*log.borrow(), ['a', 'b']);
        assert_eq!(keys.0, [Key::Rfkill]);
    }

    #[test]
    fn stop_vetoes_later_observers_and_key() {
        let log = RefCell::new(StdVec::new());
        let veto = Recorder {
            name: 'v',
            log: &log,
            answer: NotifyResult::Stop,
        };
        let late = Recorder {
            name: 'l',
            log: &log,
            answer: NotifyResult::Done,
        };

        let mut chain: EventDispatcher<'_, 4> = EventDispatcher::new();
        chain.register(&veto).unwrap();
        chain.register(&late).unwrap();

        let mut keys = Keys::default();
        assert_eq!(
            chain.dispatch(codes::KEY_FN_LOCK, &mut keys),
            Dispatched::Vetoed
        );
        assert_eq!(*log.borrow(), ['v']);
        assert!(keys.0.is_empty());
    }

    #[test]
    fn ignored_and_unknown_codes_report_nothing() {
        let chain: EventDispatcher<'_, 1> = EventDispatcher::new();
        let mut keys = Keys::default();

        assert_eq!(
            chain.dispatch(codes::KEY_VOLUMEUP, &mut keys),
            Dispatched::Ignored
        );
        assert_eq!(chain.dispatch(0xEE, &mut keys), Dispatched::Unknown);
        assert!(keys.0.is_empty());
    }

    #[test]
    fn full_chain_hands_observer_back() {
        let first = Counter(Cell::new(0));
        let second = Counter(Cell::new(0));

        let mut chain: EventDispatcher<'_, 1> = EventDispatcher::new();
        chain.register(&first).unwrap();
        assert!(chain.register(&second).is_err());
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn unregistered_observer_is_not_called() {
        let counter = Counter(Cell::new(0));
        let mut chain: EventDispatcher<'_, 2> = EventDispatcher::new();

        let id = chain.register(&counter).unwrap();
        chain.dispatch(codes::KEY_MUTE, &mut Keys::default());
        assert!(chain.unregister(id));
        assert!(!chain.unregister(id));
        chain.dispatch(codes::KEY_MUTE, &mut Keys::default());

        assert_eq!(counter.0.get(), 1);
        assert!(chain.is_empty());
    }
}
