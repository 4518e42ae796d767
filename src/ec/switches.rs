//! On/off switches backed by single EC bits.
//!
//! Direct switches are plain bits that read back what was written. The super
//! key lock is toggle-only: writing its trigger bit flips the state, and the
//! current state is read from a separate status register.

use crate::ec::{EcError, map::RegisterIo, regs, toggle::ToggleGuard};

/// Generates a getter and setter for a switch stored in one register bit.
///
/// `active_low` switches are enabled while the bit is clear.
macro_rules! impl_bit_switch {
    ($(#[$meta:meta])* $name:ident, $addr:expr, $bit:expr) => {
        impl_bit_switch!(@impl $(#[$meta])* $name, $addr, $bit, false);
    };
    ($(#[$meta:meta])* $name:ident, $addr:expr, $bit:expr, active_low) => {
        impl_bit_switch!(@impl $(#[$meta])* $name, $addr, $bit, true);
    };
    (@impl $(#[$meta:meta])* $name:ident, $addr:expr, $bit:expr, $active_low:expr) => {
        paste::paste! {
            $(#[$meta])*
            pub fn $name(&mut self) -> Result<bool, EcError> {
                let value = self.map.read($addr)?;
                Ok((value & $bit != 0) != $active_low)
            }

            #[doc = "Enables or disables `" $name "`."]
            pub fn [<set_ $name>](&mut self, enable: bool) -> Result<(), EcError> {
                let bits = if enable != $active_low { $bit } else { 0 };
                self.map.update_bits($addr, $bit, bits)
            }
        }
    };
}

/// Switch control over a register map.
pub struct Switches<'a, M: RegisterIo> {
    map: &'a mut M,
    super_key_guard: &'a ToggleGuard,
}

impl<'a, M: RegisterIo> Switches<'a, M> {
    pub fn new(map: &'a mut M, super_key_guard: &'a ToggleGuard) -> Self {
        Self {
            map,
            super_key_guard,
        }
    }

    impl_bit_switch!(
        /// Fn lock: function keys send F1..F12 without Fn.
        fn_lock,
        regs::BIOS_OEM,
        regs::FN_LOCK_STATUS
    );

    impl_bit_switch!(
        /// Touchpad toggle hotkey.
        touchpad_toggle,
        regs::OEM_4,
        regs::TOUCHPAD_TOGGLE_OFF,
        active_low
    );

    /// Returns true while the super key is locked.
    pub fn super_key_lock(&mut self) -> Result<bool, EcError> {
        super_key_locked(&mut *self.map)
    }

    /// Locks or unlocks the super key. Returns whether the trigger fired.
    pub fn set_super_key_lock(&mut self, enable: bool) -> Result<bool, EcError> {
        self.super_key_guard.toggle_if(
            &mut *self.map,
            enable,
            |map| super_key_locked(map),
            |map| {
                map.write_bits(
                    regs::TRIGGER,
                    regs::TRIGGER_SUPER_KEY_LOCK,
                    regs::TRIGGER_SUPER_KEY_LOCK,
                )
            },
        )
    }
}

fn super_key_locked<M: RegisterIo>(map: &mut M) -> Result<bool, EcError> {
    let status = map.read(regs::SWITCH_STATUS)?;
    Ok(status & regs::SUPER_KEY_LOCK_STATUS == 0)
}
