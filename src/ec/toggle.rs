use spin::Mutex;

use crate::ec::{EcError, log::trace};

/// Serializes read-compare-fire sequences on pulse-to-toggle registers.
///
/// Such a register flips its state each time a trigger bit is written, so
/// firing twice for the same request would undo it. The status is read and
/// compared with the lock held, and the trigger only fires on a mismatch.
#[derive(Debug, Default)]
pub struct ToggleGuard {
    lock: Mutex<()>,
}

impl ToggleGuard {
    pub const fn new() -> Self {
        Self {
            lock: Mutex::new(()),
        }
    }

    /// Fires the trigger if the current status differs from `desired`.
    ///
    /// `ctx` is handed to both closures, usually the register map. Returns
    /// whether the trigger fired.
    pub fn toggle_if<C>(
        &self,
        ctx: &mut C,
        desired: bool,
        read_status: impl FnOnce(&mut C) -> Result<bool, EcError>,
        fire: impl FnOnce(&mut C) -> Result<(), EcError>,
    ) -> Result<bool, EcError> {
        let _held = self.lock.lock();

        if read_status(ctx)? == desired {
            return Ok(false);
        }
        trace!("toggle: firing trigger");
        fire(ctx)?;
        Ok(true)
    }
}
