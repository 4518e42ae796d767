use core::cell::RefCell;

use critical_section::Mutex;

use crate::ec::{device::Uniwill, transport::RegisterTransport};

/// Device shared between call paths.
///
/// Every access runs inside a critical section, so a multi-step sequence
/// such as a fan mode change or a suspend transition never interleaves with
/// another caller.
pub struct SharedDevice<T: RegisterTransport> {
    inner: Mutex<RefCell<Uniwill<T>>>,
}

impl<T: RegisterTransport> SharedDevice<T> {
    pub const fn new(device: Uniwill<T>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(device)),
        }
    }

    /// Runs `f` with exclusive access to the device.
    ///
    /// # Panics
    /// Panics if called again from inside `f`.
    pub fn with<R>(&self, f: impl FnOnce(&mut Uniwill<T>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    pub fn into_inner(self) -> Uniwill<T> {
        self.inner.into_inner().into_inner()
    }
}
