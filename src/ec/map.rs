use crate::ec::{
    EcError,
    log::{trace, warn},
    policy::AccessPolicy,
    table::CacheTable,
    transport::RegisterTransport,
};

/// How the map reaches hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Reads and writes go to the transport; the cache is updated alongside.
    Live,
    /// Hardware is asleep: reads come from the cache, writes are queued.
    CacheOnly,
    /// A [`RegisterMap::bypass`] operation is running.
    Bypass,
}

/// Register-level access shared by all feature controllers.
pub trait RegisterIo {
    fn read(&mut self, addr: u16) -> Result<u8, EcError>;
    fn write(&mut self, addr: u16, value: u8) -> Result<(), EcError>;

    /// Read-modify-write of the bits in `mask`. Skips the write when nothing changes.
    fn update_bits(&mut self, addr: u16, mask: u8, value: u8) -> Result<(), EcError> {
        let old = self.read(addr)?;
        let new = (old & !mask) | (value & mask);
        if new != old {
            self.write(addr, new)?;
        }
        Ok(())
    }

    /// Read-modify-write of the bits in `mask` that always writes.
    ///
    /// Needed for self-clearing trigger bits, where the read-back value says
    /// nothing about whether the pulse still has to be sent.
    fn write_bits(&mut self, addr: u16, mask: u8, value: u8) -> Result<(), EcError> {
        let old = self.read(addr)?;
        self.write(addr, (old & !mask) | (value & mask))
    }

    fn set_bits(&mut self, addr: u16, bits: u8) -> Result<(), EcError> {
        self.update_bits(addr, bits, bits)
    }

    fn clear_bits(&mut self, addr: u16, bits: u8) -> Result<(), EcError> {
        self.update_bits(addr, bits, 0)
    }

    /// Reads `addr` (high byte) and `addr + 1` (low byte) as one big-endian value.
    fn read_be16(&mut self, addr: u16) -> Result<u16, EcError> {
        let hi = self.read(addr)?;
        let lo = self.read(addr.wrapping_add(1))?;
        Ok(u16::from_be_bytes([hi, lo]))
    }
}

/// Cached, suspend-aware view of the EC register space.
///
/// # Const Generics
/// - `N`: number of cache slots, at least the number of registers the policy knows
///
/// # Type Parameters
/// - `T`: transport reaching the hardware
/// - `P`: access policy classifying every address
pub struct RegisterMap<T, P, const N: usize>
where
    T: RegisterTransport,
    P: AccessPolicy,
    bitmaps::BitsImpl<N>: bitmaps::Bits,
{
    transport: T,
    policy: P,
    cache: CacheTable<N>,
    mode: Mode,
}

impl<T, P, const N: usize> core::fmt::Debug for RegisterMap<T, P, N>
where
    T: RegisterTransport,
    P: AccessPolicy,
    bitmaps::BitsImpl<N>: bitmaps::Bits,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterMap")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl<T, P, const N: usize> RegisterMap<T, P, N>
where
    T: RegisterTransport,
    P: AccessPolicy,
    bitmaps::BitsImpl<N>: bitmaps::Bits,
{
    pub fn new(transport: T, policy: P) -> Self {
        Self {
            transport,
            policy,
            cache: CacheTable::new(),
            mode: Mode::Live,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the map and return the transport.
    pub fn release(self) -> T {
        self.transport
    }

    /// Returns true if `addr` currently has a cached value.
    pub fn is_cached(&self, addr: u16) -> bool {
        self.cache_slot(addr)
            .is_some_and(|slot| self.cache.is_present(slot))
    }

    /// Returns true if `addr` holds a value that still has to reach hardware.
    pub fn is_dirty(&self, addr: u16) -> bool {
        self.cache_slot(addr)
            .is_some_and(|slot| self.cache.is_dirty(slot))
    }

    pub fn any_dirty(&self) -> bool {
        self.cache.any_dirty()
    }

    /// Stops talking to hardware. Reads needing the transport fail until [`Self::sync`].
    pub fn enter_cache_only(&mut self) {
        trace!("regmap: cache-only");
        self.mode = Mode::CacheOnly;
    }

    /// Marks every cached writeable register dirty so the next sync rewrites it.
    pub fn mark_dirty(&mut self) {
        let policy = &self.policy;
        self.cache.mark_present_dirty(|slot| {
            policy
                .addr_of(slot)
                .is_some_and(|addr| policy.can_write(addr))
        });
    }

    /// Forgets every clean cached value. Queued writes are kept.
    pub fn invalidate(&mut self) {
        self.cache.invalidate_clean();
    }

    /// Returns to live mode and replays every queued write in address order.
    ///
    /// Stops at the first failing write; that write and all later ones stay
    /// queued for the next sync.
    pub fn sync(&mut self) -> Result<(), EcError> {
        self.mode = Mode::Live;

        let mut from = 0;
        while let Some((slot, value)) = self.cache.next_dirty(from) {
            from = slot + 1;
            let Some(addr) = self.policy.addr_of(slot) else {
                self.cache.mark_clean(slot);
                continue;
            };

            if let Err(err) = self.transport.write(addr, value) {
                warn!("regmap: replay of {:#06x} failed: {}", addr, err);
                return Err(EcError::SyncFailure { addr });
            }
            self.cache.mark_clean(slot);
        }
        Ok(())
    }

    /// Runs `op` directly against the transport, ignoring the mode and the cache.
    ///
    /// Access classification is still enforced. Nothing `op` reads or writes
    /// ends up in the cache.
    pub fn bypass<R>(&mut self, op: impl FnOnce(&mut BypassBus<'_, T, P>) -> R) -> R {
        let saved = core::mem::replace(&mut self.mode, Mode::Bypass);
        let mut bus = BypassBus {
            transport: &mut self.transport,
            policy: &self.policy,
        };
        let result = op(&mut bus);
        self.mode = saved;
        result
    }

    fn cache_slot(&self, addr: u16) -> Option<usize> {
        if self.policy.is_volatile(addr) {
            return None;
        }
        self.policy.slot(addr).filter(|slot| *slot < N)
    }

    /// Cache slot for a non-volatile `addr`, rejecting addresses the cache cannot hold.
    fn resolve(&self, addr: u16) -> Result<Option<usize>, EcError> {
        if self.policy.is_volatile(addr) {
            return Ok(None);
        }
        match self.policy.slot(addr) {
            Some(slot) if slot < N => Ok(Some(slot)),
            _ => {
                warn!("regmap: no cache slot for {:#06x}", addr);
                Err(EcError::Unsupported { addr })
            }
        }
    }
}

impl<T, P, const N: usize> RegisterIo for RegisterMap<T, P, N>
where
    T: RegisterTransport,
    P: AccessPolicy,
    bitmaps::BitsImpl<N>: bitmaps::Bits,
{
    fn read(&mut self, addr: u16) -> Result<u8, EcError> {
        if !self.policy.can_read(addr) {
            return Err(EcError::Unsupported { addr });
        }

        let slot = self.resolve(addr)?;
        if let Some(value) = slot.and_then(|slot| self.cache.get(slot)) {
            return Ok(value);
        }

        if self.mode == Mode::CacheOnly {
            warn!("regmap: {:#06x} not cached while hardware is asleep", addr);
            return Err(EcError::DeviceUnavailable);
        }

        let value = self.transport.read(addr)?;
        if let Some(slot) = slot {
            self.cache.store_clean(slot, value);
        }
        Ok(value)
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), EcError> {
        if !self.policy.can_write(addr) {
            return Err(EcError::Unsupported { addr });
        }

        let slot = self.resolve(addr)?;
        if self.mode == Mode::CacheOnly {
            let Some(slot) = slot else {
                warn!("regmap: cannot queue write to volatile {:#06x}", addr);
                return Err(EcError::DeviceUnavailable);
            };
            self.cache.store_dirty(slot, value);
            return Ok(());
        }

        self.transport.write(addr, value)?;
        if let Some(slot) = slot {
            self.cache.store_clean(slot, value);
        }
        Ok(())
    }
}

/// Direct transport access handed out by [`RegisterMap::bypass`].
pub struct BypassBus<'a, T, P>
where
    T: RegisterTransport,
    P: AccessPolicy,
{
    transport: &'a mut T,
    policy: &'a P,
}

impl<'a, T, P> RegisterIo for BypassBus<'a, T, P>
where
    T: RegisterTransport,
    P: AccessPolicy,
{
    fn read(&mut self, addr: u16) -> Result<u8, EcError> {
        if !self.policy.can_read(addr) {
            return Err(EcError::Unsupported { addr });
        }
        Ok(self.transport.read(addr)?)
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), EcError> {
        if !self.policy.can_write(addr) {
            return Err(EcError::Unsupported { addr });
        }
        Ok(self.transport.write(addr, value)?)
    }
}
