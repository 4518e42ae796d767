/// Controls read/write access and caching of individual EC registers.
pub trait AccessPolicy {
    /// Returns true if `addr` may be read.
    fn can_read(&self, addr: u16) -> bool;
    /// Returns true if `addr` may be written.
    fn can_write(&self, addr: u16) -> bool;
    /// Returns true if `addr` must always be fetched from hardware.
    fn is_volatile(&self, addr: u16) -> bool;
    /// Cache slot backing `addr`, or `None` for unknown addresses.
    fn slot(&self, addr: u16) -> Option<usize>;
    /// Address stored in `slot`.
    fn addr_of(&self, slot: usize) -> Option<u16>;
}

/// Readable, writeable and volatile classification of a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Access {
    pub readable: bool,
    pub writeable: bool,
    pub volatile: bool,
}

impl Access {
    pub const READ: Access = Access {
        readable: true,
        writeable: false,
        volatile: false,
    };
    pub const WRITE: Access = Access {
        readable: false,
        writeable: true,
        volatile: false,
    };
    pub const READ_WRITE: Access = Access {
        readable: true,
        writeable: true,
        volatile: false,
    };

    /// Same access, but never served from the cache.
    pub const fn volatile(self) -> Access {
        Access {
            volatile: true,
            ..self
        }
    }
}

/// One row of a register table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Register {
    pub addr: u16,
    pub access: Access,
}

impl Register {
    pub const fn new(addr: u16, access: Access) -> Self {
        Self { addr, access }
    }
}

/// Static, address-sorted register table used as the access policy.
///
/// The index of a register in the table is its cache slot, so a map built
/// over a table of `N` registers needs `N` cache slots.
#[derive(Debug, Clone, Copy)]
pub struct RegisterTable {
    registers: &'static [Register],
}

impl RegisterTable {
    /// Wraps `registers`, which must be sorted by address.
    pub const fn new(registers: &'static [Register]) -> Self {
        Self { registers }
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    fn lookup(&self, addr: u16) -> Option<&Register> {
        self.registers
            .binary_search_by_key(&addr, |r| r.addr)
            .ok()
            .and_then(|idx| self.registers.get(idx))
    }
}

impl AccessPolicy for RegisterTable {
    fn can_read(&self, addr: u16) -> bool {
        self.lookup(addr).is_some_and(|r| r.access.readable)
    }

    fn can_write(&self, addr: u16) -> bool {
        self.lookup(addr).is_some_and(|r| r.access.writeable)
    }

    fn is_volatile(&self, addr: u16) -> bool {
        self.lookup(addr).is_some_and(|r| r.access.volatile)
    }

    fn slot(&self, addr: u16) -> Option<usize> {
        self.registers.binary_search_by_key(&addr, |r| r.addr).ok()
    }

    fn addr_of(&self, slot: usize) -> Option<u16> {
        self.registers.get(slot).map(|r| r.addr)
    }
}
