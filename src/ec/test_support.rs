use std::collections::BTreeMap;
use std::vec::Vec;

use crate::ec::{
    device::UniwillMap,
    map::RegisterMap,
    policy::{Access, Register, RegisterTable},
    regs,
    transport::{RegisterTransport, TransportError},
};

pub const TEST_RO: u16 = 0x10;
pub const TEST_RW: u16 = 0x20;
pub const TEST_RW_2: u16 = 0x30;
pub const TEST_VOLATILE: u16 = 0x40;
pub const TEST_WO: u16 = 0x50;

pub const TEST_COUNT: usize = 6;

static TEST_REGISTERS: [Register; TEST_COUNT] = [
    Register::new(TEST_RO, Access::READ),
    Register::new(TEST_RW, Access::READ_WRITE),
    Register::new(TEST_RW_2, Access::READ_WRITE),
    Register::new(TEST_VOLATILE, Access::READ_WRITE.volatile()),
    Register::new(TEST_VOLATILE + 1, Access::READ.volatile()),
    Register::new(TEST_WO, Access::WRITE),
];

pub type TestMap = RegisterMap<FakeEc, RegisterTable, TEST_COUNT>;

pub fn test_table() -> RegisterTable {
    RegisterTable::new(&TEST_REGISTERS)
}

pub fn test_map() -> TestMap {
    RegisterMap::new(FakeEc::new(), test_table())
}

/// Map over the real register table, backed by a [`FakeEc::uniwill`].
pub fn uniwill_map() -> UniwillMap<FakeEc> {
    RegisterMap::new(FakeEc::uniwill(), regs::uniwill_table())
}

/// Transport operation that reached the fake EC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Read(u16),
    Write(u16, u8),
}

/// Self-clearing trigger bit that flips a status bit when written.
#[derive(Debug, Clone, Copy)]
struct Pulse {
    trigger: u16,
    trigger_bit: u8,
    status: u16,
    status_bit: u8,
}

/// In-memory EC with an operation log and fault injection.
///
/// Only operations that succeed are logged.
#[derive(Debug, Default)]
pub struct FakeEc {
    memory: BTreeMap<u16, u8>,
    ops: Vec<Op>,
    unreachable: bool,
    fail_writes_to: Option<u16>,
    mirrors: Vec<(u16, u16)>,
    pulses: Vec<Pulse>,
}

impl FakeEc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fake wired like the real EC: duty writes show up in the readback
    /// registers and the super key trigger toggles the switch status.
    pub fn uniwill() -> Self {
        let mut ec = Self::new();
        ec.mirror(regs::PWM_1_WRITEABLE, regs::PWM_1);
        ec.mirror(regs::PWM_2_WRITEABLE, regs::PWM_2);
        ec.pulse(
            regs::TRIGGER,
            regs::TRIGGER_SUPER_KEY_LOCK,
            regs::SWITCH_STATUS,
            regs::SUPER_KEY_LOCK_STATUS,
        );
        ec
    }

    pub fn poke(&mut self, addr: u16, value: u8) {
        self.memory.insert(addr, value);
    }

    pub fn peek(&self, addr: u16) -> u8 {
        self.memory.get(&addr).copied().unwrap_or(0)
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    pub fn writes_to(&self, addr: u16) -> Vec<u8> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Write(a, v) if *a == addr => Some(*v),
                _ => None,
            })
            .collect()
    }

    pub fn reads_of(&self, addr: u16) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::Read(a) if *a == addr))
            .count()
    }

    /// Every operation fails while set.
    pub fn set_unreachable(&mut self, unreachable: bool) {
        self.unreachable = unreachable;
    }

    pub fn fail_writes_to(&mut self, addr: Option<u16>) {
        self.fail_writes_to = addr;
    }

    /// Writes to `from` are also stored at `to`.
    pub fn mirror(&mut self, from: u16, to: u16) {
        self.mirrors.push((from, to));
    }

    fn pulse(&mut self, trigger: u16, trigger_bit: u8, status: u16, status_bit: u8) {
        self.pulses.push(Pulse {
            trigger,
            trigger_bit,
            status,
            status_bit,
        });
    }
}

impl RegisterTransport for FakeEc {
    fn read(&mut self, addr: u16) -> Result<u8, TransportError> {
        if self.unreachable {
            return Err(TransportError::Unreachable);
        }
        self.ops.push(Op::Read(addr));
        Ok(self.peek(addr))
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), TransportError> {
        if self.unreachable || self.fail_writes_to == Some(addr) {
            return Err(TransportError::Unreachable);
        }
        self.ops.push(Op::Write(addr, value));
        self.memory.insert(addr, value);

        for (from, to) in self.mirrors.clone() {
            if from == addr {
                self.memory.insert(to, value);
            }
        }
        for p in self.pulses.clone() {
            if p.trigger == addr && value & p.trigger_bit != 0 {
                let status = self.peek(p.status) ^ p.status_bit;
                self.memory.insert(p.status, status);
                self.memory.insert(addr, value & !p.trigger_bit);
            }
        }
        Ok(())
    }
}
