//! Battery charge threshold, health and alert forwarding.

use heapless::Vec;
use spin::Mutex;

use crate::ec::{
    EcError,
    events::{EventObserver, NotifyResult},
    log::{debug, warn},
    map::RegisterIo,
    regs,
};

/// Charge end threshold in percent.
pub struct ChargeThreshold<'a, M: RegisterIo> {
    map: &'a mut M,
}

impl<'a, M: RegisterIo> ChargeThreshold<'a, M> {
    pub fn new(map: &'a mut M) -> Self {
        Self { map }
    }

    pub fn get(&mut self) -> Result<u8, EcError> {
        let value = self.map.read(regs::CHARGE_CTRL)?;
        Ok((value & regs::CHARGE_CTRL_MASK).min(100))
    }

    /// Sets the threshold. Values outside `1..=100` are [`EcError::Invalid`].
    pub fn set(&mut self, percent: u8) -> Result<(), EcError> {
        if !(1..=100).contains(&percent) {
            return Err(EcError::Invalid);
        }
        self.map
            .update_bits(regs::CHARGE_CTRL, regs::CHARGE_CTRL_MASK, percent)
    }

    /// Returns true once the battery has charged up to the threshold.
    pub fn reached(&mut self) -> Result<bool, EcError> {
        let value = self.map.read(regs::CHARGE_CTRL)?;
        Ok(value & regs::CHARGE_CTRL_REACHED != 0)
    }
}

/// Host-side status of a battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryStatus {
    pub present: bool,
    /// False when the host cannot tell whether the battery is charging.
    pub status_known: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatteryHealth {
    Good,
    UnspecifiedFailure,
    NoBattery,
    Unknown,
}

/// Health of a battery, combining host status with the EC charging alert.
pub fn health<M: RegisterIo>(
    map: &mut M,
    status: BatteryStatus,
) -> Result<BatteryHealth, EcError> {
    if !status.present {
        return Ok(BatteryHealth::NoBattery);
    }
    if !status.status_known {
        return Ok(BatteryHealth::Unknown);
    }

    let alert = map.read(regs::BAT_ALERT)?;
    if alert != 0 {
        debug!("battery: charging alert {:#04x}", alert);
        return Ok(BatteryHealth::UnspecifiedFailure);
    }
    Ok(BatteryHealth::Good)
}

/// Host battery handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryId(pub u32);

/// Batteries that want to hear about charging alerts.
#[derive(Debug, Default)]
pub struct Batteries<const N: usize> {
    list: Mutex<Vec<BatteryId, N>>,
}

impl<const N: usize> Batteries<N> {
    pub fn new() -> Self {
        Self {
            list: Mutex::new(Vec::new()),
        }
    }

    /// Hands `id` back if the registry is full.
    pub fn add(&self, id: BatteryId) -> Result<(), BatteryId> {
        let mut list = self.list.lock();
        if list.contains(&id) {
            return Ok(());
        }
        list.push(id)
            .inspect_err(|id| warn!("battery: no room for {}", id.0))
    }

    pub fn remove(&self, id: BatteryId) -> bool {
        let mut list = self.list.lock();
        let before = list.len();
        list.retain(|b| *b != id);
        list.len() != before
    }

    pub fn len(&self) -> usize {
        self.list.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.lock().is_empty()
    }

    /// Calls `f` for every registered battery.
    ///
    /// `f` runs on a snapshot with the registry unlocked, so it may add or
    /// remove batteries.
    pub fn for_each(&self, mut f: impl FnMut(BatteryId)) {
        let snapshot = self.list.lock().clone();
        for id in snapshot.iter() {
            f(*id);
        }
    }
}

/// Tells every registered battery that it changed when the alert event arrives.
pub struct BatteryAlertObserver<'a, F, const N: usize>
where
    F: Fn(BatteryId),
{
    alert_event: Option<u32>,
    batteries: &'a Batteries<N>,
    changed: F,
}

impl<'a, F, const N: usize> BatteryAlertObserver<'a, F, N>
where
    F: Fn(BatteryId),
{
    pub fn new(alert_event: Option<u32>, batteries: &'a Batteries<N>, changed: F) -> Self {
        Self {
            alert_event,
            batteries,
            changed,
        }
    }
}

impl<'a, F, const N: usize> EventObserver for BatteryAlertObserver<'a, F, N>
where
    F: Fn(BatteryId),
{
    fn notify(&self, code: u32) -> NotifyResult {
        if self.alert_event != Some(code) {
            return NotifyResult::Done;
        }
        self.batteries.for_each(|id| (self.changed)(id));
        NotifyResult::Ok
    }
}
