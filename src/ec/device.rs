//! Device instance tying the register map to the feature controllers.

use crate::ec::{
    EcError,
    battery::{self, BatteryHealth, BatteryStatus, ChargeThreshold},
    config::VariantConfig,
    fan::{FanChannel, FanController},
    lighting::{LightbarState, LightingController},
    log::{debug, warn},
    map::{RegisterIo, RegisterMap},
    policy::RegisterTable,
    profile::{PlatformProfile, ProfileController},
    regs,
    sensors::{self, TempChannel},
    switches::Switches,
    toggle::ToggleGuard,
    transport::RegisterTransport,
};

/// Register map over the Uniwill register table.
pub type UniwillMap<T> = RegisterMap<T, RegisterTable, { regs::REGISTER_COUNT }>;

/// Values living in volatile registers that have to be restored after resume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SuspendState {
    charge_limit: Option<u8>,
    profile: Option<PlatformProfile>,
    super_key_locked: Option<bool>,
}

/// An attached Uniwill EC.
///
/// Created by [`crate::ec::DeviceBuilder`]. All feature controllers borrow
/// the device mutably, so a multi-step sequence always runs to completion
/// before anything else touches the map.
pub struct Uniwill<T: RegisterTransport> {
    map: UniwillMap<T>,
    variant: VariantConfig,
    lightbar: LightbarState,
    super_key_guard: ToggleGuard,
    saved: SuspendState,
}

impl<T: RegisterTransport> Uniwill<T> {
    pub(crate) fn attach(transport: T, variant: VariantConfig) -> Result<Self, EcError> {
        let mut dev = Self {
            map: RegisterMap::new(transport, regs::uniwill_table()),
            variant,
            lightbar: LightbarState::default(),
            super_key_guard: ToggleGuard::new(),
            saved: SuspendState::default(),
        };

        let project_id = dev.map.read(regs::PROJECT_ID)?;
        debug!("uniwill: project id {}", project_id);

        dev.map.set_bits(regs::AP_OEM, regs::ENABLE_MANUAL_CTRL)?;

        if dev.variant.has_lightbar {
            LightingController::new(&mut dev.map, &mut dev.lightbar).init()?;
        }
        Ok(dev)
    }

    /// Hands fan control back to the EC.
    pub fn shutdown(&mut self) -> Result<(), EcError> {
        self.map.clear_bits(regs::AP_OEM, regs::ENABLE_MANUAL_CTRL)
    }

    /// Hands fan control back to the EC and returns the transport.
    pub fn detach(mut self) -> (T, Result<(), EcError>) {
        let result = self.shutdown();
        if let Err(err) = result {
            warn!("uniwill: failed to disable manual control: {}", err);
        }
        (self.map.release(), result)
    }

    pub fn variant(&self) -> &VariantConfig {
        &self.variant
    }

    pub fn map(&mut self) -> &mut UniwillMap<T> {
        &mut self.map
    }

    pub fn fan(&mut self) -> FanController<'_, UniwillMap<T>> {
        FanController::new(&mut self.map, &self.variant)
    }

    pub fn profile(&mut self) -> ProfileController<'_, UniwillMap<T>> {
        ProfileController::new(&mut self.map)
    }

    pub fn charge_threshold(&mut self) -> ChargeThreshold<'_, UniwillMap<T>> {
        ChargeThreshold::new(&mut self.map)
    }

    /// `None` if this variant has no lightbar.
    pub fn lighting(&mut self) -> Option<LightingController<'_, UniwillMap<T>>> {
        if !self.variant.has_lightbar {
            return None;
        }
        Some(LightingController::new(&mut self.map, &mut self.lightbar))
    }

    pub fn switches(&mut self) -> Switches<'_, UniwillMap<T>> {
        Switches::new(&mut self.map, &self.super_key_guard)
    }

    pub fn battery_health(&mut self, status: BatteryStatus) -> Result<BatteryHealth, EcError> {
        battery::health(&mut self.map, status)
    }

    pub fn temperature(&mut self, channel: TempChannel) -> Result<i32, EcError> {
        sensors::temperature(&mut self.map, channel)
    }

    pub fn fan_speed(&mut self, channel: FanChannel) -> Result<u16, EcError> {
        sensors::fan_speed(&mut self.map, channel)
    }

    /// Prepares for the EC losing power.
    ///
    /// Saves what the cache cannot replay, returns fan control to the EC and
    /// switches the map to cache-only with every writeable register queued.
    pub fn on_suspend(&mut self) -> Result<(), EcError> {
        let super_key_locked = if self.variant.has_super_key_lock {
            Some(self.switches().super_key_lock()?)
        } else {
            None
        };

        let limit = self.map.read(regs::CHARGE_CTRL)? & regs::CHARGE_CTRL_MASK;

        let profile = match self.profile().get() {
            Ok(profile) => Some(profile),
            Err(EcError::Invalid) => {
                warn!("uniwill: platform profile not restorable");
                None
            }
            Err(err) => return Err(err),
        };

        // The cached value keeps the enable bit so it comes back on sync.
        let ap_oem = self.map.read(regs::AP_OEM)?;
        let released = ap_oem & !regs::ENABLE_MANUAL_CTRL;
        self.map.bypass(|bus| bus.write(regs::AP_OEM, released))?;

        self.map.enter_cache_only();
        self.map.mark_dirty();

        self.saved = SuspendState {
            charge_limit: Some(limit),
            profile,
            super_key_locked,
        };
        Ok(())
    }

    /// Restores the EC after [`Self::on_suspend`].
    ///
    /// On failure the saved state is kept, so resume can be retried.
    pub fn on_resume(&mut self) -> Result<(), EcError> {
        let saved = self.saved;

        self.map.invalidate();
        self.map.sync()?;

        if let Some(limit) = saved.charge_limit {
            self.map
                .update_bits(regs::CHARGE_CTRL, regs::CHARGE_CTRL_MASK, limit)?;
        }
        if let Some(profile) = saved.profile {
            self.profile().set(profile)?;
        }
        if let Some(locked) = saved.super_key_locked {
            self.switches().set_super_key_lock(locked)?;
        }

        self.saved = SuspendState::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ec::{DeviceBuilder, fan::FanState, map::Mode, test_support::FakeEc};

    /// EC state of a machine that just booted.
    fn booted_ec() -> FakeEc {
        let mut ec = FakeEc::uniwill();
        ec.poke(regs::PROJECT_ID, 0x13);
        ec.poke(regs::CHARGE_CTRL, 80);
        ec.poke(
            regs::MANUAL_FAN_CTRL,
            regs::FAN_MODE_USER | regs::FAN_MODE_HIGH,
        );
        // Super key lock engaged
        ec.poke(regs::SWITCH_STATUS, 0);
        ec.poke(regs::LIGHTBAR_AC_CTRL, regs::LIGHTBAR_WELCOME);
        ec.poke(regs::LIGHTBAR_AC_RED, 0xFF);
        ec
    }

    fn attach(ec: FakeEc) -> Uniwill<FakeEc> {
        DeviceBuilder::new()
            .transport(ec)
            .default_variant()
            .attach()
            .unwrap()
    }

    /// Forgets everything the EC stores across a power cycle.
    fn power_cycle(ec: &mut FakeEc) {
        ec.poke(regs::AP_OEM, 0);
        ec.poke(regs::CHARGE_CTRL, 100);
        ec.poke(regs::MANUAL_FAN_CTRL, 0);
        ec.poke(regs::SWITCH_STATUS, regs::SUPER_KEY_LOCK_STATUS);
        ec.poke(regs::LIGHTBAR_BAT_RED, 0);
        ec.clear_ops();
    }

    #[test]
    fn attach_takes_manual_control_and_lightbar() {
        let mut dev = attach(booted_ec());
        let ec = dev.map().transport();

        assert_eq!(ec.peek(regs::AP_OEM), regs::ENABLE_MANUAL_CTRL);
        assert_eq!(
            ec.peek(regs::LIGHTBAR_AC_CTRL),
            regs::LIGHTBAR_APP_EXISTS | regs::LIGHTBAR_S3_OFF
        );
        assert_eq!(ec.peek(regs::LIGHTBAR_BAT_RED), 0xFF);

        let lightbar = dev.lighting().unwrap();
        assert_eq!(lightbar.color(), [0xFF, 0, 0]);
        assert_eq!(lightbar.brightness(), 255);
    }

    #[test]
    fn attach_fails_when_ec_is_unreachable() {
        let mut ec = booted_ec();
        ec.set_unreachable(true);

        let result = DeviceBuilder::new()
            .transport(ec)
            .default_variant()
            .attach();
        assert_eq!(result.err(), Some(EcError::DeviceUnavailable));
    }

    #[test]
    fn detach_releases_manual_control() {
        let dev = attach(booted_ec());

        let (ec, result) = dev.detach();
        result.unwrap();
        assert_eq!(ec.peek(regs::AP_OEM), 0);
    }

    #[test]
    fn suspend_forces_automatic_fans_and_goes_cache_only() {
        let mut dev = attach(booted_ec());

        dev.on_suspend().unwrap();

        assert_eq!(dev.map().mode(), Mode::CacheOnly);
        assert_eq!(dev.map().transport().peek(regs::AP_OEM), 0);
        // The cache still remembers the enable bit for resume
        assert!(dev.map().is_dirty(regs::AP_OEM));
        assert_eq!(dev.fan().get_mode(), Err(EcError::DeviceUnavailable));
    }

    #[test]
    fn resume_restores_volatile_state() {
        let mut dev = attach(booted_ec());
        dev.on_suspend().unwrap();

        power_cycle(dev.map().transport_mut());
        dev.on_resume().unwrap();

        let ec = dev.map().transport();
        assert_eq!(ec.writes_to(regs::AP_OEM), [regs::ENABLE_MANUAL_CTRL]);
        assert_eq!(ec.peek(regs::LIGHTBAR_BAT_RED), 0xFF);
        assert_eq!(ec.peek(regs::CHARGE_CTRL), 80);
        assert_eq!(
            ec.peek(regs::MANUAL_FAN_CTRL),
            regs::FAN_MODE_USER | regs::FAN_MODE_HIGH
        );
        // One pulse brings the lock back
        assert_eq!(ec.writes_to(regs::TRIGGER), [regs::TRIGGER_SUPER_KEY_LOCK]);
        assert_eq!(ec.peek(regs::SWITCH_STATUS), 0);

        assert_eq!(dev.map().mode(), Mode::Live);
        assert!(!dev.map().any_dirty());
    }

    #[test]
    fn resume_skips_trigger_when_lock_survived() {
        let mut dev = attach(booted_ec());
        dev.on_suspend().unwrap();

        dev.map().transport_mut().clear_ops();
        dev.on_resume().unwrap();

        assert!(dev.map().transport().writes_to(regs::TRIGGER).is_empty());
    }

    #[test]
    fn writes_while_suspended_are_replayed() {
        let mut dev = attach(booted_ec());
        assert!(!dev.switches().fn_lock().unwrap());
        dev.on_suspend().unwrap();

        dev.switches().set_fn_lock(true).unwrap();
        assert!(dev.map().transport().writes_to(regs::BIOS_OEM).is_empty());

        dev.on_resume().unwrap();
        assert_eq!(
            dev.map().transport().peek(regs::BIOS_OEM),
            regs::FN_LOCK_STATUS
        );
    }

    #[test]
    fn failed_resume_can_be_retried() {
        let mut dev = attach(booted_ec());
        dev.on_suspend().unwrap();
        power_cycle(dev.map().transport_mut());

        dev.map().transport_mut().fail_writes_to(Some(regs::AP_OEM));
        assert_eq!(
            dev.on_resume(),
            Err(EcError::SyncFailure { addr: regs::AP_OEM })
        );

        dev.map().transport_mut().fail_writes_to(None);
        dev.on_resume().unwrap();
        assert_eq!(dev.map().transport().peek(regs::CHARGE_CTRL), 80);
        assert_eq!(
            dev.map().transport().peek(regs::AP_OEM),
            regs::ENABLE_MANUAL_CTRL
        );
    }

    #[test]
    fn fan_modes_through_device() {
        let mut dev = attach(booted_ec());

        dev.fan().set_mode(FanState::MaxSpeed).unwrap();
        assert_eq!(dev.fan().get_mode().unwrap(), FanState::MaxSpeed);

        dev.fan().set_mode(FanState::Automatic).unwrap();
        assert_eq!(dev.fan().get_mode().unwrap(), FanState::Automatic);
        assert_eq!(dev.profile().get().unwrap(), PlatformProfile::Balanced);
    }

    #[test]
    fn variant_without_lightbar_skips_lighting() {
        let variant = VariantConfig {
            has_lightbar: false,
            ..VariantConfig::INTEL_NUC_X15
        };
        let mut dev = DeviceBuilder::new()
            .transport(booted_ec())
            .variant(variant)
            .attach()
            .unwrap();

        assert!(dev.lighting().is_none());
        assert!(
            dev.map()
                .transport()
                .writes_to(regs::LIGHTBAR_AC_CTRL)
                .is_empty()
        );
    }
}
