//! Fan mode switching and PWM duty scaling.
//!
//! The EC only takes manual duty values while its boost bit is set. Dropping
//! the boost bit (and the other mode bits under [`regs::FAN_AUTOMATIC_MASK`])
//! hands the fans back to the EC's own curve.

use crate::ec::{
    EcError,
    config::VariantConfig,
    log::{debug, warn},
    map::RegisterIo,
    regs,
};

/// Software PWM range, as seen by callers.
pub const PWM_SW_MAX: u8 = u8::MAX;

/// Fan operating mode, derived from register content on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FanState {
    Automatic,
    /// Fixed duty in `0..=255`.
    Manual(u8),
    MaxSpeed,
}

impl FanState {
    /// Tri-state `pwm_enable` value: 0 full speed, 1 manual, 2 automatic.
    pub fn pwm_enable(self) -> u8 {
        match self {
            FanState::MaxSpeed => 0,
            FanState::Manual(_) => 1,
            FanState::Automatic => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FanChannel {
    Main,
    Secondary,
}

impl FanChannel {
    pub const ALL: [FanChannel; 2] = [FanChannel::Main, FanChannel::Secondary];

    pub fn label(self) -> &'static str {
        match self {
            FanChannel::Main => "Main",
            FanChannel::Secondary => "Secondary",
        }
    }

    /// Duty readback register.
    pub fn pwm_addr(self) -> u16 {
        match self {
            FanChannel::Main => regs::PWM_1,
            FanChannel::Secondary => regs::PWM_2,
        }
    }

    /// High byte of the RPM register pair.
    pub fn rpm_addr(self) -> u16 {
        match self {
            FanChannel::Main => regs::MAIN_FAN_RPM_1,
            FanChannel::Secondary => regs::SECOND_FAN_RPM_1,
        }
    }

    fn index(self) -> usize {
        match self {
            FanChannel::Main => 0,
            FanChannel::Secondary => 1,
        }
    }
}

/// Rounding linear interpolation from `0..=from_max` onto `0..=to_max`.
fn rescale(value: u8, from_max: u8, to_max: u8) -> u8 {
    if from_max == 0 {
        return 0;
    }
    let from = u32::from(from_max);
    let value = u32::from(value.min(from_max));
    ((value * u32::from(to_max) + from / 2) / from) as u8
}

/// Hardware duty (`0..=pwm_max`) to software duty (`0..=255`).
pub fn pwm_hw_to_sw(hw: u8, pwm_max: u8) -> u8 {
    rescale(hw, pwm_max, PWM_SW_MAX)
}

/// Software duty (`0..=255`) to hardware duty (`0..=pwm_max`).
pub fn pwm_sw_to_hw(sw: u8, pwm_max: u8) -> u8 {
    rescale(sw, PWM_SW_MAX, pwm_max)
}

/// Fan mode control over a register map.
pub struct FanController<'a, M: RegisterIo> {
    map: &'a mut M,
    variant: &'a VariantConfig,
}

impl<'a, M: RegisterIo> FanController<'a, M> {
    pub fn new(map: &'a mut M, variant: &'a VariantConfig) -> Self {
        Self { map, variant }
    }

    pub fn get_mode(&mut self) -> Result<FanState, EcError> {
        let ap_oem = self.map.read(regs::AP_OEM)?;
        if ap_oem & regs::ENABLE_MANUAL_CTRL == 0 {
            return Ok(FanState::Automatic);
        }

        let ctrl = self.map.read(regs::MANUAL_FAN_CTRL)?;
        if ctrl & regs::FAN_MODE_BOOST == 0 {
            return Ok(FanState::Automatic);
        }

        let duty = self.map.read(FanChannel::Main.pwm_addr())?;
        if duty >= self.variant.pwm_max {
            Ok(FanState::MaxSpeed)
        } else {
            Ok(FanState::Manual(pwm_hw_to_sw(duty, self.variant.pwm_max)))
        }
    }

    /// Switches the fans to `state`.
    ///
    /// A failed manual duty write falls back to automatic mode. The duty write
    /// error is returned if that works, [`EcError::RollbackFailed`] otherwise.
    pub fn set_mode(&mut self, state: FanState) -> Result<(), EcError> {
        match state {
            FanState::Automatic => self.set_automatic(),
            FanState::MaxSpeed => {
                self.map
                    .set_bits(regs::MANUAL_FAN_CTRL, regs::FAN_MODE_BOOST)?;
                self.write_duty(self.variant.pwm_max)
            }
            FanState::Manual(duty) => {
                let restore = self.map.read(FanChannel::Main.pwm_addr())?;
                debug!("fan: manual duty {}, was {}", duty, restore);

                self.map
                    .set_bits(regs::MANUAL_FAN_CTRL, regs::FAN_MODE_BOOST)?;
                let hw = pwm_sw_to_hw(duty, self.variant.pwm_max);
                if let Err(err) = self.write_duty(hw) {
                    warn!("fan: duty write failed ({}), restoring automatic mode", err);
                    return match self.set_automatic() {
                        Ok(()) => Err(err),
                        Err(rollback) => {
                            warn!("fan: rollback failed: {}", rollback);
                            Err(EcError::RollbackFailed)
                        }
                    };
                }
                Ok(())
            }
        }
    }

    /// Current `pwm_enable` tri-state.
    pub fn pwm_enable(&mut self) -> Result<u8, EcError> {
        self.get_mode().map(FanState::pwm_enable)
    }

    /// Applies a `pwm_enable` value. Manual mode keeps the current duty.
    pub fn set_pwm_enable(&mut self, value: u8) -> Result<(), EcError> {
        let state = match value {
            0 => FanState::MaxSpeed,
            1 => {
                let duty = self.map.read(FanChannel::Main.pwm_addr())?;
                FanState::Manual(pwm_hw_to_sw(duty, self.variant.pwm_max))
            }
            2 => FanState::Automatic,
            _ => return Err(EcError::Invalid),
        };
        self.set_mode(state)
    }

    /// Duty of `channel` in `0..=255`.
    pub fn pwm(&mut self, channel: FanChannel) -> Result<u8, EcError> {
        let duty = self.map.read(channel.pwm_addr())?;
        Ok(pwm_hw_to_sw(duty, self.variant.pwm_max))
    }

    fn set_automatic(&mut self) -> Result<(), EcError> {
        self.map
            .update_bits(regs::MANUAL_FAN_CTRL, regs::FAN_AUTOMATIC_MASK, 0)
    }

    fn write_duty(&mut self, hw: u8) -> Result<(), EcError> {
        for channel in FanChannel::ALL {
            let addr = self.variant.pwm_write[channel.index()];
            self.map.write(addr, hw)?;
        }
        Ok(())
    }
}
