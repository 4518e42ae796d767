use crate::ec::{EcError, log::warn, map::RegisterIo, regs};

/// Platform performance profile, stored in the fan mode register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlatformProfile {
    Balanced,
    BalancedPerformance,
    Performance,
}

impl PlatformProfile {
    /// Profiles the firmware supports.
    pub fn choices() -> [PlatformProfile; 3] {
        [
            PlatformProfile::Balanced,
            PlatformProfile::BalancedPerformance,
            PlatformProfile::Performance,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            PlatformProfile::Balanced => "balanced",
            PlatformProfile::BalancedPerformance => "balanced-performance",
            PlatformProfile::Performance => "performance",
        }
    }

    fn bits(self) -> u8 {
        match self {
            PlatformProfile::Balanced => regs::FAN_MODE_USER | regs::FAN_MODE_HIGH,
            PlatformProfile::BalancedPerformance => 0,
            PlatformProfile::Performance => regs::FAN_MODE_TURBO,
        }
    }

    fn from_bits(bits: u8) -> Option<Self> {
        Self::choices()
            .into_iter()
            .find(|p| p.bits() == bits & regs::FAN_PROFILE_MASK)
    }
}

/// Reads and applies the platform profile.
pub struct ProfileController<'a, M: RegisterIo> {
    map: &'a mut M,
}

impl<'a, M: RegisterIo> ProfileController<'a, M> {
    pub fn new(map: &'a mut M) -> Self {
        Self { map }
    }

    /// Any bit combination other than the known profiles is [`EcError::Invalid`].
    pub fn get(&mut self) -> Result<PlatformProfile, EcError> {
        let ctrl = self.map.read(regs::MANUAL_FAN_CTRL)?;
        PlatformProfile::from_bits(ctrl).ok_or_else(|| {
            warn!(
                "profile: unknown fan mode bits {:#04x}",
                ctrl & regs::FAN_PROFILE_MASK
            );
            EcError::Invalid
        })
    }

    pub fn set(&mut self, profile: PlatformProfile) -> Result<(), EcError> {
        self.map.update_bits(
            regs::MANUAL_FAN_CTRL,
            regs::FAN_PROFILE_MASK,
            profile.bits(),
        )
    }
}
