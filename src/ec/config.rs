use crate::ec::regs;

/// Per-model constants that differ between Uniwill variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VariantConfig {
    /// Hardware duty value meaning full speed.
    pub pwm_max: u8,
    /// Duty write register for the main and secondary fan.
    pub pwm_write: [u16; 2],
    pub has_lightbar: bool,
    pub has_super_key_lock: bool,
    /// Event code announcing a battery alert, if the firmware sends one.
    pub battery_alert_event: Option<u32>,
}

impl VariantConfig {
    /// Intel NUC x15 (LAPAC71H, LAPKC71F).
    pub const INTEL_NUC_X15: VariantConfig = VariantConfig {
        pwm_max: 200,
        pwm_write: [regs::PWM_1_WRITEABLE, regs::PWM_2_WRITEABLE],
        has_lightbar: true,
        has_super_key_lock: true,
        battery_alert_event: None,
    };

    pub const fn with_battery_alert_event(self, code: u32) -> Self {
        Self {
            battery_alert_event: Some(code),
            ..self
        }
    }
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self::INTEL_NUC_X15
    }
}
