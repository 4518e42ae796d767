//! RGB lightbar.
//!
//! The EC keeps separate lightbar settings for AC and battery power. Every
//! change is written to both banks so the lightbar looks the same either way.

use crate::ec::{EcError, log::debug, map::RegisterIo, regs};

pub const LIGHTBAR_MAX_BRIGHTNESS: u8 = u8::MAX;

const AC_COLOR: [u16; 3] = [
    regs::LIGHTBAR_AC_RED,
    regs::LIGHTBAR_AC_GREEN,
    regs::LIGHTBAR_AC_BLUE,
];
const BAT_COLOR: [u16; 3] = [
    regs::LIGHTBAR_BAT_RED,
    regs::LIGHTBAR_BAT_GREEN,
    regs::LIGHTBAR_BAT_BLUE,
];

/// Colour and brightness last applied to the lightbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LightbarState {
    /// Per-channel intensity (red, green, blue) at full brightness.
    pub intensity: [u8; 3],
    pub brightness: u8,
}

/// Lightbar control over a register map.
pub struct LightingController<'a, M: RegisterIo> {
    map: &'a mut M,
    state: &'a mut LightbarState,
}

impl<'a, M: RegisterIo> LightingController<'a, M> {
    pub fn new(map: &'a mut M, state: &'a mut LightbarState) -> Self {
        Self { map, state }
    }

    /// Takes over the lightbar and seeds `state` from the AC bank.
    ///
    /// Both animations are turned off, and the AC control register and
    /// colour are copied to the battery bank.
    pub fn init(&mut self) -> Result<(), EcError> {
        let mut ctrl = self.map.read(regs::LIGHTBAR_AC_CTRL)?;
        ctrl |= regs::LIGHTBAR_APP_EXISTS | regs::LIGHTBAR_S3_OFF;
        ctrl &= !regs::LIGHTBAR_WELCOME;
        self.map.write(regs::LIGHTBAR_AC_CTRL, ctrl)?;
        self.map.write(regs::LIGHTBAR_BAT_CTRL, ctrl)?;

        self.state.brightness = if ctrl & regs::LIGHTBAR_S0_OFF != 0 {
            0
        } else {
            LIGHTBAR_MAX_BRIGHTNESS
        };

        for (i, (ac, bat)) in AC_COLOR.into_iter().zip(BAT_COLOR).enumerate() {
            let value = self.map.read(ac)?;
            self.map.write(bat, value)?;
            self.state.intensity[i] = value;
        }
        debug!(
            "lightbar: brightness {}, colour {:?}",
            self.state.brightness, self.state.intensity
        );
        Ok(())
    }

    pub fn brightness(&self) -> u8 {
        self.state.brightness
    }

    pub fn color(&self) -> [u8; 3] {
        self.state.intensity
    }

    /// Scales the stored colour by `brightness` and applies it to both banks.
    pub fn set_brightness(&mut self, brightness: u8) -> Result<(), EcError> {
        for (i, (ac, bat)) in AC_COLOR.into_iter().zip(BAT_COLOR).enumerate() {
            let value = scale(self.state.intensity[i], brightness);
            self.map.write(ac, value)?;
            self.map.write(bat, value)?;
        }

        let s0_off = if brightness > 0 {
            0
        } else {
            regs::LIGHTBAR_S0_OFF
        };
        self.map
            .update_bits(regs::LIGHTBAR_AC_CTRL, regs::LIGHTBAR_S0_OFF, s0_off)?;
        self.mirror_ctrl()?;

        self.state.brightness = brightness;
        Ok(())
    }

    /// Makes the battery control register equal to the AC one.
    fn mirror_ctrl(&mut self) -> Result<(), EcError> {
        let ctrl = self.map.read(regs::LIGHTBAR_AC_CTRL)?;
        self.map.update_bits(regs::LIGHTBAR_BAT_CTRL, u8::MAX, ctrl)
    }

    pub fn set_color(&mut self, rgb: [u8; 3], brightness: u8) -> Result<(), EcError> {
        self.state.intensity = rgb;
        self.set_brightness(brightness)
    }
}

fn scale(intensity: u8, brightness: u8) -> u8 {
    let value = u16::from(intensity) * u16::from(brightness) / u16::from(LIGHTBAR_MAX_BRIGHTNESS);
    value.min(u16::from(u8::MAX)) as u8
}
