//! EC register addresses, bit masks and the access table.
//!
//! Every address the crate touches is listed in [`UNIWILL_REGISTERS`]. The
//! table is sorted by address; the position of a register in it is also its
//! cache slot.

use crate::ec::policy::{Access, Register, RegisterTable};

// --- Sensors (volatile)
pub const CPU_TEMP: u16 = 0x043E;
pub const GPU_TEMP: u16 = 0x044F;
pub const MAIN_FAN_RPM_1: u16 = 0x0464; // high byte
pub const MAIN_FAN_RPM_2: u16 = 0x0465; // low byte
pub const SECOND_FAN_RPM_1: u16 = 0x046C;
pub const SECOND_FAN_RPM_2: u16 = 0x046D;

pub const BAT_ALERT: u16 = 0x0494;

// --- Identity
pub const PROJECT_ID: u16 = 0x0740;

pub const AP_OEM: u16 = 0x0741;
pub const ENABLE_MANUAL_CTRL: u8 = 1 << 0;

// --- Lightbar, AC bank
pub const LIGHTBAR_AC_CTRL: u16 = 0x0748;
pub const LIGHTBAR_APP_EXISTS: u8 = 1 << 0;
pub const LIGHTBAR_POWER_SAVE: u8 = 1 << 1;
pub const LIGHTBAR_S0_OFF: u8 = 1 << 2;
pub const LIGHTBAR_S3_OFF: u8 = 1 << 3; // breathing animation while suspended
pub const LIGHTBAR_WELCOME: u8 = 1 << 7; // rainbow animation
pub const LIGHTBAR_AC_RED: u16 = 0x0749;
pub const LIGHTBAR_AC_GREEN: u16 = 0x074A;
pub const LIGHTBAR_AC_BLUE: u16 = 0x074B;

pub const BIOS_OEM: u16 = 0x074E;
pub const FN_LOCK_STATUS: u8 = 1 << 4;

// --- Fan mode
pub const MANUAL_FAN_CTRL: u16 = 0x0751;
pub const FAN_LEVEL_MASK: u8 = 0b0000_0111;
pub const FAN_MODE_TURBO: u8 = 1 << 4;
pub const FAN_MODE_HIGH: u8 = 1 << 5;
pub const FAN_MODE_BOOST: u8 = 1 << 6;
pub const FAN_MODE_USER: u8 = 1 << 7;
/// Bits cleared when handing the fans back to the EC.
pub const FAN_AUTOMATIC_MASK: u8 = FAN_MODE_BOOST | FAN_MODE_TURBO | FAN_LEVEL_MASK;
/// Bits carrying the platform profile.
pub const FAN_PROFILE_MASK: u8 = FAN_MODE_USER | FAN_MODE_HIGH | FAN_MODE_TURBO;

// --- PWM duty readback (0..=200)
pub const PWM_1: u16 = 0x075B;
pub const PWM_2: u16 = 0x075C;

// --- Toggle-only controls
pub const TRIGGER: u16 = 0x0767;
pub const TRIGGER_SUPER_KEY_LOCK: u8 = 1 << 0;

pub const SWITCH_STATUS: u16 = 0x0768;
pub const SUPER_KEY_LOCK_STATUS: u8 = 1 << 0; // set = lock disabled

pub const OEM_4: u16 = 0x07A6;
pub const TOUCHPAD_TOGGLE_OFF: u8 = 1 << 6;

// --- Battery charge control
pub const CHARGE_CTRL: u16 = 0x07B9;
pub const CHARGE_CTRL_MASK: u8 = 0b0111_1111;
pub const CHARGE_CTRL_REACHED: u8 = 1 << 7;

// --- Lightbar, battery bank. Same bits as the AC control register except
// LIGHTBAR_S3_OFF.
pub const LIGHTBAR_BAT_CTRL: u16 = 0x07E2;
pub const LIGHTBAR_BAT_RED: u16 = 0x07E3;
pub const LIGHTBAR_BAT_GREEN: u16 = 0x07E4;
pub const LIGHTBAR_BAT_BLUE: u16 = 0x07E5;

// --- PWM duty write registers. Unstable on some models, see VariantConfig.
pub const PWM_1_WRITEABLE: u16 = 0x1804;
pub const PWM_2_WRITEABLE: u16 = 0x1809;

/// Number of entries in [`UNIWILL_REGISTERS`], used as the cache size.
pub const REGISTER_COUNT: usize = 27;

/// Access classification of every register the driver uses, sorted by address.
pub static UNIWILL_REGISTERS: [Register; REGISTER_COUNT] = [
    Register::new(CPU_TEMP, Access::READ.volatile()),
    Register::new(GPU_TEMP, Access::READ.volatile()),
    Register::new(MAIN_FAN_RPM_1, Access::READ.volatile()),
    Register::new(MAIN_FAN_RPM_2, Access::READ.volatile()),
    Register::new(SECOND_FAN_RPM_1, Access::READ.volatile()),
    Register::new(SECOND_FAN_RPM_2, Access::READ.volatile()),
    Register::new(BAT_ALERT, Access::READ.volatile()),
    Register::new(PROJECT_ID, Access::READ),
    Register::new(AP_OEM, Access::READ_WRITE),
    Register::new(LIGHTBAR_AC_CTRL, Access::READ_WRITE),
    Register::new(LIGHTBAR_AC_RED, Access::READ_WRITE),
    Register::new(LIGHTBAR_AC_GREEN, Access::READ_WRITE),
    Register::new(LIGHTBAR_AC_BLUE, Access::READ_WRITE),
    Register::new(BIOS_OEM, Access::READ_WRITE),
    Register::new(MANUAL_FAN_CTRL, Access::READ_WRITE.volatile()),
    Register::new(PWM_1, Access::READ.volatile()),
    Register::new(PWM_2, Access::READ.volatile()),
    Register::new(TRIGGER, Access::READ_WRITE.volatile()),
    Register::new(SWITCH_STATUS, Access::READ.volatile()),
    Register::new(OEM_4, Access::READ_WRITE),
    // Volatile because of CHARGE_CTRL_REACHED.
    Register::new(CHARGE_CTRL, Access::READ_WRITE.volatile()),
    Register::new(LIGHTBAR_BAT_CTRL, Access::READ_WRITE),
    Register::new(LIGHTBAR_BAT_RED, Access::READ_WRITE),
    Register::new(LIGHTBAR_BAT_GREEN, Access::READ_WRITE),
    Register::new(LIGHTBAR_BAT_BLUE, Access::READ_WRITE),
    Register::new(PWM_1_WRITEABLE, Access::WRITE.volatile()),
    Register::new(PWM_2_WRITEABLE, Access::WRITE.volatile()),
];

/// Returns the access table for Uniwill notebooks.
pub fn uniwill_table() -> RegisterTable {
    RegisterTable::new(&UNIWILL_REGISTERS)
}
