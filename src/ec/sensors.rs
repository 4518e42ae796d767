use crate::ec::{EcError, fan::FanChannel, map::RegisterIo, regs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TempChannel {
    Cpu,
    Gpu,
}

impl TempChannel {
    pub const ALL: [TempChannel; 2] = [TempChannel::Cpu, TempChannel::Gpu];

    pub fn label(self) -> &'static str {
        match self {
            TempChannel::Cpu => "CPU",
            TempChannel::Gpu => "GPU",
        }
    }

    fn addr(self) -> u16 {
        match self {
            TempChannel::Cpu => regs::CPU_TEMP,
            TempChannel::Gpu => regs::GPU_TEMP,
        }
    }
}

/// Temperature in millidegrees Celsius.
pub fn temperature<M: RegisterIo>(map: &mut M, channel: TempChannel) -> Result<i32, EcError> {
    let raw = map.read(channel.addr())?;
    Ok(i32::from(raw) * 1000)
}

/// Fan speed in RPM.
pub fn fan_speed<M: RegisterIo>(map: &mut M, channel: FanChannel) -> Result<u16, EcError> {
    map.read_be16(channel.rpm_addr())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ec::test_support::uniwill_map;

    #[test]
    fn temperature_in_millidegrees() {
        let mut map = uniwill_map();
        map.transport_mut().poke(regs::CPU_TEMP, 62);
        map.transport_mut().poke(regs::GPU_TEMP, 0);

        assert_eq!(temperature(&mut map, TempChannel::Cpu).unwrap(), 62_000);
        assert_eq!(temperature(&mut map, TempChannel::Gpu).unwrap(), 0);
    }

    #[test]
    fn fan_speed_is_big_endian() {
        let mut map = uniwill_map();
        map.transport_mut().poke(regs::SECOND_FAN_RPM_1, 0x0A);
        map.transport_mut().poke(regs::SECOND_FAN_RPM_2, 0x8C);

        assert_eq!(fan_speed(&mut map, FanChannel::Secondary).unwrap(), 2700);
        assert_eq!(fan_speed(&mut map, FanChannel::Main).unwrap(), 0);
    }

    #[test]
    fn sensor_reads_are_never_cached() {
        let mut map = uniwill_map();
        temperature(&mut map, TempChannel::Cpu).unwrap();
        map.transport_mut().poke(regs::CPU_TEMP, 40);

        assert_eq!(temperature(&mut map, TempChannel::Cpu).unwrap(), 40_000);
    }

    #[test]
    fn labels() {
        let labels: std::vec::Vec<_> = TempChannel::ALL
            .iter()
            .map(|c| c.label())
            .chain(FanChannel::ALL.iter().map(|c| c.label()))
            .collect();
        assert_eq!(labels, ["CPU", "GPU", "Main", "Secondary"]);
    }
}
