pub mod battery;
pub mod builder;
pub mod config;
pub mod device;
pub mod error;
pub mod events;
pub mod fan;
pub mod handle;
pub mod lighting;
mod log;
pub mod map;
pub mod policy;
pub mod profile;
pub mod regs;
pub mod sensors;
pub mod switches;
pub(crate) mod table;
pub mod toggle;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use battery::{
    Batteries, BatteryAlertObserver, BatteryHealth, BatteryId, BatteryStatus, ChargeThreshold,
};
pub use builder::DeviceBuilder;
pub use config::VariantConfig;
pub use device::{Uniwill, UniwillMap};
pub use error::EcError;
pub use events::{
    Dispatched, EventDispatcher, EventObserver, Key, KeySink, KeymapEntry, NotifyResult,
    ObserverId,
};
pub use fan::{FanChannel, FanController, FanState};
pub use handle::SharedDevice;
pub use lighting::{LightbarState, LightingController};
pub use map::{BypassBus, Mode, RegisterIo, RegisterMap};
pub use policy::{Access, AccessPolicy, Register, RegisterTable};
pub use profile::{PlatformProfile, ProfileController};
pub use sensors::TempChannel;
pub use switches::Switches;
pub use toggle::ToggleGuard;
pub use transport::{MethodCall, MethodTransport, RegisterTransport, TransportError};

pub mod prelude {
    pub use super::{
        AccessPolicy, BatteryHealth, BatteryStatus, DeviceBuilder, EcError, EventDispatcher,
        EventObserver, FanChannel, FanState, Key, KeySink, MethodCall, NotifyResult,
        PlatformProfile, RegisterIo, RegisterTransport, SharedDevice, TempChannel, TransportError,
        Uniwill, VariantConfig,
    };
}
