use core::marker::PhantomData;

use crate::ec::{
    EcError,
    config::VariantConfig,
    device::Uniwill,
    transport::{MethodCall, MethodTransport, RegisterTransport},
};

// Builder states
pub struct NeedTransport;
pub struct NeedVariant;
pub struct Ready;

/// Typestate builder for [`Uniwill`].
///
/// ```rust,ignore
/// let dev = DeviceBuilder::new()
///     .method_call(wmi)
///     .variant(VariantConfig::INTEL_NUC_X15)
///     .attach()?;
/// ```
pub struct DeviceBuilder<T, State> {
    transport: T,
    variant: Option<VariantConfig>,
    _state: PhantomData<State>,
}

impl Default for DeviceBuilder<(), NeedTransport> {
    fn default() -> Self {
        Self::new()
    }
}

// Start the builder
impl DeviceBuilder<(), NeedTransport> {
    pub fn new() -> Self {
        DeviceBuilder {
            transport: (),
            variant: None,
            _state: PhantomData,
        }
    }

    pub fn transport<T: RegisterTransport>(self, transport: T) -> DeviceBuilder<T, NeedVariant> {
        DeviceBuilder {
            transport,
            variant: None,
            _state: PhantomData,
        }
    }

    /// Reach the EC through a raw firmware method call.
    pub fn method_call<C: MethodCall>(
        self,
        call: C,
    ) -> DeviceBuilder<MethodTransport<C>, NeedVariant> {
        self.transport(MethodTransport::new(call))
    }
}

// Set the variant
impl<T: RegisterTransport> DeviceBuilder<T, NeedVariant> {
    pub fn variant(self, variant: VariantConfig) -> DeviceBuilder<T, Ready> {
        DeviceBuilder {
            transport: self.transport,
            variant: Some(variant),
            _state: PhantomData,
        }
    }

    /// Use the Intel NUC x15 configuration
    pub fn default_variant(self) -> DeviceBuilder<T, Ready> {
        self.variant(VariantConfig::default())
    }
}

// Attach to the hardware
impl<T: RegisterTransport> DeviceBuilder<T, Ready> {
    /// Initializes the EC and returns the device.
    pub fn attach(self) -> Result<Uniwill<T>, EcError> {
        Uniwill::attach(self.transport, self.variant.unwrap_or_default())
    }
}
