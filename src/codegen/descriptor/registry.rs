use std::mem::size_of;

use thiserror::Error;
use tracing::{debug, info};

use super::conventions::Key;
use super::spec::{GeneratedTypeProvider, SpecKind};
use super::{DataError, Descriptor, DescriptorData};
use crate::codegen::machine::{MachineType, TargetIsa};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("descriptor registry is already initialized")]
    AlreadyInitialized,
    #[error("{key:?}: {source}")]
    Data {
        key: Key,
        #[source]
        source: DataError,
    },
    #[error("{key:?}: {requested} register parameters requested, target allows at most {max}")]
    TooManyRegisterParams {
        key: Key,
        requested: usize,
        max: usize,
    },
    #[error("{key:?}: {registers} register parameters for {params} declared parameters")]
    MoreRegistersThanParams {
        key: Key,
        registers: usize,
        params: usize,
    },
    #[error("{key:?}: reserved register {register} used as a parameter register")]
    ReservedRegister { key: Key, register: &'static str },
    #[error(
        "{key:?}: floating-point parameter {index} lives in register {register}, \
         which cannot carry floats on this target"
    )]
    InvalidFloatRegister {
        key: Key,
        index: usize,
        register: &'static str,
    },
    #[error("{key:?}: stack parameter {index} has untagged type {ty} in a scanned convention")]
    UntaggedStackParameter {
        key: Key,
        index: usize,
        ty: MachineType,
    },
    #[error("{key:?}: convention left unresolved")]
    Unresolved { key: Key },
    #[error("{key:?} extends {parent:?}, which is not a static convention")]
    ExtensionOfGenerated { key: Key, parent: Key },
    #[error("{key:?}: declared parameter {index} does not repeat that of {parent:?}")]
    ExtensionPrefixMismatch { key: Key, parent: Key, index: usize },
    #[error("{key:?}: resolved {what} {index} disagrees with parent {parent:?}")]
    ExtensionResolutionMismatch {
        key: Key,
        parent: Key,
        what: &'static str,
        index: usize,
    },
    #[error("{key:?}: stub compiler supplied {actual} {what} types, declaration has {expected}")]
    GeneratedTypeCountMismatch {
        key: Key,
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Holds the resolved [`DescriptorData`] of every convention for one
/// target. The process owns exactly one of these per target; it is
/// explicit state rather than a global so tests can build and tear down
/// their own.
#[derive(Debug)]
pub struct DescriptorRegistry<T: TargetIsa> {
    data: Box<[DescriptorData<T::Reg>]>,
    initialized: bool,
}

impl<T: TargetIsa> Default for DescriptorRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TargetIsa> DescriptorRegistry<T> {
    pub fn new() -> Self {
        Self {
            data: (0..Key::all().len()).map(|_| DescriptorData::new()).collect(),
            initialized: false,
        }
    }

    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Resolve every convention against the target. `provider` supplies the
    /// machine types of generated conventions. On error the registry stays
    /// uninitialized; the caller aborts startup.
    pub fn initialize_once_per_process(
        &mut self,
        provider: &dyn GeneratedTypeProvider,
    ) -> Result<(), ConfigError> {
        if self.initialized {
            return Err(ConfigError::AlreadyInitialized);
        }
        debug!(conventions = Key::all().len(), "resolving calling conventions");
        for key in Key::all().iter().copied() {
            key.spec::<T>()
                .initialize(key, &mut self.data[key.index()], provider)?;
        }
        self.validate_extensions()?;
        self.initialized = true;

        debug_assert!(self.descriptor(Key::ContextOnly).has_context_parameter());
        for key in [
            Key::NoContext,
            Key::Allocate,
            Key::Abort,
            Key::WasmFloat32ToNumber,
            Key::WasmFloat64ToNumber,
        ] {
            debug_assert!(!self.descriptor(key).has_context_parameter());
        }

        info!("calling convention registry initialized");
        Ok(())
    }

    /// An extending convention must repeat its parent's parameters, their
    /// resolved types, and the common register prefix, so callers set up
    /// for the parent can call the extension unchanged.
    fn validate_extensions(&self) -> Result<(), ConfigError> {
        for key in Key::all().iter().copied() {
            let SpecKind::<T>::Static(spec) = key.spec() else {
                continue;
            };
            let Some(parent) = spec.extends else {
                continue;
            };
            let SpecKind::<T>::Static(parent_spec) = parent.spec() else {
                return Err(ConfigError::ExtensionOfGenerated { key, parent });
            };
            let prefix_len = parent_spec.params.len();
            for index in 0..prefix_len {
                if spec.params.get(index) != Some(&parent_spec.params[index]) {
                    return Err(ConfigError::ExtensionPrefixMismatch { key, parent, index });
                }
            }
            let data = &self.data[key.index()];
            let parent_data = &self.data[parent.index()];
            for index in 0..prefix_len {
                if data.param_type(index) != parent_data.param_type(index) {
                    return Err(ConfigError::ExtensionResolutionMismatch {
                        key,
                        parent,
                        what: "parameter type",
                        index,
                    });
                }
            }
            let shared_regs = prefix_len
                .min(data.register_param_count())
                .min(parent_data.register_param_count());
            for index in 0..shared_regs {
                if data.register_param(index) != parent_data.register_param(index) {
                    return Err(ConfigError::ExtensionResolutionMismatch {
                        key,
                        parent,
                        what: "register parameter",
                        index,
                    });
                }
            }
        }
        Ok(())
    }

    /// Drop all resolved state. Asserts the registry was initialized;
    /// intended for test isolation and orderly shutdown.
    pub fn tear_down(&mut self) {
        assert!(
            self.initialized,
            "tear-down of an uninitialized descriptor registry"
        );
        for data in &mut self.data {
            data.reset();
        }
        self.initialized = false;
    }

    pub fn data_for_key(&self, key: Key) -> &DescriptorData<T::Reg> {
        assert!(
            self.initialized,
            "descriptor registry accessed before initialization"
        );
        &self.data[key.index()]
    }

    pub fn descriptor(&self, key: Key) -> Descriptor<'_, T> {
        Descriptor::new(key, self.data_for_key(key))
    }

    /// Inverse of [`Self::data_for_key`]: recover the key from a data
    /// reference that points into this registry. Passing data that does
    /// not belong to this registry is a caller bug and aborts.
    pub fn key_for_data(&self, data: &DescriptorData<T::Reg>) -> Key {
        self.try_key_for_data(data).unwrap_or_else(|| {
            panic!(
                "descriptor data at {:p} does not belong to this registry",
                std::ptr::from_ref(data)
            )
        })
    }

    fn try_key_for_data(&self, data: &DescriptorData<T::Reg>) -> Option<Key> {
        let base = self.data.as_ptr() as usize;
        let addr = std::ptr::from_ref(data) as usize;
        let offset = addr.checked_sub(base)?;
        if offset % size_of::<DescriptorData<T::Reg>>() != 0 {
            return None;
        }
        let index = offset / size_of::<DescriptorData<T::Reg>>();
        Key::all().get(index).copied()
    }
}
