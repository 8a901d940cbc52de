use smallvec::SmallVec;
use tracing::trace;

use super::conventions::Key;
use super::registry::ConfigError;
use super::{DescriptorData, Flags, StackArgumentOrder};
use crate::codegen::machine::{MachineType, PhysicalRegister, TargetIsa};

/// A declared parameter: name plus the machine type it crosses the call
/// boundary with.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub ty: MachineType,
}

/// How the register parameters of a convention are chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterPolicy<T: TargetIsa> {
    /// Take registers from the target's default allocation order. `None`
    /// uses one register per parameter, capped by the target.
    Default { count: Option<usize> },
    /// JS-shaped prefix registers plus `extra` convention-specific ones.
    JsCall { extra: usize },
    /// An explicit pinned register list. On targets that pass tail
    /// arguments on the stack, the last `stack_tail` entries are dropped
    /// and those parameters become stack parameters.
    Fixed {
        regs: SmallVec<[T::Reg; 8]>,
        stack_tail: usize,
    },
    /// Every parameter is passed on the stack.
    OnStack,
}

impl<T: TargetIsa> RegisterPolicy<T> {
    pub fn fixed(regs: SmallVec<[T::Reg; 8]>) -> Self {
        Self::Fixed {
            regs,
            stack_tail: 0,
        }
    }

    fn resolve(&self, key: Key, param_count: usize) -> Result<SmallVec<[T::Reg; 8]>, ConfigError> {
        match self {
            Self::Default { count } => {
                let count =
                    count.unwrap_or_else(|| param_count.min(T::MAX_BUILTIN_REGISTER_PARAMS));
                if count > T::MAX_BUILTIN_REGISTER_PARAMS {
                    return Err(ConfigError::TooManyRegisterParams {
                        key,
                        requested: count,
                        max: T::MAX_BUILTIN_REGISTER_PARAMS,
                    });
                }
                Ok(T::default_register_params(count))
            }
            Self::JsCall { extra } => Ok(T::js_call_registers(*extra)),
            Self::Fixed { regs, stack_tail } => {
                let mut regs = regs.clone();
                if T::PASS_TAIL_ARGS_ON_STACK {
                    regs.truncate(regs.len().saturating_sub(*stack_tail));
                }
                Ok(regs)
            }
            Self::OnStack => Ok(SmallVec::new()),
        }
    }
}

/// Declarative description of a static convention. The construction
/// routine in [`SpecKind::initialize`] turns this into resolved
/// [`DescriptorData`]; there is no per-convention initialization code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSpec<T: TargetIsa> {
    pub returns: &'static [MachineType],
    pub params: &'static [Param],
    /// When false the declared types are ignored and everything resolves
    /// to `AnyTagged`.
    pub explicit_types: bool,
    pub flags: Flags,
    pub stack_order: StackArgumentOrder,
    pub registers: RegisterPolicy<T>,
    /// Narrow the allocatable set to exactly the register parameters.
    pub restrict_to_params: bool,
    /// Convention whose parameter list this one repeats as a prefix.
    pub extends: Option<Key>,
}

const TAGGED_RETURN: &[MachineType] = &[MachineType::AnyTagged];

impl<T: TargetIsa> DescriptorSpec<T> {
    /// A typed internal stub: one tagged return, a context, default
    /// register assignment.
    pub fn stub(params: &'static [Param]) -> Self {
        Self {
            returns: TAGGED_RETURN,
            params,
            explicit_types: true,
            flags: Flags::empty(),
            stack_order: StackArgumentOrder::Default,
            registers: RegisterPolicy::Default { count: None },
            restrict_to_params: false,
            extends: None,
        }
    }

    /// A stub whose types were never spelled out; everything is tagged.
    pub fn untyped(params: &'static [Param]) -> Self {
        Self {
            explicit_types: false,
            ..Self::stub(params)
        }
    }

    pub fn no_context(params: &'static [Param]) -> Self {
        Self {
            flags: Flags::NO_CONTEXT,
            ..Self::stub(params)
        }
    }

    /// A variable-arity convention with JS stack argument order but a
    /// default register assignment.
    pub fn varargs(params: &'static [Param]) -> Self {
        Self {
            flags: Flags::ALLOW_VAR_ARGS,
            stack_order: StackArgumentOrder::JsCall,
            ..Self::stub(params)
        }
    }

    /// A JS-shaped convention. `params` must start with the JS prefix
    /// (target, new target, argument count); `extra` of them beyond the
    /// prefix are register parameters.
    pub fn js(params: &'static [Param], extra: usize) -> Self {
        debug_assert!(params.len() >= 3 && extra <= params.len() - 3);
        Self {
            flags: Flags::ALLOW_VAR_ARGS,
            stack_order: StackArgumentOrder::JsCall,
            registers: RegisterPolicy::JsCall { extra },
            ..Self::stub(params)
        }
    }

    /// A convention invoked straight from native code, outside any managed
    /// frame.
    pub fn entry(params: &'static [Param]) -> Self {
        Self {
            flags: Flags::NO_CONTEXT | Flags::NO_STACK_SCAN,
            ..Self::stub(params)
        }
    }

    fn initialize(
        &self,
        key: Key,
        data: &mut DescriptorData<T::Reg>,
    ) -> Result<(), ConfigError> {
        let regs = self.registers.resolve(key, self.params.len())?;
        if let Some(reg) = regs.iter().find(|&&reg| reg == T::ROOT) {
            return Err(ConfigError::ReservedRegister {
                key,
                register: reg.name(),
            });
        }
        let wrap = |source| ConfigError::Data { key, source };
        data.set_register_assignment(&regs).map_err(wrap)?;
        if self.restrict_to_params {
            data.restrict_allocatable_registers(&regs).map_err(wrap)?;
        }
        let types: Option<Vec<MachineType>> = self.explicit_types.then(|| {
            self.returns
                .iter()
                .copied()
                .chain(self.params.iter().map(|p| p.ty))
                .collect()
        });
        data.set_type_assignment(
            self.flags,
            self.returns.len(),
            self.params.len(),
            types.as_deref(),
            self.stack_order,
        )
        .map_err(wrap)?;
        validate::<T>(key, data)
    }
}

/// Shape of a convention whose types come from generated code; only the
/// counts are fixed here, the types are supplied at registry
/// initialization.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GeneratedSpec {
    pub return_count: usize,
    pub param_count: usize,
    pub has_context: bool,
}

/// Source of machine types for generated conventions.
pub trait GeneratedTypeProvider {
    fn return_types(&self, key: Key) -> Vec<MachineType>;
    fn parameter_types(&self, key: Key) -> Vec<MachineType>;
}

impl GeneratedSpec {
    fn initialize<T: TargetIsa>(
        self,
        key: Key,
        data: &mut DescriptorData<T::Reg>,
        provider: &dyn GeneratedTypeProvider,
    ) -> Result<(), ConfigError> {
        let reg_count = self.param_count.min(T::MAX_STUB_REGISTER_PARAMS);
        let regs = T::default_register_params(reg_count);
        let wrap = |source| ConfigError::Data { key, source };
        data.set_register_assignment(&regs).map_err(wrap)?;

        let mut types = provider.return_types(key);
        if types.len() != self.return_count {
            return Err(ConfigError::GeneratedTypeCountMismatch {
                key,
                what: "return",
                expected: self.return_count,
                actual: types.len(),
            });
        }
        let params = provider.parameter_types(key);
        if params.len() != self.param_count {
            return Err(ConfigError::GeneratedTypeCountMismatch {
                key,
                what: "parameter",
                expected: self.param_count,
                actual: params.len(),
            });
        }
        types.extend(params);

        let flags = if self.has_context {
            Flags::empty()
        } else {
            Flags::NO_CONTEXT
        };
        data.set_type_assignment(
            flags,
            self.return_count,
            self.param_count,
            Some(&types),
            StackArgumentOrder::Default,
        )
        .map_err(wrap)?;
        validate::<T>(key, data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecKind<T: TargetIsa> {
    Static(DescriptorSpec<T>),
    Generated(GeneratedSpec),
}

impl<T: TargetIsa> SpecKind<T> {
    pub(crate) fn initialize(
        &self,
        key: Key,
        data: &mut DescriptorData<T::Reg>,
        provider: &dyn GeneratedTypeProvider,
    ) -> Result<(), ConfigError> {
        trace!(key = key.debug_name(), "resolving calling convention");
        match self {
            Self::Static(spec) => spec.initialize(key, data),
            Self::Generated(spec) => spec.initialize::<T>(key, data, provider),
        }
    }
}

/// Cross-checks every resolved convention must pass, independent of how it
/// was described.
fn validate<T: TargetIsa>(key: Key, data: &DescriptorData<T::Reg>) -> Result<(), ConfigError> {
    if !data.is_initialized() {
        return Err(ConfigError::Unresolved { key });
    }
    let reg_count = data.register_param_count();
    let param_count = data.param_count();
    if reg_count > param_count {
        return Err(ConfigError::MoreRegistersThanParams {
            key,
            registers: reg_count,
            params: param_count,
        });
    }
    for index in 0..reg_count {
        let ty = data.param_type(index);
        let reg = data.register_param(index);
        if ty.is_floating_point() && !T::is_valid_float_parameter_register(reg) {
            return Err(ConfigError::InvalidFloatRegister {
                key,
                index,
                register: reg.name(),
            });
        }
    }
    // Stack parameters of scanned conventions are visited by the collector
    // and must therefore hold tagged values.
    if !data.flags().contains(Flags::NO_STACK_SCAN) {
        for index in reg_count..param_count {
            let ty = data.param_type(index);
            if !ty.is_tagged() {
                return Err(ConfigError::UntaggedStackParameter { key, index, ty });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::{
        DescriptorSpec, GeneratedTypeProvider, Key, MachineType, Param, RegisterPolicy, SpecKind,
    };
    use crate::codegen::descriptor::registry::ConfigError;
    use crate::codegen::descriptor::{DescriptorData, Flags};
    use crate::codegen::machine::TargetIsa;
    use crate::codegen::targets::ia32::IA32;
    use crate::codegen::targets::x86_64::{Reg, X86_64};

    /// x86-64 shaped target whose general registers cannot carry floats,
    /// to exercise the float validation path.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
    struct NoFloatIsa;

    impl TargetIsa for NoFloatIsa {
        type Reg = Reg;

        const MAX_BUILTIN_REGISTER_PARAMS: usize = X86_64::MAX_BUILTIN_REGISTER_PARAMS;
        const MAX_STUB_REGISTER_PARAMS: usize = X86_64::MAX_STUB_REGISTER_PARAMS;
        const PASS_TAIL_ARGS_ON_STACK: bool = false;
        const ROOT: Reg = X86_64::ROOT;
        const CONTEXT: Reg = X86_64::CONTEXT;
        const JS_CALL_TARGET: Reg = X86_64::JS_CALL_TARGET;
        const JS_CALL_NEW_TARGET: Reg = X86_64::JS_CALL_NEW_TARGET;
        const JS_CALL_ARG_COUNT: Reg = X86_64::JS_CALL_ARG_COUNT;
        const JS_CALL_EXTRA_ARGS: &'static [Reg] = X86_64::JS_CALL_EXTRA_ARGS;
        const JS_CALL_CODE_START: Reg = X86_64::JS_CALL_CODE_START;
        const JS_FUNCTION: Reg = X86_64::JS_FUNCTION;
        const INTERPRETER_ACCUMULATOR: Reg = X86_64::INTERPRETER_ACCUMULATOR;
        const INTERPRETER_BYTECODE_OFFSET: Reg = X86_64::INTERPRETER_BYTECODE_OFFSET;
        const INTERPRETER_BYTECODE_ARRAY: Reg = X86_64::INTERPRETER_BYTECODE_ARRAY;
        const INTERPRETER_DISPATCH_TABLE: Reg = X86_64::INTERPRETER_DISPATCH_TABLE;
        const LOAD_RECEIVER: Reg = X86_64::LOAD_RECEIVER;
        const LOAD_NAME: Reg = X86_64::LOAD_NAME;
        const LOAD_SLOT: Reg = X86_64::LOAD_SLOT;
        const LOAD_VECTOR: Reg = X86_64::LOAD_VECTOR;
        const LOAD_GLOBAL_VECTOR: Reg = X86_64::LOAD_GLOBAL_VECTOR;
        const LOAD_LOOKUP_START: Reg = X86_64::LOAD_LOOKUP_START;
        const STORE_RECEIVER: Reg = X86_64::STORE_RECEIVER;
        const STORE_NAME: Reg = X86_64::STORE_NAME;
        const STORE_VALUE: Reg = X86_64::STORE_VALUE;
        const STORE_SLOT: Reg = X86_64::STORE_SLOT;
        const STORE_VECTOR: Reg = X86_64::STORE_VECTOR;
        const STORE_MAP: Reg = X86_64::STORE_MAP;
        const ALLOCATE_SIZE: Reg = X86_64::ALLOCATE_SIZE;
        const RUNTIME_CALL_FUNCTION: Reg = X86_64::RUNTIME_CALL_FUNCTION;
        const RUNTIME_CALL_ARG_COUNT: Reg = X86_64::RUNTIME_CALL_ARG_COUNT;
        const RUNTIME_CALL_ARGV: Reg = X86_64::RUNTIME_CALL_ARGV;
        const TYPE_CONVERSION_ARGUMENT: Reg = X86_64::TYPE_CONVERSION_ARGUMENT;
        const API_GETTER_HOLDER: Reg = X86_64::API_GETTER_HOLDER;
        const API_GETTER_CALLBACK: Reg = X86_64::API_GETTER_CALLBACK;
        const GROW_OBJECT: Reg = X86_64::GROW_OBJECT;
        const GROW_KEY: Reg = X86_64::GROW_KEY;
        const BASELINE_LEAVE_PARAMS_SIZE: Reg = X86_64::BASELINE_LEAVE_PARAMS_SIZE;
        const BASELINE_LEAVE_WEIGHT: Reg = X86_64::BASELINE_LEAVE_WEIGHT;
        const ENTRY_ARG0: Reg = X86_64::ENTRY_ARG0;
        const ENTRY_ARG1: Reg = X86_64::ENTRY_ARG1;

        fn allocatable_registers() -> &'static [Reg] {
            X86_64::allocatable_registers()
        }

        fn is_valid_float_parameter_register(_reg: Reg) -> bool {
            false
        }
    }

    struct NoGenerated;

    impl GeneratedTypeProvider for NoGenerated {
        fn return_types(&self, key: Key) -> Vec<MachineType> {
            panic!("unexpected generated key {}", key.debug_name())
        }

        fn parameter_types(&self, key: Key) -> Vec<MachineType> {
            panic!("unexpected generated key {}", key.debug_name())
        }
    }

    fn resolve<T: TargetIsa>(
        spec: DescriptorSpec<T>,
    ) -> Result<DescriptorData<T::Reg>, ConfigError> {
        let mut data = DescriptorData::new();
        SpecKind::Static(spec).initialize(Key::Void, &mut data, &NoGenerated)?;
        Ok(data)
    }

    const FOUR_TAGGED: &[Param] = &[
        Param {
            name: "a",
            ty: MachineType::AnyTagged,
        },
        Param {
            name: "b",
            ty: MachineType::AnyTagged,
        },
        Param {
            name: "c",
            ty: MachineType::AnyTagged,
        },
        Param {
            name: "d",
            ty: MachineType::AnyTagged,
        },
    ];

    const SIX_TAGGED: &[Param] = &[
        Param {
            name: "a",
            ty: MachineType::AnyTagged,
        },
        Param {
            name: "b",
            ty: MachineType::AnyTagged,
        },
        Param {
            name: "c",
            ty: MachineType::AnyTagged,
        },
        Param {
            name: "d",
            ty: MachineType::AnyTagged,
        },
        Param {
            name: "e",
            ty: MachineType::AnyTagged,
        },
        Param {
            name: "f",
            ty: MachineType::AnyTagged,
        },
    ];

    #[test]
    fn default_policy_caps_register_params() {
        let data = resolve::<X86_64>(DescriptorSpec::stub(SIX_TAGGED)).unwrap();
        assert_eq!(data.register_param_count(), 5);
        assert_eq!(data.param_count(), 6);

        let data = resolve::<IA32>(DescriptorSpec::stub(SIX_TAGGED)).unwrap();
        assert_eq!(data.register_param_count(), 4);
    }

    #[test]
    fn explicit_count_above_target_limit_is_rejected() {
        let spec = DescriptorSpec::<IA32> {
            registers: RegisterPolicy::Default { count: Some(5) },
            ..DescriptorSpec::stub(SIX_TAGGED)
        };
        assert!(matches!(
            resolve(spec),
            Err(ConfigError::TooManyRegisterParams {
                requested: 5,
                max: 4,
                ..
            })
        ));
    }

    #[test]
    fn untyped_spec_resolves_to_all_tagged() {
        let data = resolve::<X86_64>(DescriptorSpec::untyped(FOUR_TAGGED)).unwrap();
        assert_eq!(data.return_count(), 1);
        assert_eq!(data.return_type(0), MachineType::AnyTagged);
        for i in 0..4 {
            assert_eq!(data.param_type(i), MachineType::AnyTagged);
        }
    }

    #[test]
    fn root_register_is_rejected() {
        let spec = DescriptorSpec::<X86_64> {
            registers: RegisterPolicy::fixed(smallvec![Reg::Rax, X86_64::ROOT]),
            ..DescriptorSpec::stub(FOUR_TAGGED)
        };
        assert!(matches!(
            resolve(spec),
            Err(ConfigError::ReservedRegister {
                register: "r13",
                ..
            })
        ));
    }

    #[test]
    fn more_registers_than_params_is_rejected() {
        let spec = DescriptorSpec::<X86_64> {
            registers: RegisterPolicy::Default { count: Some(3) },
            ..DescriptorSpec::stub(&FOUR_TAGGED[..2])
        };
        assert!(matches!(
            resolve(spec),
            Err(ConfigError::MoreRegistersThanParams {
                registers: 3,
                params: 2,
                ..
            })
        ));
    }

    #[test]
    fn float_params_require_capable_registers() {
        const FLOAT_PARAM: &[Param] = &[Param {
            name: "value",
            ty: MachineType::Float64,
        }];
        assert!(resolve::<X86_64>(DescriptorSpec::no_context(FLOAT_PARAM)).is_ok());
        assert!(matches!(
            resolve::<NoFloatIsa>(DescriptorSpec::no_context(FLOAT_PARAM)),
            Err(ConfigError::InvalidFloatRegister { index: 0, .. })
        ));
    }

    #[test]
    fn untagged_stack_params_need_scan_exemption() {
        const UNTAGGED: &[Param] = &[Param {
            name: "value",
            ty: MachineType::IntPtr,
        }];
        let on_stack = DescriptorSpec::<X86_64> {
            registers: RegisterPolicy::OnStack,
            ..DescriptorSpec::stub(UNTAGGED)
        };
        assert!(matches!(
            resolve(on_stack.clone()),
            Err(ConfigError::UntaggedStackParameter {
                index: 0,
                ty: MachineType::IntPtr,
                ..
            })
        ));
        let exempt = DescriptorSpec::<X86_64> {
            flags: Flags::NO_STACK_SCAN,
            ..on_stack
        };
        assert!(resolve(exempt).is_ok());
    }

    #[test]
    fn js_policy_uses_the_js_prefix() {
        let data = resolve::<X86_64>(DescriptorSpec {
            registers: RegisterPolicy::JsCall { extra: 1 },
            ..DescriptorSpec::stub(FOUR_TAGGED)
        })
        .unwrap();
        assert_eq!(data.register_param(0), X86_64::JS_CALL_TARGET);
        assert_eq!(data.register_param(1), X86_64::JS_CALL_NEW_TARGET);
        assert_eq!(data.register_param(2), X86_64::JS_CALL_ARG_COUNT);
        assert_eq!(data.register_param(3), X86_64::JS_CALL_EXTRA_ARGS[0]);
    }

    #[test]
    fn js_extra_registers_are_capped_per_target() {
        assert_eq!(X86_64::js_call_registers(2).len(), 5);
        // One spare JS register on ia32; the rest spills to the stack.
        assert_eq!(IA32::js_call_registers(2).len(), 4);
    }

    #[test]
    fn fixed_stack_tail_only_applies_on_scarce_targets() {
        let spec = |tail| DescriptorSpec::<X86_64> {
            registers: RegisterPolicy::Fixed {
                regs: smallvec![Reg::Rax, Reg::Rbx, Reg::Rcx],
                stack_tail: tail,
            },
            ..DescriptorSpec::stub(FOUR_TAGGED)
        };
        let data = resolve(spec(2)).unwrap();
        assert_eq!(data.register_param_count(), 3);

        let ia32_spec = DescriptorSpec::<IA32> {
            registers: RegisterPolicy::Fixed {
                regs: smallvec![
                    crate::codegen::targets::ia32::Reg::Edx,
                    crate::codegen::targets::ia32::Reg::Ecx,
                    crate::codegen::targets::ia32::Reg::Eax,
                ],
                stack_tail: 2,
            },
            ..DescriptorSpec::stub(FOUR_TAGGED)
        };
        let data = resolve(ia32_spec).unwrap();
        assert_eq!(data.register_param_count(), 1);
    }

    #[test]
    fn restriction_narrows_the_allocatable_set() {
        let spec = DescriptorSpec::<X86_64> {
            restrict_to_params: true,
            ..DescriptorSpec::no_context(FOUR_TAGGED)
        };
        let data = resolve(spec).unwrap();
        let restricted = data.restricted_allocatable().unwrap();
        assert_eq!(restricted.len(), data.register_param_count());
        for i in 0..restricted.len() {
            assert_eq!(restricted[i], data.register_param(i));
        }
    }
}
