use bitflags::bitflags;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::codegen::machine::{MachineType, PhysicalRegister, TargetIsa};

pub use conventions::Key;
pub use registry::{ConfigError, DescriptorRegistry};
pub use spec::{
    DescriptorSpec, GeneratedSpec, GeneratedTypeProvider, Param, RegisterPolicy, SpecKind,
};

pub mod conventions;
pub mod registry;
pub mod spec;

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
    pub struct Flags: u8 {
        /// The callee receives no context parameter.
        const NO_CONTEXT = 1 << 0;
        /// Stack arguments of this convention are never scanned by the
        /// collector, so untagged values may live there.
        const NO_STACK_SCAN = 1 << 1;
        /// Calls may push more arguments than the declared parameter count.
        const ALLOW_VAR_ARGS = 1 << 2;
    }
}

/// Placement order of stack parameters relative to declaration order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum StackArgumentOrder {
    /// Last declared parameter ends up last on the stack.
    #[default]
    Default,
    /// Arguments are pushed the way JS calls push them: last declared
    /// parameter is closest to the stack pointer.
    JsCall,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataError {
    #[error("register assignment applied twice")]
    RegistersAlreadyAssigned,
    #[error("type assignment applied twice")]
    TypesAlreadyAssigned,
    #[error("type assignment requires a completed register assignment")]
    RegistersNotAssigned,
    #[error("register {0} assigned to more than one parameter")]
    DuplicateRegister(&'static str),
    #[error("{actual} machine types supplied for {returns} returns and {params} parameters")]
    TypeCountMismatch {
        returns: usize,
        params: usize,
        actual: usize,
    },
    #[error("restricted allocatable set applied twice")]
    AlreadyRestricted,
    #[error("restricted allocatable set is empty")]
    EmptyAllocatableSet,
}

/// Resolved state of one calling convention.
///
/// Construction happens in two phases mirroring where the information comes
/// from: the register assignment is target-specific, the type assignment is
/// target-independent. Read accessors require both phases to have run.
#[derive(Debug)]
pub struct DescriptorData<R: PhysicalRegister> {
    register_params: Option<Box<[R]>>,
    restricted_allocatable: Option<Box<[R]>>,
    return_count: Option<usize>,
    param_count: Option<usize>,
    machine_types: Option<Box<[MachineType]>>,
    flags: Flags,
    stack_order: StackArgumentOrder,
}

impl<R: PhysicalRegister> Default for DescriptorData<R> {
    fn default() -> Self {
        Self {
            register_params: None,
            restricted_allocatable: None,
            return_count: None,
            param_count: None,
            machine_types: None,
            flags: Flags::empty(),
            stack_order: StackArgumentOrder::default(),
        }
    }
}

impl<R: PhysicalRegister> DescriptorData<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase one: bind the register parameters. `registers` holds the
    /// registers of the first `registers.len()` parameters; the remaining
    /// parameters live on the stack.
    pub fn set_register_assignment(&mut self, registers: &[R]) -> Result<(), DataError> {
        if self.register_params.is_some() {
            return Err(DataError::RegistersAlreadyAssigned);
        }
        let mut seen = FxHashSet::default();
        for reg in registers {
            if !seen.insert(*reg) {
                return Err(DataError::DuplicateRegister(reg.name()));
            }
        }
        self.register_params = Some(registers.into());
        Ok(())
    }

    /// Phase two: bind counts, flags and machine types. `types` of `None`
    /// means every return and parameter is `AnyTagged`.
    pub fn set_type_assignment(
        &mut self,
        flags: Flags,
        return_count: usize,
        param_count: usize,
        types: Option<&[MachineType]>,
        stack_order: StackArgumentOrder,
    ) -> Result<(), DataError> {
        if self.register_params.is_none() {
            return Err(DataError::RegistersNotAssigned);
        }
        if self.machine_types.is_some() {
            return Err(DataError::TypesAlreadyAssigned);
        }
        let total = return_count + param_count;
        let machine_types: Box<[MachineType]> = match types {
            Some(types) => {
                if types.len() != total {
                    return Err(DataError::TypeCountMismatch {
                        returns: return_count,
                        params: param_count,
                        actual: types.len(),
                    });
                }
                types.into()
            }
            None => vec![MachineType::AnyTagged; total].into(),
        };
        self.return_count = Some(return_count);
        self.param_count = Some(param_count);
        self.machine_types = Some(machine_types);
        self.flags = flags;
        self.stack_order = stack_order;
        Ok(())
    }

    /// Narrow the allocatable set visible through this convention. Used by
    /// write-barrier style stubs that must not clobber unrelated registers.
    pub fn restrict_allocatable_registers(&mut self, registers: &[R]) -> Result<(), DataError> {
        if self.restricted_allocatable.is_some() {
            return Err(DataError::AlreadyRestricted);
        }
        if registers.is_empty() {
            return Err(DataError::EmptyAllocatableSet);
        }
        self.restricted_allocatable = Some(registers.into());
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.register_params.is_some() && self.machine_types.is_some()
    }

    /// Drop all resolved state, returning to the unconstructed phase.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn return_count(&self) -> usize {
        self.return_count
            .expect("descriptor data accessed before initialization")
    }

    pub fn param_count(&self) -> usize {
        self.param_count
            .expect("descriptor data accessed before initialization")
    }

    pub fn register_param_count(&self) -> usize {
        self.register_params().map_or(0, <[R]>::len)
    }

    pub fn register_param(&self, index: usize) -> R {
        self.register_params
            .as_deref()
            .expect("descriptor data accessed before initialization")[index]
    }

    /// `None` exactly when the convention has zero register parameters.
    pub fn register_params(&self) -> Option<&[R]> {
        let regs = self
            .register_params
            .as_deref()
            .expect("descriptor data accessed before initialization");
        (!regs.is_empty()).then_some(regs)
    }

    pub fn return_type(&self, index: usize) -> MachineType {
        assert!(index < self.return_count());
        self.types()[index]
    }

    pub fn param_type(&self, index: usize) -> MachineType {
        assert!(index < self.param_count());
        self.types()[self.return_count() + index]
    }

    pub fn flags(&self) -> Flags {
        assert!(self.is_initialized());
        self.flags
    }

    pub fn stack_order(&self) -> StackArgumentOrder {
        assert!(self.is_initialized());
        self.stack_order
    }

    pub fn restricted_allocatable(&self) -> Option<&[R]> {
        self.restricted_allocatable.as_deref()
    }

    fn types(&self) -> &[MachineType] {
        self.machine_types
            .as_deref()
            .expect("descriptor data accessed before initialization")
    }
}

/// Read view over one resolved convention, as handed out by the registry.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor<'a, T: TargetIsa> {
    key: Key,
    data: &'a DescriptorData<T::Reg>,
}

impl<'a, T: TargetIsa> Descriptor<'a, T> {
    pub(crate) const fn new(key: Key, data: &'a DescriptorData<T::Reg>) -> Self {
        Self { key, data }
    }

    pub const fn key(&self) -> Key {
        self.key
    }

    pub fn debug_name(&self) -> &'static str {
        self.key.debug_name()
    }

    pub fn return_count(&self) -> usize {
        self.data.return_count()
    }

    pub fn parameter_count(&self) -> usize {
        self.data.param_count()
    }

    pub fn register_parameter_count(&self) -> usize {
        self.data.register_param_count()
    }

    pub fn stack_parameter_count(&self) -> usize {
        self.data.param_count() - self.data.register_param_count()
    }

    pub fn register_parameter(&self, index: usize) -> T::Reg {
        self.data.register_param(index)
    }

    pub fn return_type(&self, index: usize) -> MachineType {
        self.data.return_type(index)
    }

    pub fn parameter_type(&self, index: usize) -> MachineType {
        self.data.param_type(index)
    }

    pub fn flags(&self) -> Flags {
        self.data.flags()
    }

    pub fn has_context_parameter(&self) -> bool {
        !self.data.flags().contains(Flags::NO_CONTEXT)
    }

    /// The context, when present, is passed after every declared parameter.
    pub fn context_parameter_index(&self) -> Option<usize> {
        self.has_context_parameter().then(|| self.parameter_count())
    }

    pub fn allows_var_args(&self) -> bool {
        self.data.flags().contains(Flags::ALLOW_VAR_ARGS)
    }

    pub fn stack_argument_order(&self) -> StackArgumentOrder {
        self.data.stack_order()
    }

    /// Slot of a stack parameter, counted from the stack pointer upward.
    /// `index` is the parameter's declaration index and must refer to a
    /// stack parameter.
    pub fn stack_argument_slot(&self, index: usize) -> usize {
        let reg_count = self.register_parameter_count();
        assert!(
            index >= reg_count && index < self.parameter_count(),
            "parameter {index} of {} is not a stack parameter",
            self.debug_name()
        );
        let stack_index = index - reg_count;
        match self.stack_argument_order() {
            StackArgumentOrder::Default => stack_index,
            StackArgumentOrder::JsCall => self.stack_parameter_count() - 1 - stack_index,
        }
    }

    /// Registers a stub with this convention may allocate from. Most
    /// conventions see the full default set; restricted conventions see
    /// exactly their declared subset.
    pub fn allocatable_registers(&self) -> &'a [T::Reg] {
        self.data
            .restricted_allocatable()
            .unwrap_or_else(|| T::allocatable_registers())
    }

    /// Declaration index of a named parameter, for static conventions.
    pub fn parameter_index(&self, name: &str) -> Option<usize> {
        match self.key.spec::<T>() {
            SpecKind::Static(spec) => spec.params.iter().position(|p| p.name == name),
            SpecKind::Generated(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DataError, Descriptor, DescriptorData, Flags, Key, MachineType, StackArgumentOrder,
    };
    use crate::codegen::targets::x86_64::{Reg, X86_64};

    fn assigned() -> DescriptorData<Reg> {
        let mut data = DescriptorData::new();
        data.set_register_assignment(&[Reg::Rax, Reg::Rbx]).unwrap();
        data
    }

    #[test]
    fn two_phase_construction() {
        let mut data = assigned();
        assert!(!data.is_initialized());
        data.set_type_assignment(
            Flags::empty(),
            1,
            3,
            None,
            StackArgumentOrder::Default,
        )
        .unwrap();
        assert!(data.is_initialized());
        assert_eq!(data.return_count(), 1);
        assert_eq!(data.param_count(), 3);
        assert_eq!(data.register_param_count(), 2);
        assert_eq!(data.register_param(0), Reg::Rax);
        assert_eq!(data.register_param(1), Reg::Rbx);
        // No explicit types: everything defaults to AnyTagged.
        assert_eq!(data.return_type(0), MachineType::AnyTagged);
        for i in 0..3 {
            assert_eq!(data.param_type(i), MachineType::AnyTagged);
        }
    }

    #[test]
    fn phase_order_is_enforced() {
        let mut data = DescriptorData::<Reg>::new();
        assert_eq!(
            data.set_type_assignment(Flags::empty(), 1, 0, None, StackArgumentOrder::Default),
            Err(DataError::RegistersNotAssigned)
        );
        data.set_register_assignment(&[Reg::Rax]).unwrap();
        assert_eq!(
            data.set_register_assignment(&[Reg::Rbx]),
            Err(DataError::RegistersAlreadyAssigned)
        );
        data.set_type_assignment(Flags::empty(), 1, 1, None, StackArgumentOrder::Default)
            .unwrap();
        assert_eq!(
            data.set_type_assignment(Flags::empty(), 1, 1, None, StackArgumentOrder::Default),
            Err(DataError::TypesAlreadyAssigned)
        );
    }

    #[test]
    fn duplicate_registers_are_rejected() {
        let mut data = DescriptorData::<Reg>::new();
        assert_eq!(
            data.set_register_assignment(&[Reg::Rax, Reg::Rbx, Reg::Rax]),
            Err(DataError::DuplicateRegister("rax"))
        );
    }

    #[test]
    fn explicit_type_count_must_match() {
        let mut data = assigned();
        let types = [MachineType::AnyTagged, MachineType::Int32];
        assert_eq!(
            data.set_type_assignment(
                Flags::empty(),
                1,
                2,
                Some(&types),
                StackArgumentOrder::Default,
            ),
            Err(DataError::TypeCountMismatch {
                returns: 1,
                params: 2,
                actual: 2
            })
        );
    }

    #[test]
    fn register_params_is_none_only_when_empty() {
        let mut data = DescriptorData::<Reg>::new();
        data.set_register_assignment(&[]).unwrap();
        data.set_type_assignment(Flags::empty(), 1, 2, None, StackArgumentOrder::Default)
            .unwrap();
        assert!(data.register_params().is_none());
        assert_eq!(data.register_param_count(), 0);

        let mut data = assigned();
        data.set_type_assignment(Flags::empty(), 1, 2, None, StackArgumentOrder::Default)
            .unwrap();
        assert_eq!(data.register_params().unwrap().len(), 2);
    }

    #[test]
    fn restriction_rules() {
        let mut data = assigned();
        assert_eq!(
            data.restrict_allocatable_registers(&[]),
            Err(DataError::EmptyAllocatableSet)
        );
        data.restrict_allocatable_registers(&[Reg::Rax, Reg::Rbx])
            .unwrap();
        assert_eq!(
            data.restrict_allocatable_registers(&[Reg::Rax]),
            Err(DataError::AlreadyRestricted)
        );
        assert_eq!(
            data.restricted_allocatable(),
            Some([Reg::Rax, Reg::Rbx].as_slice())
        );
    }

    #[test]
    fn reset_returns_to_unconstructed() {
        let mut data = assigned();
        data.set_type_assignment(Flags::empty(), 1, 2, None, StackArgumentOrder::Default)
            .unwrap();
        data.reset();
        assert!(!data.is_initialized());
        data.set_register_assignment(&[Reg::Rcx]).unwrap();
        data.set_type_assignment(Flags::empty(), 1, 1, None, StackArgumentOrder::Default)
            .unwrap();
        assert_eq!(data.register_param(0), Reg::Rcx);
    }

    #[test]
    #[should_panic(expected = "descriptor data accessed before initialization")]
    fn reads_before_initialization_panic() {
        let data = DescriptorData::<Reg>::new();
        let _ = data.param_count();
    }

    #[test]
    fn stack_slots_follow_declared_order_by_default() {
        let mut data = assigned();
        data.set_type_assignment(Flags::empty(), 1, 5, None, StackArgumentOrder::Default)
            .unwrap();
        let desc = Descriptor::<X86_64>::new(Key::Void, &data);
        assert_eq!(desc.stack_parameter_count(), 3);
        assert_eq!(desc.stack_argument_slot(2), 0);
        assert_eq!(desc.stack_argument_slot(3), 1);
        assert_eq!(desc.stack_argument_slot(4), 2);
    }

    #[test]
    fn js_order_reverses_stack_slots() {
        let mut data = assigned();
        data.set_type_assignment(Flags::empty(), 1, 5, None, StackArgumentOrder::JsCall)
            .unwrap();
        let desc = Descriptor::<X86_64>::new(Key::Void, &data);
        assert_eq!(desc.stack_argument_slot(2), 2);
        assert_eq!(desc.stack_argument_slot(3), 1);
        assert_eq!(desc.stack_argument_slot(4), 0);
    }

    #[test]
    #[should_panic(expected = "is not a stack parameter")]
    fn register_parameter_has_no_stack_slot() {
        let mut data = assigned();
        data.set_type_assignment(Flags::empty(), 1, 5, None, StackArgumentOrder::Default)
            .unwrap();
        let desc = Descriptor::<X86_64>::new(Key::Void, &data);
        let _ = desc.stack_argument_slot(1);
    }
}
