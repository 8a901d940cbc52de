use std::fmt::{Display, Formatter};

use crate::codegen::machine::{PhysicalRegister, TargetIsa};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Reg {
    Eax,
    Ecx,
    Edx,
    Ebx,
    Esi,
    Edi,
}

impl PhysicalRegister for Reg {
    fn name(&self) -> &'static str {
        match self {
            Self::Eax => "eax",
            Self::Ecx => "ecx",
            Self::Edx => "edx",
            Self::Ebx => "ebx",
            Self::Esi => "esi",
            Self::Edi => "edi",
        }
    }
}

impl Display for Reg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The 32-bit x86 register model. General registers are scarce: the root
/// register eats one, and default-shaped stubs keep another one free for
/// the indirect call target, hence the lower stub cap.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct IA32;

impl TargetIsa for IA32 {
    type Reg = Reg;

    const MAX_BUILTIN_REGISTER_PARAMS: usize = 4;
    const MAX_STUB_REGISTER_PARAMS: usize = 3;
    const PASS_TAIL_ARGS_ON_STACK: bool = true;

    const ROOT: Reg = Reg::Ebx;
    const CONTEXT: Reg = Reg::Esi;

    const JS_CALL_TARGET: Reg = Reg::Edi;
    const JS_CALL_NEW_TARGET: Reg = Reg::Edx;
    const JS_CALL_ARG_COUNT: Reg = Reg::Eax;
    const JS_CALL_EXTRA_ARGS: &'static [Reg] = &[Reg::Ecx];
    const JS_CALL_CODE_START: Reg = Reg::Ecx;
    const JS_FUNCTION: Reg = Reg::Edi;

    const INTERPRETER_ACCUMULATOR: Reg = Reg::Eax;
    const INTERPRETER_BYTECODE_OFFSET: Reg = Reg::Edx;
    const INTERPRETER_BYTECODE_ARRAY: Reg = Reg::Edi;
    const INTERPRETER_DISPATCH_TABLE: Reg = Reg::Ecx;

    const LOAD_RECEIVER: Reg = Reg::Edx;
    const LOAD_NAME: Reg = Reg::Ecx;
    const LOAD_SLOT: Reg = Reg::Eax;
    // No register is left for the load vector; the pinned lists that
    // mention it carry a stack tail covering it on this target.
    const LOAD_VECTOR: Reg = Reg::Eax;
    const LOAD_GLOBAL_VECTOR: Reg = Reg::Edx;
    const LOAD_LOOKUP_START: Reg = Reg::Edi;

    const STORE_RECEIVER: Reg = Reg::Edx;
    const STORE_NAME: Reg = Reg::Ecx;
    const STORE_VALUE: Reg = Reg::Eax;
    const STORE_SLOT: Reg = Reg::Edi;
    const STORE_VECTOR: Reg = Reg::Eax;
    const STORE_MAP: Reg = Reg::Edi;

    const ALLOCATE_SIZE: Reg = Reg::Edx;

    const RUNTIME_CALL_FUNCTION: Reg = Reg::Edx;
    const RUNTIME_CALL_ARG_COUNT: Reg = Reg::Eax;
    const RUNTIME_CALL_ARGV: Reg = Reg::Ecx;

    const TYPE_CONVERSION_ARGUMENT: Reg = Reg::Eax;

    const API_GETTER_HOLDER: Reg = Reg::Ecx;
    const API_GETTER_CALLBACK: Reg = Reg::Eax;

    const GROW_OBJECT: Reg = Reg::Eax;
    const GROW_KEY: Reg = Reg::Ecx;

    const BASELINE_LEAVE_PARAMS_SIZE: Reg = Reg::Edi;
    const BASELINE_LEAVE_WEIGHT: Reg = Reg::Ecx;

    const ENTRY_ARG0: Reg = Reg::Edi;
    const ENTRY_ARG1: Reg = Reg::Esi;

    fn allocatable_registers() -> &'static [Reg] {
        &[Reg::Eax, Reg::Ecx, Reg::Edx, Reg::Edi]
    }
}

#[cfg(test)]
mod tests {
    use super::{IA32, Reg, TargetIsa};

    #[test]
    fn allocatable_set_excludes_reserved_registers() {
        let regs = IA32::allocatable_registers();
        assert!(!regs.contains(&IA32::ROOT));
        assert!(!regs.contains(&IA32::CONTEXT));
        assert_eq!(regs.len(), IA32::MAX_BUILTIN_REGISTER_PARAMS);
    }

    #[test]
    fn stub_cap_is_stricter_than_builtin_cap() {
        assert!(IA32::MAX_STUB_REGISTER_PARAMS < IA32::MAX_BUILTIN_REGISTER_PARAMS);
    }

    #[test]
    fn js_call_extras_are_limited_to_the_spare_register() {
        let regs = IA32::js_call_registers(2);
        assert_eq!(regs.as_slice(), [Reg::Edi, Reg::Edx, Reg::Eax, Reg::Ecx]);
    }
}
