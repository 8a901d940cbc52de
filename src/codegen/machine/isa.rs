use std::fmt::Debug;
use std::hash::Hash;

use smallvec::{smallvec, SmallVec};

pub trait PhysicalRegister: Debug + Copy + Clone + PartialEq + Eq + Hash + 'static {
    fn name(&self) -> &'static str;
}

/// Per-target surface the descriptor layer is built against.
///
/// Pinned register constants are the bindings other parts of the backend
/// (builtin stubs, the interpreter, the write barrier) hard-code; the
/// descriptor tables reference them instead of naming raw registers.
pub trait TargetIsa: Debug + Default + Copy + Clone + PartialEq + Eq {
    type Reg: PhysicalRegister;

    /// Upper bound on register parameters for hand-assigned conventions.
    const MAX_BUILTIN_REGISTER_PARAMS: usize;
    /// Stricter bound for default-shaped internal stubs. On register-poor
    /// targets one register must stay free to hold the call target itself.
    const MAX_STUB_REGISTER_PARAMS: usize;

    /// Trailing pinned parameters marked as a stack tail are materialized
    /// on the stack instead of in registers when this is set.
    const PASS_TAIL_ARGS_ON_STACK: bool;

    /// Holds the roots table; never handed out as a parameter register.
    const ROOT: Self::Reg;
    const CONTEXT: Self::Reg;

    const JS_CALL_TARGET: Self::Reg;
    const JS_CALL_NEW_TARGET: Self::Reg;
    const JS_CALL_ARG_COUNT: Self::Reg;
    const JS_CALL_EXTRA_ARGS: &'static [Self::Reg];
    const JS_CALL_CODE_START: Self::Reg;
    const JS_FUNCTION: Self::Reg;

    const INTERPRETER_ACCUMULATOR: Self::Reg;
    const INTERPRETER_BYTECODE_OFFSET: Self::Reg;
    const INTERPRETER_BYTECODE_ARRAY: Self::Reg;
    const INTERPRETER_DISPATCH_TABLE: Self::Reg;

    const LOAD_RECEIVER: Self::Reg;
    const LOAD_NAME: Self::Reg;
    const LOAD_SLOT: Self::Reg;
    const LOAD_VECTOR: Self::Reg;
    const LOAD_GLOBAL_VECTOR: Self::Reg;
    const LOAD_LOOKUP_START: Self::Reg;

    const STORE_RECEIVER: Self::Reg;
    const STORE_NAME: Self::Reg;
    const STORE_VALUE: Self::Reg;
    const STORE_SLOT: Self::Reg;
    const STORE_VECTOR: Self::Reg;
    const STORE_MAP: Self::Reg;

    const ALLOCATE_SIZE: Self::Reg;

    const RUNTIME_CALL_FUNCTION: Self::Reg;
    const RUNTIME_CALL_ARG_COUNT: Self::Reg;
    const RUNTIME_CALL_ARGV: Self::Reg;

    const TYPE_CONVERSION_ARGUMENT: Self::Reg;

    const API_GETTER_HOLDER: Self::Reg;
    const API_GETTER_CALLBACK: Self::Reg;

    const GROW_OBJECT: Self::Reg;
    const GROW_KEY: Self::Reg;

    const BASELINE_LEAVE_PARAMS_SIZE: Self::Reg;
    const BASELINE_LEAVE_WEIGHT: Self::Reg;

    /// First two native (C calling convention) argument registers, used by
    /// entry conventions that are invoked directly from C++.
    const ENTRY_ARG0: Self::Reg;
    const ENTRY_ARG1: Self::Reg;

    /// Default allocation order for parameter registers. Excludes the root
    /// and context registers.
    fn allocatable_registers() -> &'static [Self::Reg];

    fn default_register_params(count: usize) -> SmallVec<[Self::Reg; 8]> {
        let regs = Self::allocatable_registers();
        assert!(
            count <= regs.len(),
            "target exposes {} allocatable registers, {count} requested",
            regs.len()
        );
        regs.iter().copied().take(count).collect()
    }

    /// Register assignment for JS-shaped calls: target, new target and
    /// argument count, then up to `extra` convention-specific registers.
    /// `extra` is capped by what the target can spare.
    fn js_call_registers(extra: usize) -> SmallVec<[Self::Reg; 8]> {
        let extra = extra.min(Self::JS_CALL_EXTRA_ARGS.len());
        let mut regs: SmallVec<[Self::Reg; 8]> = smallvec![
            Self::JS_CALL_TARGET,
            Self::JS_CALL_NEW_TARGET,
            Self::JS_CALL_ARG_COUNT,
        ];
        regs.extend(Self::JS_CALL_EXTRA_ARGS.iter().copied().take(extra));
        regs
    }

    /// Whether a general parameter register may carry a floating-point
    /// argument. True on every target we support today.
    fn is_valid_float_parameter_register(_reg: Self::Reg) -> bool {
        true
    }
}
