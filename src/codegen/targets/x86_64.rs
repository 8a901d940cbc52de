use std::fmt::{Display, Formatter};

use crate::codegen::machine::{PhysicalRegister, TargetIsa};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Reg {
    Rax,
    Rcx,
    Rdx,
    Rbx,
    Rsi,
    Rdi,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
}

impl PhysicalRegister for Reg {
    fn name(&self) -> &'static str {
        match self {
            Self::Rax => "rax",
            Self::Rcx => "rcx",
            Self::Rdx => "rdx",
            Self::Rbx => "rbx",
            Self::Rsi => "rsi",
            Self::Rdi => "rdi",
            Self::R8 => "r8",
            Self::R9 => "r9",
            Self::R10 => "r10",
            Self::R11 => "r11",
            Self::R12 => "r12",
            Self::R13 => "r13",
            Self::R14 => "r14",
            Self::R15 => "r15",
        }
    }
}

impl Display for Reg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct X86_64;

impl TargetIsa for X86_64 {
    type Reg = Reg;

    const MAX_BUILTIN_REGISTER_PARAMS: usize = 5;
    const MAX_STUB_REGISTER_PARAMS: usize = 5;
    const PASS_TAIL_ARGS_ON_STACK: bool = false;

    const ROOT: Reg = Reg::R13;
    const CONTEXT: Reg = Reg::Rsi;

    const JS_CALL_TARGET: Reg = Reg::Rdi;
    const JS_CALL_NEW_TARGET: Reg = Reg::Rdx;
    const JS_CALL_ARG_COUNT: Reg = Reg::Rax;
    const JS_CALL_EXTRA_ARGS: &'static [Reg] = &[Reg::Rbx, Reg::Rcx];
    const JS_CALL_CODE_START: Reg = Reg::Rcx;
    const JS_FUNCTION: Reg = Reg::Rdi;

    const INTERPRETER_ACCUMULATOR: Reg = Reg::Rax;
    const INTERPRETER_BYTECODE_OFFSET: Reg = Reg::R12;
    const INTERPRETER_BYTECODE_ARRAY: Reg = Reg::R14;
    const INTERPRETER_DISPATCH_TABLE: Reg = Reg::R15;

    const LOAD_RECEIVER: Reg = Reg::Rdx;
    const LOAD_NAME: Reg = Reg::Rcx;
    const LOAD_SLOT: Reg = Reg::Rax;
    const LOAD_VECTOR: Reg = Reg::Rbx;
    const LOAD_GLOBAL_VECTOR: Reg = Reg::Rbx;
    const LOAD_LOOKUP_START: Reg = Reg::Rdi;

    const STORE_RECEIVER: Reg = Reg::Rdx;
    const STORE_NAME: Reg = Reg::Rcx;
    const STORE_VALUE: Reg = Reg::Rax;
    const STORE_SLOT: Reg = Reg::Rdi;
    const STORE_VECTOR: Reg = Reg::Rbx;
    const STORE_MAP: Reg = Reg::R11;

    const ALLOCATE_SIZE: Reg = Reg::Rdx;

    const RUNTIME_CALL_FUNCTION: Reg = Reg::Rbx;
    const RUNTIME_CALL_ARG_COUNT: Reg = Reg::Rax;
    const RUNTIME_CALL_ARGV: Reg = Reg::R15;

    const TYPE_CONVERSION_ARGUMENT: Reg = Reg::Rax;

    const API_GETTER_HOLDER: Reg = Reg::Rcx;
    const API_GETTER_CALLBACK: Reg = Reg::Rbx;

    const GROW_OBJECT: Reg = Reg::Rax;
    const GROW_KEY: Reg = Reg::Rbx;

    const BASELINE_LEAVE_PARAMS_SIZE: Reg = Reg::Rbx;
    const BASELINE_LEAVE_WEIGHT: Reg = Reg::Rcx;

    const ENTRY_ARG0: Reg = Reg::Rdi;
    const ENTRY_ARG1: Reg = Reg::Rsi;

    fn allocatable_registers() -> &'static [Reg] {
        &[
            Reg::Rax,
            Reg::Rbx,
            Reg::Rcx,
            Reg::Rdx,
            Reg::Rdi,
            Reg::R8,
            Reg::R9,
        ]
    }
}
