//! The catalogue of calling conventions.
//!
//! Every convention is described declaratively: declared parameters with
//! their machine types, flags, stack argument order and a register policy.
//! One generic construction routine in [`super::spec`] resolves each entry
//! against a target; there is no per-convention initialization code.

use smallvec::smallvec;

use super::registry::DescriptorRegistry;
use super::spec::{DescriptorSpec, GeneratedSpec, Param, RegisterPolicy, SpecKind};
use super::Flags;
use crate::codegen::machine::{MachineType, TargetIsa};

macro_rules! params {
    ($(($name:literal, $ty:ident)),* $(,)?) => {
        &[$(Param { name: $name, ty: MachineType::$ty }),*]
    };
}

/// Parameter list of a JS-shaped convention: the fixed prefix every JS
/// call carries, then the convention-specific parameters.
macro_rules! js_params {
    ($(($name:literal, $ty:ident)),* $(,)?) => {
        params![
            ("target", AnyTagged),
            ("new_target", AnyTagged),
            ("actual_arguments_count", Int32),
            $(($name, $ty),)*
        ]
    };
}

/// Dense identifier of a calling convention. Doubles as the index into the
/// registry's data table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumCount, VariantArray, IntoStaticStr)]
pub enum Key {
    Abort,
    Allocate,
    ApiCallback,
    ApiGetter,
    ArrayConstructor,
    ArrayNArgumentsConstructor,
    ArrayNoArgumentConstructor,
    ArraySingleArgumentConstructor,
    AsyncFunctionStackParameter,
    BaselineLeaveFrame,
    BaselineOutOfLinePrologue,
    BigIntToI32Pair,
    BigIntToI64,
    BinaryOp,
    BinaryOpBaseline,
    BinaryOpWithFeedback,
    CEntry1ArgvOnStack,
    CallForwardVarargs,
    CallFunctionTemplate,
    CallTrampoline,
    CallTrampolineBaseline,
    CallTrampolineWithFeedback,
    CallVarargs,
    CallWithArrayLike,
    CallWithArrayLikeWithFeedback,
    CallWithSpread,
    CallWithSpreadBaseline,
    CallWithSpreadWithFeedback,
    CloneObjectBaseline,
    CloneObjectWithVector,
    Compare,
    CompareBaseline,
    CompareWithFeedback,
    ConstructBaseline,
    ConstructForwardVarargs,
    ConstructStub,
    ConstructVarargs,
    ConstructWithArrayLike,
    ConstructWithArrayLikeWithFeedback,
    ConstructWithFeedback,
    ConstructWithSpread,
    ConstructWithSpreadBaseline,
    ConstructWithSpreadWithFeedback,
    ContextOnly,
    CppBuiltinAdaptor,
    DynamicCheckMaps,
    EphemeronKeyBarrier,
    FastNewObject,
    ForInPrepare,
    FrameDropperTrampoline,
    GetIteratorStackParameter,
    GetProperty,
    GrowArrayElements,
    I32PairToBigInt,
    I64ToBigInt,
    InterpreterCEntry1,
    InterpreterCEntry2,
    InterpreterDispatch,
    InterpreterPushArgsThenCall,
    InterpreterPushArgsThenConstruct,
    JsTrampoline,
    Load,
    LoadBaseline,
    LoadGlobal,
    LoadGlobalBaseline,
    LoadGlobalNoFeedback,
    LoadGlobalWithVector,
    LoadNoFeedback,
    LoadWithReceiverAndVector,
    LoadWithReceiverBaseline,
    LoadWithVector,
    LookupBaseline,
    NoContext,
    RecordWrite,
    ResumeGenerator,
    RunMicrotasks,
    RunMicrotasksEntry,
    SingleParameterOnStack,
    Store,
    StoreBaseline,
    StoreGlobal,
    StoreGlobalBaseline,
    StoreGlobalWithVector,
    StoreTransition,
    StoreWithVector,
    StringAt,
    StringAtAsString,
    StringSubstring,
    TailCallOptimizedCodeSlot,
    TypeConversion,
    TypeConversionBaseline,
    TypeConversionNoContext,
    Typeof,
    UnaryOpBaseline,
    UnaryOpWithFeedback,
    Void,
    WasmFloat32ToNumber,
    WasmFloat64ToNumber,
    WasmI32AtomicWait32,
    WasmI64AtomicWait32,
    // Conventions whose types come out of the stub compiler.
    MathPow,
    StringAdd,
    StringEqual,
}

const TWO_TAGGED: &[MachineType] = &[MachineType::AnyTagged, MachineType::AnyTagged];

impl Key {
    pub fn all() -> &'static [Self] {
        <Self as strum::VariantArray>::VARIANTS
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn debug_name(self) -> &'static str {
        self.into()
    }

    /// The declarative description of this convention for a target.
    #[allow(clippy::match_same_arms)]
    pub(crate) fn spec<T: TargetIsa>(self) -> SpecKind<T> {
        let spec = match self {
            Self::Void => DescriptorSpec::stub(params![]),
            Self::ContextOnly => DescriptorSpec::stub(params![]),
            Self::NoContext => DescriptorSpec::no_context(params![]),
            Self::Abort => {
                DescriptorSpec::no_context(params![("message_or_message_id", AnyTagged)])
            }
            Self::Allocate => DescriptorSpec {
                returns: &[MachineType::TaggedPointer],
                registers: RegisterPolicy::fixed(smallvec![T::ALLOCATE_SIZE]),
                ..DescriptorSpec::no_context(params![("requested_size", IntPtr)])
            },
            Self::Typeof => DescriptorSpec::stub(params![("object", AnyTagged)]),
            Self::GetProperty => {
                DescriptorSpec::untyped(params![("object", AnyTagged), ("key", AnyTagged)])
            }

            Self::Compare => {
                DescriptorSpec::untyped(params![("left", AnyTagged), ("right", AnyTagged)])
            }
            Self::CompareBaseline => DescriptorSpec::no_context(params![
                ("left", AnyTagged),
                ("right", AnyTagged),
                ("slot", UintPtr),
            ]),
            Self::CompareWithFeedback => DescriptorSpec {
                extends: Some(Self::Compare),
                ..DescriptorSpec::stub(params![
                    ("left", AnyTagged),
                    ("right", AnyTagged),
                    ("slot", UintPtr),
                    ("feedback_vector", AnyTagged),
                ])
            },
            Self::BinaryOp => {
                DescriptorSpec::untyped(params![("left", AnyTagged), ("right", AnyTagged)])
            }
            Self::BinaryOpBaseline => DescriptorSpec::no_context(params![
                ("left", AnyTagged),
                ("right", AnyTagged),
                ("slot", UintPtr),
            ]),
            Self::BinaryOpWithFeedback => DescriptorSpec {
                extends: Some(Self::BinaryOp),
                ..DescriptorSpec::stub(params![
                    ("left", AnyTagged),
                    ("right", AnyTagged),
                    ("slot", UintPtr),
                    ("feedback_vector", AnyTagged),
                ])
            },
            Self::UnaryOpWithFeedback => DescriptorSpec::stub(params![
                ("value", AnyTagged),
                ("slot", UintPtr),
                ("feedback_vector", AnyTagged),
            ]),
            Self::UnaryOpBaseline => {
                DescriptorSpec::no_context(params![("value", AnyTagged), ("slot", UintPtr)])
            }

            Self::Load => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![
                    T::LOAD_RECEIVER,
                    T::LOAD_NAME,
                    T::LOAD_SLOT,
                ]),
                ..DescriptorSpec::stub(params![
                    ("receiver", AnyTagged),
                    ("name", AnyTagged),
                    ("slot", TaggedSigned),
                ])
            },
            Self::LoadBaseline => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![
                    T::LOAD_RECEIVER,
                    T::LOAD_NAME,
                    T::LOAD_SLOT,
                ]),
                extends: Some(Self::Load),
                ..DescriptorSpec::no_context(params![
                    ("receiver", AnyTagged),
                    ("name", AnyTagged),
                    ("slot", TaggedSigned),
                ])
            },
            Self::LoadGlobal => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![T::LOAD_NAME, T::LOAD_SLOT]),
                ..DescriptorSpec::stub(params![("name", AnyTagged), ("slot", TaggedSigned)])
            },
            Self::LoadGlobalBaseline => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![T::LOAD_NAME, T::LOAD_SLOT]),
                extends: Some(Self::LoadGlobal),
                ..DescriptorSpec::no_context(params![("name", AnyTagged), ("slot", TaggedSigned)])
            },
            Self::LoadGlobalNoFeedback => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![T::LOAD_NAME, T::LOAD_SLOT]),
                ..DescriptorSpec::stub(params![("name", AnyTagged), ("ic_kind", TaggedSigned)])
            },
            Self::LoadNoFeedback => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![
                    T::LOAD_RECEIVER,
                    T::LOAD_NAME,
                    T::LOAD_SLOT,
                ]),
                ..DescriptorSpec::stub(params![
                    ("receiver", AnyTagged),
                    ("name", AnyTagged),
                    ("ic_kind", TaggedSigned),
                ])
            },
            Self::LoadGlobalWithVector => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![
                    T::LOAD_NAME,
                    T::LOAD_SLOT,
                    T::LOAD_GLOBAL_VECTOR,
                ]),
                extends: Some(Self::LoadGlobal),
                ..DescriptorSpec::stub(params![
                    ("name", AnyTagged),
                    ("slot", TaggedSigned),
                    ("vector", AnyTagged),
                ])
            },
            Self::LoadWithVector => DescriptorSpec {
                registers: RegisterPolicy::Fixed {
                    regs: smallvec![T::LOAD_RECEIVER, T::LOAD_NAME, T::LOAD_SLOT, T::LOAD_VECTOR],
                    stack_tail: 1,
                },
                ..DescriptorSpec::stub(params![
                    ("receiver", AnyTagged),
                    ("name", AnyTagged),
                    ("slot", AnyTagged),
                    ("vector", AnyTagged),
                ])
            },
            Self::LoadWithReceiverAndVector => DescriptorSpec {
                registers: RegisterPolicy::Fixed {
                    regs: smallvec![
                        T::LOAD_RECEIVER,
                        T::LOAD_LOOKUP_START,
                        T::LOAD_NAME,
                        T::LOAD_SLOT,
                        T::LOAD_VECTOR,
                    ],
                    stack_tail: 1,
                },
                ..DescriptorSpec::stub(params![
                    ("receiver", AnyTagged),
                    ("lookup_start_object", AnyTagged),
                    ("name", AnyTagged),
                    ("slot", AnyTagged),
                    ("vector", AnyTagged),
                ])
            },
            Self::LoadWithReceiverBaseline => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![
                    T::LOAD_RECEIVER,
                    T::LOAD_LOOKUP_START,
                    T::LOAD_NAME,
                    T::LOAD_SLOT,
                ]),
                ..DescriptorSpec::no_context(params![
                    ("receiver", AnyTagged),
                    ("lookup_start_object", AnyTagged),
                    ("name", AnyTagged),
                    ("slot", AnyTagged),
                ])
            },
            Self::LookupBaseline => DescriptorSpec::no_context(params![
                ("name", AnyTagged),
                ("depth", AnyTagged),
                ("slot", AnyTagged),
            ]),

            Self::Store => DescriptorSpec {
                registers: RegisterPolicy::Fixed {
                    regs: smallvec![
                        T::STORE_RECEIVER,
                        T::STORE_NAME,
                        T::STORE_VALUE,
                        T::STORE_SLOT,
                    ],
                    stack_tail: 2,
                },
                ..DescriptorSpec::stub(params![
                    ("receiver", AnyTagged),
                    ("name", AnyTagged),
                    ("value", AnyTagged),
                    ("slot", TaggedSigned),
                ])
            },
            Self::StoreBaseline => DescriptorSpec {
                registers: RegisterPolicy::Fixed {
                    regs: smallvec![
                        T::STORE_RECEIVER,
                        T::STORE_NAME,
                        T::STORE_VALUE,
                        T::STORE_SLOT,
                    ],
                    stack_tail: 2,
                },
                extends: Some(Self::Store),
                ..DescriptorSpec::no_context(params![
                    ("receiver", AnyTagged),
                    ("name", AnyTagged),
                    ("value", AnyTagged),
                    ("slot", TaggedSigned),
                ])
            },
            Self::StoreGlobal => DescriptorSpec {
                registers: RegisterPolicy::Fixed {
                    regs: smallvec![T::STORE_NAME, T::STORE_VALUE, T::STORE_SLOT],
                    stack_tail: 2,
                },
                ..DescriptorSpec::stub(params![
                    ("name", AnyTagged),
                    ("value", AnyTagged),
                    ("slot", TaggedSigned),
                ])
            },
            Self::StoreGlobalBaseline => DescriptorSpec {
                registers: RegisterPolicy::Fixed {
                    regs: smallvec![T::STORE_NAME, T::STORE_VALUE, T::STORE_SLOT],
                    stack_tail: 2,
                },
                extends: Some(Self::StoreGlobal),
                ..DescriptorSpec::no_context(params![
                    ("name", AnyTagged),
                    ("value", AnyTagged),
                    ("slot", TaggedSigned),
                ])
            },
            Self::StoreGlobalWithVector => DescriptorSpec {
                registers: RegisterPolicy::Fixed {
                    regs: smallvec![T::STORE_NAME, T::STORE_VALUE, T::STORE_SLOT, T::STORE_VECTOR],
                    stack_tail: 3,
                },
                extends: Some(Self::StoreGlobal),
                ..DescriptorSpec::stub(params![
                    ("name", AnyTagged),
                    ("value", AnyTagged),
                    ("slot", TaggedSigned),
                    ("vector", AnyTagged),
                ])
            },
            Self::StoreTransition => DescriptorSpec {
                registers: RegisterPolicy::Fixed {
                    regs: smallvec![
                        T::STORE_RECEIVER,
                        T::STORE_NAME,
                        T::STORE_MAP,
                        T::STORE_VALUE,
                        T::STORE_SLOT,
                        T::STORE_VECTOR,
                    ],
                    stack_tail: 3,
                },
                ..DescriptorSpec::stub(params![
                    ("receiver", AnyTagged),
                    ("name", AnyTagged),
                    ("map", AnyTagged),
                    ("value", AnyTagged),
                    ("slot", TaggedSigned),
                    ("vector", AnyTagged),
                ])
            },
            Self::StoreWithVector => DescriptorSpec {
                registers: RegisterPolicy::Fixed {
                    regs: smallvec![
                        T::STORE_RECEIVER,
                        T::STORE_NAME,
                        T::STORE_VALUE,
                        T::STORE_SLOT,
                        T::STORE_VECTOR,
                    ],
                    stack_tail: 3,
                },
                extends: Some(Self::Store),
                ..DescriptorSpec::stub(params![
                    ("receiver", AnyTagged),
                    ("name", AnyTagged),
                    ("value", AnyTagged),
                    ("slot", TaggedSigned),
                    ("vector", AnyTagged),
                ])
            },

            Self::TypeConversion => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![T::TYPE_CONVERSION_ARGUMENT]),
                ..DescriptorSpec::stub(params![("argument", AnyTagged)])
            },
            Self::TypeConversionNoContext => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![T::TYPE_CONVERSION_ARGUMENT]),
                extends: Some(Self::TypeConversion),
                ..DescriptorSpec::no_context(params![("argument", AnyTagged)])
            },
            Self::TypeConversionBaseline => {
                DescriptorSpec::no_context(params![("argument", AnyTagged), ("slot", UintPtr)])
            }

            Self::SingleParameterOnStack => DescriptorSpec {
                registers: RegisterPolicy::OnStack,
                ..DescriptorSpec::stub(params![("argument", AnyTagged)])
            },
            Self::AsyncFunctionStackParameter => DescriptorSpec {
                registers: RegisterPolicy::OnStack,
                ..DescriptorSpec::stub(params![
                    ("promise", TaggedPointer),
                    ("result", AnyTagged),
                ])
            },
            Self::GetIteratorStackParameter => DescriptorSpec {
                registers: RegisterPolicy::OnStack,
                ..DescriptorSpec::stub(params![
                    ("receiver", AnyTagged),
                    ("call_slot", AnyTagged),
                    ("feedback", AnyTagged),
                    ("result", AnyTagged),
                ])
            },

            Self::CallTrampoline => DescriptorSpec::varargs(params![
                ("function", AnyTagged),
                ("actual_arguments_count", Int32),
            ]),
            Self::CallTrampolineBaseline => DescriptorSpec {
                flags: Flags::ALLOW_VAR_ARGS.union(Flags::NO_CONTEXT),
                extends: Some(Self::CallTrampoline),
                ..DescriptorSpec::varargs(params![
                    ("function", AnyTagged),
                    ("actual_arguments_count", Int32),
                    ("slot", UintPtr),
                ])
            },
            Self::CallTrampolineWithFeedback => DescriptorSpec {
                extends: Some(Self::CallTrampolineBaseline),
                ..DescriptorSpec::varargs(params![
                    ("function", AnyTagged),
                    ("actual_arguments_count", Int32),
                    ("slot", UintPtr),
                    ("feedback_vector", AnyTagged),
                ])
            },
            Self::CallVarargs => DescriptorSpec::varargs(params![
                ("target", AnyTagged),
                ("actual_arguments_count", Int32),
                ("arguments_length", Int32),
                ("arguments_list", AnyTagged),
            ]),
            Self::CallForwardVarargs => DescriptorSpec::varargs(params![
                ("target", AnyTagged),
                ("actual_arguments_count", Int32),
                ("start_index", Int32),
            ]),
            Self::CallFunctionTemplate => DescriptorSpec::varargs(params![
                ("function_template_info", AnyTagged),
                ("arguments_count", IntPtr),
            ]),
            Self::CallWithSpread => DescriptorSpec::varargs(params![
                ("target", AnyTagged),
                ("arguments_count", Int32),
                ("spread", AnyTagged),
            ]),
            Self::CallWithSpreadBaseline => DescriptorSpec {
                flags: Flags::ALLOW_VAR_ARGS.union(Flags::NO_CONTEXT),
                extends: Some(Self::CallWithSpread),
                ..DescriptorSpec::varargs(params![
                    ("target", AnyTagged),
                    ("arguments_count", Int32),
                    ("spread", AnyTagged),
                    ("slot", UintPtr),
                ])
            },
            Self::CallWithSpreadWithFeedback => DescriptorSpec {
                registers: RegisterPolicy::Default { count: Some(4) },
                extends: Some(Self::CallWithSpreadBaseline),
                ..DescriptorSpec::varargs(params![
                    ("target", AnyTagged),
                    ("arguments_count", Int32),
                    ("spread", AnyTagged),
                    ("slot", UintPtr),
                    ("feedback_vector", AnyTagged),
                ])
            },
            Self::CallWithArrayLike => DescriptorSpec::stub(params![
                ("target", AnyTagged),
                ("arguments_list", AnyTagged),
            ]),
            Self::CallWithArrayLikeWithFeedback => DescriptorSpec {
                extends: Some(Self::CallWithArrayLike),
                ..DescriptorSpec::stub(params![
                    ("target", AnyTagged),
                    ("arguments_list", AnyTagged),
                    ("slot", UintPtr),
                    ("feedback_vector", AnyTagged),
                ])
            },

            Self::ConstructStub => {
                DescriptorSpec::js(js_params![("allocation_site", AnyTagged)], 1)
            }
            Self::ConstructVarargs => DescriptorSpec::js(
                js_params![("arguments_length", Int32), ("arguments_list", AnyTagged)],
                2,
            ),
            Self::ConstructForwardVarargs => {
                DescriptorSpec::js(js_params![("start_index", Int32)], 1)
            }
            Self::ConstructWithSpread => {
                DescriptorSpec::js(js_params![("spread", AnyTagged)], 1)
            }
            Self::ConstructWithSpreadBaseline => DescriptorSpec {
                flags: Flags::ALLOW_VAR_ARGS.union(Flags::NO_CONTEXT),
                ..DescriptorSpec::js(
                    js_params![("slot", UintPtr), ("spread", AnyTagged)],
                    2,
                )
            },
            Self::ConstructWithSpreadWithFeedback => DescriptorSpec::js(
                js_params![
                    ("slot", UintPtr),
                    ("spread", AnyTagged),
                    ("feedback_vector", AnyTagged),
                ],
                2,
            ),
            Self::ConstructWithArrayLike => DescriptorSpec::stub(params![
                ("target", AnyTagged),
                ("new_target", AnyTagged),
                ("arguments_list", AnyTagged),
            ]),
            Self::ConstructWithArrayLikeWithFeedback => DescriptorSpec {
                registers: RegisterPolicy::Default { count: Some(4) },
                extends: Some(Self::ConstructWithArrayLike),
                ..DescriptorSpec::stub(params![
                    ("target", AnyTagged),
                    ("new_target", AnyTagged),
                    ("arguments_list", AnyTagged),
                    ("slot", UintPtr),
                    ("feedback_vector", AnyTagged),
                ])
            },
            Self::ConstructWithFeedback => DescriptorSpec::js(
                js_params![("slot", UintPtr), ("feedback_vector", AnyTagged)],
                1,
            ),
            Self::ConstructBaseline => DescriptorSpec {
                flags: Flags::ALLOW_VAR_ARGS.union(Flags::NO_CONTEXT),
                ..DescriptorSpec::js(js_params![("slot", UintPtr)], 1)
            },
            Self::JsTrampoline => DescriptorSpec::js(js_params![], 0),
            Self::CppBuiltinAdaptor => {
                DescriptorSpec::js(js_params![("c_function", Pointer)], 1)
            }
            Self::ArrayConstructor => {
                DescriptorSpec::js(js_params![("allocation_site", AnyTagged)], 1)
            }

            Self::ArrayNArgumentsConstructor => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![
                    T::JS_CALL_TARGET,
                    T::JS_CALL_EXTRA_ARGS[0],
                    T::JS_CALL_ARG_COUNT,
                ]),
                ..DescriptorSpec::stub(params![
                    ("function", AnyTagged),
                    ("allocation_site", AnyTagged),
                    ("actual_arguments_count", Int32),
                ])
            },
            Self::ArrayNoArgumentConstructor => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![
                    T::JS_CALL_TARGET,
                    T::JS_CALL_EXTRA_ARGS[0],
                    T::JS_CALL_ARG_COUNT,
                ]),
                extends: Some(Self::ArrayNArgumentsConstructor),
                ..DescriptorSpec::stub(params![
                    ("function", AnyTagged),
                    ("allocation_site", AnyTagged),
                    ("actual_arguments_count", Int32),
                    ("function_parameter", AnyTagged),
                ])
            },
            Self::ArraySingleArgumentConstructor => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![
                    T::JS_CALL_TARGET,
                    T::JS_CALL_EXTRA_ARGS[0],
                    T::JS_CALL_ARG_COUNT,
                ]),
                extends: Some(Self::ArrayNArgumentsConstructor),
                ..DescriptorSpec::stub(params![
                    ("function", AnyTagged),
                    ("allocation_site", AnyTagged),
                    ("actual_arguments_count", Int32),
                    ("function_parameter", AnyTagged),
                    ("array_size_smi_parameter", AnyTagged),
                ])
            },

            Self::FastNewObject => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![T::JS_FUNCTION, T::JS_CALL_NEW_TARGET]),
                ..DescriptorSpec::stub(params![
                    ("target", AnyTagged),
                    ("new_target", AnyTagged),
                ])
            },
            Self::TailCallOptimizedCodeSlot => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![T::JS_CALL_CODE_START]),
                ..DescriptorSpec::stub(params![("optimized_code_entry", AnyTagged)])
            },

            Self::BaselineOutOfLinePrologue => DescriptorSpec {
                registers: RegisterPolicy::Fixed {
                    regs: smallvec![
                        T::CONTEXT,
                        T::JS_FUNCTION,
                        T::JS_CALL_ARG_COUNT,
                        T::JS_CALL_EXTRA_ARGS[0],
                        T::JS_CALL_NEW_TARGET,
                        T::INTERPRETER_BYTECODE_ARRAY,
                    ],
                    stack_tail: 1,
                },
                ..DescriptorSpec::no_context(params![
                    ("callee_context", AnyTagged),
                    ("closure", AnyTagged),
                    ("arg_count", Int32),
                    ("stack_frame_size", Int32),
                    ("new_target", AnyTagged),
                    ("bytecode_array", AnyTagged),
                ])
            },
            Self::BaselineLeaveFrame => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![
                    T::BASELINE_LEAVE_PARAMS_SIZE,
                    T::BASELINE_LEAVE_WEIGHT,
                ]),
                ..DescriptorSpec::no_context(params![
                    ("params_size", Int32),
                    ("weight", Int32),
                ])
            },

            Self::InterpreterDispatch => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![
                    T::INTERPRETER_ACCUMULATOR,
                    T::INTERPRETER_BYTECODE_OFFSET,
                    T::INTERPRETER_BYTECODE_ARRAY,
                    T::INTERPRETER_DISPATCH_TABLE,
                ]),
                ..DescriptorSpec::stub(params![
                    ("accumulator", AnyTagged),
                    ("bytecode_offset", IntPtr),
                    ("bytecode_array", AnyTagged),
                    ("dispatch_table", IntPtr),
                ])
            },
            Self::InterpreterPushArgsThenCall => DescriptorSpec::stub(params![
                ("number_of_arguments", Int32),
                ("first_argument", Pointer),
                ("function", AnyTagged),
            ]),
            Self::InterpreterPushArgsThenConstruct => DescriptorSpec::stub(params![
                ("number_of_arguments", Int32),
                ("first_argument", Pointer),
                ("constructor", AnyTagged),
                ("new_target", AnyTagged),
                ("feedback_element", AnyTagged),
            ]),
            Self::InterpreterCEntry1 => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![
                    T::RUNTIME_CALL_ARG_COUNT,
                    T::RUNTIME_CALL_ARGV,
                    T::RUNTIME_CALL_FUNCTION,
                ]),
                ..DescriptorSpec::stub(params![
                    ("number_of_arguments", Int32),
                    ("first_argument", Pointer),
                    ("function_entry", Pointer),
                ])
            },
            Self::InterpreterCEntry2 => DescriptorSpec {
                returns: TWO_TAGGED,
                registers: RegisterPolicy::fixed(smallvec![
                    T::RUNTIME_CALL_ARG_COUNT,
                    T::RUNTIME_CALL_ARGV,
                    T::RUNTIME_CALL_FUNCTION,
                ]),
                ..DescriptorSpec::stub(params![
                    ("number_of_arguments", Int32),
                    ("first_argument", Pointer),
                    ("function_entry", Pointer),
                ])
            },
            Self::CEntry1ArgvOnStack => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![
                    T::RUNTIME_CALL_ARG_COUNT,
                    T::RUNTIME_CALL_FUNCTION,
                ]),
                ..DescriptorSpec::stub(params![
                    ("arity", Int32),
                    ("c_function", Pointer),
                    ("padding", AnyTagged),
                    ("argc_smi", AnyTagged),
                    ("target_copy", AnyTagged),
                    ("new_target_copy", AnyTagged),
                ])
            },

            Self::ApiCallback => DescriptorSpec::varargs(params![
                ("api_function_address", Pointer),
                ("actual_arguments_count", IntPtr),
                ("call_data", AnyTagged),
                ("holder", AnyTagged),
            ]),
            Self::ApiGetter => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![
                    T::LOAD_RECEIVER,
                    T::API_GETTER_HOLDER,
                    T::API_GETTER_CALLBACK,
                ]),
                ..DescriptorSpec::stub(params![
                    ("receiver", AnyTagged),
                    ("holder", AnyTagged),
                    ("callback", AnyTagged),
                ])
            },
            Self::GrowArrayElements => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![T::GROW_OBJECT, T::GROW_KEY]),
                ..DescriptorSpec::stub(params![("object", AnyTagged), ("key", AnyTagged)])
            },

            Self::RecordWrite => DescriptorSpec {
                restrict_to_params: true,
                ..DescriptorSpec::no_context(params![
                    ("object", TaggedPointer),
                    ("slot_address", Pointer),
                    ("remembered_set", TaggedSigned),
                    ("fp_mode", TaggedSigned),
                ])
            },
            Self::EphemeronKeyBarrier => DescriptorSpec {
                restrict_to_params: true,
                ..DescriptorSpec::no_context(params![
                    ("object", TaggedPointer),
                    ("slot_address", Pointer),
                    ("fp_mode", TaggedSigned),
                ])
            },
            Self::DynamicCheckMaps => DescriptorSpec {
                returns: &[MachineType::Int32],
                restrict_to_params: true,
                ..DescriptorSpec::stub(params![
                    ("map", TaggedPointer),
                    ("slot", IntPtr),
                    ("handler", TaggedSigned),
                ])
            },

            Self::ResumeGenerator => DescriptorSpec::stub(params![
                ("value", AnyTagged),
                ("generator", AnyTagged),
            ]),
            Self::FrameDropperTrampoline => {
                DescriptorSpec::stub(params![("restart_fp", Pointer)])
            }
            Self::RunMicrotasks => DescriptorSpec::stub(params![("microtask_queue", Pointer)]),
            Self::RunMicrotasksEntry => DescriptorSpec {
                registers: RegisterPolicy::fixed(smallvec![T::ENTRY_ARG0, T::ENTRY_ARG1]),
                ..DescriptorSpec::entry(params![
                    ("root_register_value", Pointer),
                    ("microtask_queue", Pointer),
                ])
            },
            Self::ForInPrepare => DescriptorSpec {
                returns: TWO_TAGGED,
                ..DescriptorSpec::stub(params![
                    ("enumerator", AnyTagged),
                    ("vector_index", TaggedSigned),
                    ("feedback_vector", AnyTagged),
                ])
            },

            Self::StringAt => DescriptorSpec {
                returns: &[MachineType::TaggedSigned],
                ..DescriptorSpec::stub(params![("receiver", AnyTagged), ("position", IntPtr)])
            },
            Self::StringAtAsString => DescriptorSpec {
                returns: &[MachineType::TaggedPointer],
                ..DescriptorSpec::stub(params![("receiver", AnyTagged), ("position", IntPtr)])
            },
            Self::StringSubstring => DescriptorSpec::stub(params![
                ("string", AnyTagged),
                ("from", IntPtr),
                ("to", IntPtr),
            ]),

            Self::CloneObjectWithVector => DescriptorSpec {
                returns: &[MachineType::TaggedPointer],
                ..DescriptorSpec::stub(params![
                    ("source", AnyTagged),
                    ("flags", TaggedSigned),
                    ("slot", TaggedSigned),
                    ("vector", AnyTagged),
                ])
            },
            Self::CloneObjectBaseline => DescriptorSpec::no_context(params![
                ("source", AnyTagged),
                ("flags", TaggedSigned),
                ("slot", TaggedSigned),
            ]),

            Self::I64ToBigInt => DescriptorSpec::no_context(params![("argument", Int64)]),
            Self::I32PairToBigInt => {
                DescriptorSpec::no_context(params![("low", Uint32), ("high", Uint32)])
            }
            Self::BigIntToI64 => DescriptorSpec {
                returns: &[MachineType::Int64],
                ..DescriptorSpec::stub(params![("argument", AnyTagged)])
            },
            Self::BigIntToI32Pair => DescriptorSpec {
                returns: &[MachineType::Uint32, MachineType::Uint32],
                ..DescriptorSpec::stub(params![("argument", AnyTagged)])
            },
            Self::WasmFloat32ToNumber => {
                DescriptorSpec::no_context(params![("value", Float32)])
            }
            Self::WasmFloat64ToNumber => {
                DescriptorSpec::no_context(params![("value", Float64)])
            }
            Self::WasmI32AtomicWait32 => DescriptorSpec {
                returns: &[MachineType::Uint32],
                ..DescriptorSpec::no_context(params![
                    ("address", Uint32),
                    ("expected_value", Int32),
                    ("timeout_low", Uint32),
                    ("timeout_high", Uint32),
                ])
            },
            Self::WasmI64AtomicWait32 => DescriptorSpec {
                returns: &[MachineType::Uint32],
                // The timeout halves do not fit in registers on 32-bit
                // targets; the spill slot is exempt from stack scanning.
                flags: Flags::NO_CONTEXT.union(Flags::NO_STACK_SCAN),
                registers: RegisterPolicy::Default { count: Some(4) },
                ..DescriptorSpec::stub(params![
                    ("address", Uint32),
                    ("expected_value_low", Uint32),
                    ("expected_value_high", Uint32),
                    ("timeout_low", Uint32),
                    ("timeout_high", Uint32),
                ])
            },

            Self::StringEqual => {
                return SpecKind::Generated(GeneratedSpec {
                    return_count: 1,
                    param_count: 3,
                    has_context: true,
                })
            }
            Self::StringAdd => {
                return SpecKind::Generated(GeneratedSpec {
                    return_count: 1,
                    param_count: 2,
                    has_context: true,
                })
            }
            Self::MathPow => {
                return SpecKind::Generated(GeneratedSpec {
                    return_count: 1,
                    param_count: 2,
                    has_context: false,
                })
            }
        };
        SpecKind::Static(spec)
    }
}

/// Pinned registers of the property load conventions, for code that feeds
/// these stubs directly.
pub struct LoadDescriptor;

impl LoadDescriptor {
    pub const fn receiver_register<T: TargetIsa>() -> T::Reg {
        T::LOAD_RECEIVER
    }

    pub const fn name_register<T: TargetIsa>() -> T::Reg {
        T::LOAD_NAME
    }

    pub const fn slot_register<T: TargetIsa>() -> T::Reg {
        T::LOAD_SLOT
    }
}

pub struct StoreDescriptor;

impl StoreDescriptor {
    pub const fn receiver_register<T: TargetIsa>() -> T::Reg {
        T::STORE_RECEIVER
    }

    pub const fn name_register<T: TargetIsa>() -> T::Reg {
        T::STORE_NAME
    }

    pub const fn value_register<T: TargetIsa>() -> T::Reg {
        T::STORE_VALUE
    }

    pub const fn slot_register<T: TargetIsa>() -> T::Reg {
        T::STORE_SLOT
    }
}

pub struct AllocateDescriptor;

impl AllocateDescriptor {
    pub const fn size_register<T: TargetIsa>() -> T::Reg {
        T::ALLOCATE_SIZE
    }
}

pub struct RunMicrotasksDescriptor;

impl RunMicrotasksDescriptor {
    /// Unlike the pinned conventions above, the microtask queue register is
    /// whatever the default policy handed out, so it is read back from the
    /// resolved registry.
    pub fn microtask_queue_register<T: TargetIsa>(registry: &DescriptorRegistry<T>) -> T::Reg {
        registry
            .descriptor(Key::RunMicrotasks)
            .register_parameter(0)
    }
}
