//! Per-function direct call counting.
//!
//! A call site is *direct* when its callee operand, after stripping casts,
//! is a literal reference to a named function. Calls through locals
//! (function pointers, vtable slots) are indirect and never counted.
//! Intrinsic and builtin callees are named functions like any other and are
//! counted.

use std::collections::btree_map::{self, BTreeMap};

use crate::data::module::Module;
use crate::data::types::FuncName;

/// Number of direct calls made *into* each function, accumulated over a whole
/// module.
///
/// Keys are inserted on the first observed call to a function; a function
/// never called directly is simply absent and reads as zero. Iteration is in
/// ascending, case-sensitive name order.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CallCounts {
    counts: BTreeMap<FuncName, u32>,
}

impl CallCounts {
    /// Key under which host frameworks identify this analysis.
    pub const KEY: &'static str = "static-cc";

    pub fn new() -> Self {
        CallCounts {
            counts: BTreeMap::new(),
        }
    }

    /// Records one direct call to `callee`.
    pub fn record(&mut self, callee: &FuncName) {
        *self.counts.entry(callee.clone()).or_insert(0) += 1;
    }

    /// The recorded count for `callee`, zero if it was never called directly.
    pub fn get(&self, callee: &FuncName) -> u32 {
        self.counts.get(callee).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FuncName, u32)> {
        self.counts.iter().map(|(name, count)| (name, *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl Default for CallCounts {
    fn default() -> Self {
        CallCounts::new()
    }
}

impl<'a> IntoIterator for &'a CallCounts {
    type Item = (&'a FuncName, &'a u32);
    type IntoIter = btree_map::Iter<'a, FuncName, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}

/// Walks every instruction of every function in the module and tallies the
/// direct call sites by callee.
///
/// The walk visits blocks and instructions in program order, though the
/// result does not depend on it: counting is pure accumulation. Declarations
/// contribute no call sites but may still appear as callees.
pub fn count_direct_calls(module: &Module) -> CallCounts {
    let mut counts = CallCounts::new();

    for func in &module.functions {
        for block in &func.blocks {
            for inst in &block.insts {
                if let Some(callee) = inst.direct_callee() {
                    counts.record(callee);
                }
            }
        }
    }

    counts
}

#[cfg(test)]
pub mod tests {
    use super::*;

    use crate::data::function::{BasicBlock, Function};
    use crate::data::instruction::{Instruction, Operand};
    use crate::data::types::{Label, VarName};

    /// Builds modules for fixtures, one function at a time.
    pub struct ModuleFactory {
        module: Module,
    }

    impl ModuleFactory {
        pub fn new() -> Self {
            ModuleFactory {
                module: Module::new(),
            }
        }

        pub fn decl(&mut self, name: &str) -> &mut Self {
            self.module
                .functions
                .push(Function::new(FuncName::new(name), Vec::new()));
            self
        }

        /// Adds a definition with a single block containing `insts`.
        pub fn func(&mut self, name: &str, insts: Vec<Instruction>) -> &mut Self {
            let mut func = Function::new(FuncName::new(name), Vec::new());
            let mut block = BasicBlock::new(Label::new("entry"));
            block.insts = insts;
            func.blocks.push(block);
            self.module.functions.push(func);
            self
        }

        pub fn build(&self) -> Module {
            self.module.clone()
        }
    }

    pub fn call(callee: &str) -> Instruction {
        Instruction::Call {
            dest: None,
            callee: Operand::Func(FuncName::new(callee)),
            args: Vec::new(),
        }
    }

    fn call_through(local: &str) -> Instruction {
        Instruction::Call {
            dest: None,
            callee: Operand::Local(VarName::new(local)),
            args: Vec::new(),
        }
    }

    fn ret() -> Instruction {
        Instruction::Ret { value: None }
    }

    #[test]
    fn counts_match_manual_tally() {
        let module = ModuleFactory::new()
            .func("main", vec![call("foo"), call("foo"), call("bar"), ret()])
            .func("foo", vec![call("bar"), ret()])
            .decl("bar")
            .build();

        let counts = count_direct_calls(&module);

        assert_eq!(counts.get(&FuncName::new("bar")), 2);
        assert_eq!(counts.get(&FuncName::new("foo")), 1);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn uncalled_functions_are_absent() {
        let module = ModuleFactory::new()
            .func("main", vec![call("foo"), ret()])
            .func("foo", vec![ret()])
            .build();

        let counts = count_direct_calls(&module);

        assert_eq!(counts.get(&FuncName::new("main")), 0);
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn indirect_calls_are_not_counted() {
        let module = ModuleFactory::new()
            .func(
                "main",
                vec![
                    Instruction::Load {
                        dest: VarName::new("p"),
                        src: Operand::Local(VarName::new("slot")),
                    },
                    call_through("p"),
                    ret(),
                ],
            )
            .build();

        assert!(count_direct_calls(&module).is_empty());
    }

    #[test]
    fn cast_wrapped_function_reference_stays_direct() {
        let module = ModuleFactory::new()
            .func(
                "main",
                vec![
                    Instruction::Call {
                        dest: None,
                        callee: Operand::Cast(Box::new(Operand::Cast(Box::new(Operand::Func(
                            FuncName::new("foo"),
                        ))))),
                        args: Vec::new(),
                    },
                    ret(),
                ],
            )
            .build();

        assert_eq!(count_direct_calls(&module).get(&FuncName::new("foo")), 1);
    }

    #[test]
    fn cast_wrapped_local_stays_indirect() {
        let module = ModuleFactory::new()
            .func(
                "main",
                vec![
                    Instruction::Call {
                        dest: None,
                        callee: Operand::Cast(Box::new(Operand::Local(VarName::new("p")))),
                        args: Vec::new(),
                    },
                    ret(),
                ],
            )
            .build();

        assert!(count_direct_calls(&module).is_empty());
    }

    #[test]
    fn invoke_counts_like_call() {
        let module = ModuleFactory::new()
            .func(
                "main",
                vec![
                    Instruction::Invoke {
                        dest: None,
                        callee: Operand::Func(FuncName::new("may_throw")),
                        args: Vec::new(),
                        normal: Label::new("cont"),
                        unwind: Label::new("cleanup"),
                    },
                    ret(),
                ],
            )
            .build();

        assert_eq!(
            count_direct_calls(&module).get(&FuncName::new("may_throw")),
            1
        );
    }

    #[test]
    fn intrinsic_callees_are_counted() {
        let module = ModuleFactory::new()
            .func("main", vec![call("llvm.memcpy.p0"), ret()])
            .build();

        assert_eq!(
            count_direct_calls(&module).get(&FuncName::new("llvm.memcpy.p0")),
            1
        );
    }

    #[test]
    fn empty_module_yields_empty_table() {
        assert!(count_direct_calls(&Module::new()).is_empty());
    }

    #[test]
    fn blockless_definition_contributes_nothing() {
        let module = ModuleFactory::new().decl("empty").build();
        assert!(count_direct_calls(&module).is_empty());
    }

    #[test]
    fn analysis_is_deterministic() {
        let module = ModuleFactory::new()
            .func("main", vec![call("foo"), call("bar"), ret()])
            .func("foo", vec![call("bar"), ret()])
            .build();

        assert_eq!(count_direct_calls(&module), count_direct_calls(&module));
    }

    #[test]
    fn iteration_is_sorted_by_name() {
        let mut counts = CallCounts::new();
        counts.record(&FuncName::new("bravo"));
        counts.record(&FuncName::new("alpha"));
        counts.record(&FuncName::new("charlie"));

        let names = counts
            .iter()
            .map(|(name, _)| name.as_str().to_string())
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["alpha", "bravo", "charlie"]);
    }

    #[test]
    fn record_accumulates() {
        let mut counts = CallCounts::new();
        let name = FuncName::new("f");

        assert_eq!(counts.get(&name), 0);
        counts.record(&name);
        counts.record(&name);
        assert_eq!(counts.get(&name), 2);
    }
}
