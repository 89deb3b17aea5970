use std::io::{self, Write};

use super::{ModulePass, PassError, PassInfo};
use crate::analysis::call_counts::{count_direct_calls, CallCounts};
use crate::data::module::Module;
use crate::report;

/// Eager wrapper around the direct call counting analysis: `run` computes and
/// stores the table, `print` renders it.
pub struct StaticCallCounter {
    counts: Option<CallCounts>,
}

impl StaticCallCounter {
    pub const ARG: &'static str = CallCounts::KEY;
    pub const DESCRIPTION: &'static str =
        "For each function print the number of direct calls";

    pub fn new() -> Self {
        StaticCallCounter { counts: None }
    }

    pub fn info() -> PassInfo {
        PassInfo::new(
            Self::ARG,
            Self::DESCRIPTION,
            true, // does not modify the CFG
            true, // pure analysis
            || Box::new(StaticCallCounter::new()),
        )
    }
}

impl Default for StaticCallCounter {
    fn default() -> Self {
        StaticCallCounter::new()
    }
}

impl ModulePass for StaticCallCounter {
    fn run(&mut self, module: &Module) -> Result<bool, PassError> {
        self.counts = Some(count_direct_calls(module));
        Ok(false)
    }

    fn print(&self, out: &mut dyn Write) -> io::Result<()> {
        // Nothing to print before the first run.
        if let Some(counts) = &self.counts {
            report::write_banner(out)?;
            report::write_table(out, counts)?;
        }

        Ok(())
    }

    fn counts(&self) -> Option<&CallCounts> {
        self.counts.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::analysis::call_counts::tests::{call, ModuleFactory};
    use crate::data::instruction::Instruction;
    use crate::data::types::FuncName;

    fn ret() -> Instruction {
        Instruction::Ret { value: None }
    }

    #[test]
    fn run_reports_module_unmodified() {
        let module = Module::new();
        let mut pass = StaticCallCounter::new();

        assert_eq!(pass.run(&module).unwrap(), false);
        assert!(pass.counts().unwrap().is_empty());
    }

    #[test]
    fn run_stores_the_table_for_print() {
        let module = ModuleFactory::new()
            .func("main", vec![call("foo"), call("foo"), call("bar"), ret()])
            .func("foo", vec![call("bar"), ret()])
            .decl("bar")
            .build();

        let mut pass = StaticCallCounter::new();
        pass.run(&module).unwrap();

        assert_eq!(pass.counts().unwrap().get(&FuncName::new("bar")), 2);
        assert_eq!(pass.counts().unwrap().get(&FuncName::new("foo")), 1);

        let mut out = Vec::new();
        pass.print(&mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();

        let expected = "\
=================================================\n\
static analysis results\n\
=================================================\n\
NAME                 #N DIRECT CALLS\n\
-------------------------------------------------\n\
bar                  2         \n\
foo                  1         \n";

        assert_eq!(printed, expected);
    }

    #[test]
    fn print_before_run_writes_nothing() {
        let pass = StaticCallCounter::new();

        let mut out = Vec::new();
        pass.print(&mut out).unwrap();

        assert!(out.is_empty());
    }
}
