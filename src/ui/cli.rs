use std::io::Write;

use term::{Attr, StdoutTerminal};

use super::Ui;
use crate::data::module::Module;
use crate::passes::{ModulePass, PassInfo};

/// Terminal front-end: a highlighted line per pass, followed by whatever the
/// pass prints.
pub struct CliUi {
    terminal: Box<StdoutTerminal>,
}

impl CliUi {
    pub fn new() -> Option<Self> {
        Some(CliUi {
            terminal: term::stdout()?,
        })
    }
}

impl Ui for CliUi {
    fn pass(&mut self, info: &PassInfo, pass: &dyn ModulePass) {
        // Attributes can be unsupported by the terminal; ignore failures.
        self.terminal.attr(Attr::Bold).ok();
        writeln!(self.terminal, "{}: {}", info.arg, info.description).ok();
        self.terminal.reset().ok();

        let mut printed = Vec::new();
        pass.print(&mut printed).ok();
        self.terminal.write_all(&printed).ok();

        writeln!(self.terminal).ok();
    }

    fn prolog(&mut self, module: &Module) {
        writeln!(self.terminal, "module with {} function(s)", module.functions.len()).ok();
        writeln!(self.terminal).ok();
    }

    fn error(&mut self, error: &str) {
        eprintln!("error: {}", error);
    }
}
