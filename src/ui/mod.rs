mod cli;
mod json;

use crate::data::module::Module;
use crate::passes::{ModulePass, PassInfo};

pub use cli::CliUi;
pub use json::JsonUi;

/// Output front-end for one driver run.
pub trait Ui {
    fn prolog(&mut self, _module: &Module) {}
    fn pass(&mut self, info: &PassInfo, pass: &dyn ModulePass);
    fn epilog(&mut self) {}
    fn error(&mut self, error: &str);
}

#[derive(Clone, Copy)]
pub enum UiName {
    Cli,
    Json,
}

impl Default for UiName {
    fn default() -> Self {
        UiName::Cli
    }
}
