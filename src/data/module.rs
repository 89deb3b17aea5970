use super::function::Function;
use super::types::FuncName;

/// One translation unit's worth of IR: all of its functions, in source order.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Module {
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new() -> Self {
        Module {
            functions: Vec::new(),
        }
    }

    pub fn get(&self, name: &FuncName) -> Option<&Function> {
        self.functions.iter().find(|func| &func.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for Module {
    fn default() -> Self {
        Module::new()
    }
}
