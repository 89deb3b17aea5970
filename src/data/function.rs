use super::instruction::Instruction;
use super::types::{FuncName, Label, VarName};

/// A basic block: a labeled straight-line run of instructions.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BasicBlock {
    pub label: Label,
    pub insts: Vec<Instruction>,
}

impl BasicBlock {
    pub fn new(label: Label) -> Self {
        BasicBlock {
            label,
            insts: Vec::new(),
        }
    }
}

/// A function definition or declaration. A declaration has no blocks; it can
/// still be the target of direct calls elsewhere in the module.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Function {
    pub name: FuncName,
    pub params: Vec<VarName>,
    pub blocks: Vec<BasicBlock>,
}

impl Function {
    pub fn new(name: FuncName, params: Vec<VarName>) -> Self {
        Function {
            name,
            params,
            blocks: Vec::new(),
        }
    }

    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }
}
