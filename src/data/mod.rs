pub mod function;
pub mod instruction;
pub mod module;
pub mod parser;
pub mod types;

pub use function::{BasicBlock, Function};
pub use instruction::{BinOp, Instruction, Operand};
pub use module::Module;
pub use types::{FuncName, Label, VarName};
