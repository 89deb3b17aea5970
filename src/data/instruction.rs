use std::fmt;

use super::types::{FuncName, Label, VarName};

/// An operand of an instruction.
///
/// `Func` is a literal reference to a named function; everything else is a
/// runtime-computed value from the point of view of call classification.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Operand {
    Local(VarName),
    Func(FuncName),
    Const(i64),
    /// A pointer-cast (or similar adapter) wrapped around another operand.
    /// Casts never change which value an operand denotes.
    Cast(Box<Operand>),
}

impl Operand {
    /// Peels any number of cast layers off the operand.
    pub fn strip_casts(&self) -> &Operand {
        let mut op = self;
        while let Operand::Cast(inner) = op {
            op = &**inner;
        }
        op
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Local(var) => write!(f, "{}", var),
            Operand::Func(func) => write!(f, "@{}", func),
            Operand::Const(value) => write!(f, "{}", value),
            Operand::Cast(inner) => write!(f, "bitcast({})", inner),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// One IR instruction. Instructions are read-only after construction; the
/// analyses in this crate never mutate them.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Instruction {
    Binary {
        op: BinOp,
        dest: VarName,
        lhs: Operand,
        rhs: Operand,
    },
    Load {
        dest: VarName,
        src: Operand,
    },
    Store {
        dest: Operand,
        value: Operand,
    },
    Call {
        dest: Option<VarName>,
        callee: Operand,
        args: Vec<Operand>,
    },
    /// A call with exception edges. For call classification it behaves
    /// exactly like `Call`.
    Invoke {
        dest: Option<VarName>,
        callee: Operand,
        args: Vec<Operand>,
        normal: Label,
        unwind: Label,
    },
    Branch {
        cond: Option<Operand>,
        targets: Vec<Label>,
    },
    Ret {
        value: Option<Operand>,
    },
}

impl Instruction {
    /// The callee operand, if this instruction is a call-type operation.
    pub fn callee(&self) -> Option<&Operand> {
        match self {
            Instruction::Call { callee, .. } => Some(callee),
            Instruction::Invoke { callee, .. } => Some(callee),
            _ => None,
        }
    }

    /// The statically resolved call target, if there is one.
    ///
    /// Returns the callee function iff this is a call-type instruction whose
    /// callee, after stripping casts, is a literal function reference. Calls
    /// through locals (function pointers, vtable slots) yield `None` and are
    /// treated as indirect.
    pub fn direct_callee(&self) -> Option<&FuncName> {
        match self.callee()?.strip_casts() {
            Operand::Func(func) => Some(func),
            _ => None,
        }
    }
}
