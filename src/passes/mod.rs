//! Pass interface for host frameworks that run analyses eagerly.
//!
//! A pass is constructed through the [`PassRegistry`], run once over a
//! module, and may afterwards print its result to a caller-supplied stream.
//! Registration is explicit: the host calls [`register_passes`] once at
//! startup instead of relying on static registration side effects.

use std::fmt;
use std::io::{self, Write};

use crate::analysis::call_counts::CallCounts;
use crate::data::module::Module;

pub mod call_counter;

pub use call_counter::StaticCallCounter;

#[derive(Debug)]
pub enum PassError {
    UnknownPass(String),
    Inner(String),
}

impl fmt::Display for PassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassError::UnknownPass(arg) => write!(f, "unknown pass `{}`", arg),
            PassError::Inner(error) => write!(f, "pass error: {}", error),
        }
    }
}

/// A unit of analysis executed over a whole module.
pub trait ModulePass {
    /// Runs the pass. Returns whether the module's structure was modified,
    /// which for a pure analysis is always `false`.
    fn run(&mut self, module: &Module) -> Result<bool, PassError>;

    /// Prints the stored result of the last `run`, if the pass has one. The
    /// default implementation prints nothing.
    fn print(&self, out: &mut dyn Write) -> io::Result<()> {
        let _ = out;
        Ok(())
    }

    /// Structured result of the last `run`, for front-ends that want the
    /// table rather than its printed form.
    fn counts(&self) -> Option<&CallCounts> {
        None
    }
}

/// Description of a registered pass: its command name, what it does, and its
/// capability flags.
pub struct PassInfo {
    pub arg: &'static str,
    pub description: &'static str,
    /// The pass leaves the control flow graph untouched.
    pub preserves_cfg: bool,
    /// The pass is a pure analysis.
    pub is_analysis: bool,
    ctor: fn() -> Box<dyn ModulePass>,
}

impl PassInfo {
    pub fn new(
        arg: &'static str,
        description: &'static str,
        preserves_cfg: bool,
        is_analysis: bool,
        ctor: fn() -> Box<dyn ModulePass>,
    ) -> Self {
        PassInfo {
            arg,
            description,
            preserves_cfg,
            is_analysis,
            ctor,
        }
    }

    pub fn create(&self) -> Box<dyn ModulePass> {
        (self.ctor)()
    }
}

/// Registry of passes available to the host, keyed by command name.
pub struct PassRegistry {
    infos: Vec<PassInfo>,
}

impl PassRegistry {
    pub fn new() -> Self {
        PassRegistry { infos: Vec::new() }
    }

    pub fn register(&mut self, info: PassInfo) {
        self.infos.push(info);
    }

    pub fn info(&self, arg: &str) -> Option<&PassInfo> {
        self.infos.iter().find(|info| info.arg == arg)
    }

    pub fn create(&self, arg: &str) -> Result<Box<dyn ModulePass>, PassError> {
        self.info(arg)
            .map(|info| info.create())
            .ok_or_else(|| PassError::UnknownPass(arg.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PassInfo> {
        self.infos.iter()
    }
}

impl Default for PassRegistry {
    fn default() -> Self {
        PassRegistry::new()
    }
}

/// Registers every pass this crate provides. Called once by the host at
/// process start.
pub fn register_passes(registry: &mut PassRegistry) {
    registry.register(StaticCallCounter::info());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_registered_passes() {
        let mut registry = PassRegistry::new();
        register_passes(&mut registry);

        let info = registry.info(StaticCallCounter::ARG).unwrap();
        assert!(info.preserves_cfg);
        assert!(info.is_analysis);
        assert!(registry.create(StaticCallCounter::ARG).is_ok());
    }

    #[test]
    fn unknown_pass_is_an_error() {
        let registry = PassRegistry::new();

        match registry.create("no-such-pass") {
            Err(PassError::UnknownPass(arg)) => assert_eq!(arg, "no-such-pass"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
