use std::io::{self, Stdout, Write};

use chrono::prelude::*;
use serde::{Deserialize, Serialize};

use super::Ui;
use crate::data::module::Module;
use crate::passes::{ModulePass, PassInfo};

#[derive(Serialize, Deserialize)]
struct Output {
    version: String,
    utc_time: DateTime<Utc>,
    local_time: DateTime<Local>,
    functions_count: usize,
    passes: Vec<Pass>,
}

#[derive(Serialize, Deserialize)]
struct ErrorOutput {
    version: String,
    utc_time: DateTime<Utc>,
    local_time: DateTime<Local>,
    error: String,
}

#[derive(Serialize, Deserialize)]
struct Pass {
    name: String,
    functions: Vec<FunctionCount>,
}

#[derive(Serialize, Deserialize)]
struct FunctionCount {
    name: String,
    direct_calls: u32,
}

/// Machine-readable front-end: one JSON document on stdout at the end of the
/// run.
pub struct JsonUi {
    terminal: Stdout,
    output: Output,
}

impl JsonUi {
    pub fn new() -> Self {
        JsonUi {
            terminal: io::stdout(),
            output: Output {
                version: String::from("v1"),
                utc_time: Utc::now(),
                local_time: Local::now(),
                functions_count: 0,
                passes: Vec::new(),
            },
        }
    }
}

impl Ui for JsonUi {
    fn prolog(&mut self, module: &Module) {
        self.output.functions_count = module.functions.len();
    }

    fn pass(&mut self, info: &PassInfo, pass: &dyn ModulePass) {
        let functions = match pass.counts() {
            Some(counts) => counts
                .iter()
                .map(|(name, direct_calls)| FunctionCount {
                    name: name.as_str().to_owned(),
                    direct_calls,
                })
                .collect(),
            None => Vec::new(),
        };

        self.output.passes.push(Pass {
            name: info.arg.to_owned(),
            functions,
        });
    }

    fn epilog(&mut self) {
        write!(
            self.terminal,
            "{}",
            serde_json::to_string(&self.output).unwrap()
        )
        .unwrap();
    }

    fn error(&mut self, error: &str) {
        let error_output = ErrorOutput {
            version: self.output.version.clone(),
            utc_time: self.output.utc_time,
            local_time: self.output.local_time,
            error: error.to_owned(),
        };

        write!(
            self.terminal,
            "{}",
            serde_json::to_string(&error_output).unwrap()
        )
        .unwrap();
    }
}
