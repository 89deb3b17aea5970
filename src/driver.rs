use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use crate::config::{Config, LoadConfigError};
use crate::data::module::Module;
use crate::data::parser::{self, ParseError};
use crate::logger::Logger;
use crate::passes::{register_passes, ModulePass, PassError, PassInfo, PassRegistry};
use crate::ui::{CliUi, JsonUi, Ui, UiName};

pub struct DriverArgs<P: AsRef<Path>> {
    module_path: P,
    config_path: Option<P>,
    log_path: Option<P>,
    ui: UiName,
}

impl<P: AsRef<Path>> DriverArgs<P> {
    pub fn new(module_path: P) -> Self {
        DriverArgs {
            module_path,
            config_path: None,
            log_path: None,
            ui: UiName::default(),
        }
    }

    pub fn with_config_path(self, config_path: Option<P>) -> Self {
        Self {
            config_path,
            ..self
        }
    }

    pub fn with_log_path(self, log_path: Option<P>) -> Self {
        Self { log_path, ..self }
    }

    pub fn with_ui(self, ui: UiName) -> Self {
        Self { ui, ..self }
    }
}

#[derive(Debug)]
pub enum DriverError {
    Config(LoadConfigError),
    Parse(ParseError),
    Pass(PassError),
    Io(io::Error),
    NoTerminal,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Config(inner) => write!(f, "{}", inner),
            DriverError::Parse(inner) => write!(f, "{}", inner),
            DriverError::Pass(inner) => write!(f, "{}", inner),
            DriverError::Io(inner) => write!(f, "{}", inner),
            DriverError::NoTerminal => write!(f, "cannot open the terminal for output"),
        }
    }
}

impl From<LoadConfigError> for DriverError {
    fn from(inner: LoadConfigError) -> Self {
        DriverError::Config(inner)
    }
}

impl From<ParseError> for DriverError {
    fn from(inner: ParseError) -> Self {
        DriverError::Parse(inner)
    }
}

impl From<PassError> for DriverError {
    fn from(inner: PassError) -> Self {
        DriverError::Pass(inner)
    }
}

impl From<io::Error> for DriverError {
    fn from(inner: io::Error) -> Self {
        DriverError::Io(inner)
    }
}

pub struct Driver;

impl Driver {
    pub fn run<P: AsRef<Path>>(args: &DriverArgs<P>) -> Result<(), DriverError> {
        let mut ui = Self::make_ui(args.ui)?;

        match Self::run_inner(args, ui.as_mut()) {
            Ok(()) => Ok(()),
            Err(err) => {
                ui.error(&err.to_string());
                Err(err)
            }
        }
    }

    fn make_ui(name: UiName) -> Result<Box<dyn Ui>, DriverError> {
        match name {
            UiName::Cli => CliUi::new()
                .map(|ui| Box::new(ui) as Box<dyn Ui>)
                .ok_or(DriverError::NoTerminal),
            UiName::Json => Ok(Box::new(JsonUi::new())),
        }
    }

    fn run_inner<P: AsRef<Path>>(
        args: &DriverArgs<P>,
        ui: &mut dyn Ui,
    ) -> Result<(), DriverError> {
        let config = match &args.config_path {
            Some(path) => Config::load_from_file(path)?,
            None => Config::default(),
        };

        let mut logger = match &args.log_path {
            Some(path) => Some(Logger::new(path)?),
            None => None,
        };

        let module = Self::load_module(&args.module_path, logger.as_mut())?;

        let mut registry = PassRegistry::new();
        register_passes(&mut registry);

        let passes = Self::run_passes(&config, &registry, &module, logger.as_mut())?;

        ui.prolog(&module);
        for (info, pass) in &passes {
            ui.pass(info, pass.as_ref());
        }
        ui.epilog();

        Ok(())
    }

    fn load_module<P: AsRef<Path>>(
        path: P,
        logger: Option<&mut Logger>,
    ) -> Result<Module, DriverError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let perf = logger.map(|logger| logger.perf("parse module"));
        let module = parser::parse_module(&mut reader)?;
        if let Some(perf) = perf {
            perf.stop();
        }

        Ok(module)
    }

    fn run_passes<'reg>(
        config: &Config,
        registry: &'reg PassRegistry,
        module: &Module,
        mut logger: Option<&mut Logger>,
    ) -> Result<Vec<(&'reg PassInfo, Box<dyn ModulePass>)>, DriverError> {
        let mut passes = Vec::new();

        for pass_config in &config.passes {
            let info = registry
                .info(&pass_config.id)
                .ok_or_else(|| PassError::UnknownPass(pass_config.id.clone()))?;
            let mut pass = info.create();

            let perf = logger
                .as_mut()
                .map(|logger| logger.perf(format!("pass {}", info.arg)));
            let modified = pass.run(module)?;
            if let Some(perf) = perf {
                perf.stop();
            }

            if let Some(logger) = logger.as_mut() {
                logger.info(format_args!(
                    "pass {} finished, module {}",
                    info.arg,
                    if modified { "modified" } else { "unmodified" }
                ));
            }

            passes.push((info, pass));
        }

        Ok(passes)
    }
}
