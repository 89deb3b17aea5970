use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use yaml_rust::{ScanError, Yaml, YamlLoader};

use crate::passes::StaticCallCounter;

/// One pass to run, by command name, with its options.
#[derive(Debug)]
pub struct PassConfig {
    pub id: String,
    pub opts: HashMap<String, Yaml>,
}

impl PassConfig {
    pub fn new<T: Into<String>>(id: T) -> Self {
        PassConfig {
            id: id.into(),
            opts: HashMap::new(),
        }
    }
}

#[derive(Debug)]
pub struct Config {
    pub passes: Vec<PassConfig>,
}

#[derive(Debug)]
pub enum LoadConfigError {
    Io(io::Error),
    Yaml(ScanError),
    Invalid(String),
    UnknownOption(String),
}

impl fmt::Display for LoadConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadConfigError::Io(inner) => write!(f, "cannot read config: {}", inner),
            LoadConfigError::Yaml(inner) => write!(f, "invalid config yaml: {}", inner),
            LoadConfigError::Invalid(what) => write!(f, "invalid config: {}", what),
            LoadConfigError::UnknownOption(option) => {
                write!(f, "unknown config option `{}`", option)
            }
        }
    }
}

impl Default for Config {
    /// Runs the call counter alone; this is what the tool does when no config
    /// file is given.
    fn default() -> Self {
        Config {
            passes: vec![PassConfig::new(StaticCallCounter::ARG)],
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(filepath: P) -> Result<Self, LoadConfigError> {
        let mut file = File::open(filepath).map_err(LoadConfigError::Io)?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(LoadConfigError::Io)?;

        Self::load_from_str(&content)
    }

    pub fn load_from_str(content: &str) -> Result<Self, LoadConfigError> {
        let yaml = YamlLoader::load_from_str(content).map_err(LoadConfigError::Yaml)?;

        let config = yaml
            .get(0)
            .ok_or_else(|| LoadConfigError::Invalid("empty file".to_string()))
            .and_then(|item| {
                item.as_hash()
                    .ok_or_else(|| LoadConfigError::Invalid("expected a mapping".to_string()))
            })?;

        let mut passes = Vec::new();

        for (key, value) in config {
            match key
                .as_str()
                .ok_or_else(|| LoadConfigError::Invalid("expected string keys".to_string()))?
            {
                "passes" => {
                    for entry in value.as_vec().ok_or_else(|| {
                        LoadConfigError::Invalid("`passes` must be a list".to_string())
                    })? {
                        passes.push(Self::parse_pass(entry)?);
                    }
                }
                option => return Err(LoadConfigError::UnknownOption(option.to_string())),
            }
        }

        if passes.is_empty() {
            passes = Config::default().passes;
        }

        Ok(Config { passes })
    }

    fn parse_pass(entry: &Yaml) -> Result<PassConfig, LoadConfigError> {
        match entry {
            Yaml::String(id) => Ok(PassConfig::new(id)),
            Yaml::Hash(hash) => {
                let (id, opts) = hash.iter().next().ok_or_else(|| {
                    LoadConfigError::Invalid("empty pass entry".to_string())
                })?;

                let id = id.as_str().ok_or_else(|| {
                    LoadConfigError::Invalid("pass name must be a string".to_string())
                })?;

                let mut pass = PassConfig::new(id);

                if let Some(opts) = opts.as_hash() {
                    for (opt_key, opt_value) in opts {
                        let opt_key = opt_key.as_str().ok_or_else(|| {
                            LoadConfigError::Invalid(
                                "pass option keys must be strings".to_string(),
                            )
                        })?;
                        pass.opts.insert(opt_key.to_string(), opt_value.clone());
                    }
                } else if !opts.is_null() {
                    return Err(LoadConfigError::Invalid(
                        "pass options must be a mapping".to_string(),
                    ));
                }

                Ok(pass)
            }
            _ => Err(LoadConfigError::Invalid(
                "pass entries must be names or mappings".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_runs_the_call_counter() {
        let config = Config::default();

        assert_eq!(config.passes.len(), 1);
        assert_eq!(config.passes[0].id, StaticCallCounter::ARG);
    }

    #[test]
    fn plain_pass_list() {
        let config = Config::load_from_str("passes:\n  - static-cc\n").unwrap();

        assert_eq!(config.passes.len(), 1);
        assert_eq!(config.passes[0].id, "static-cc");
        assert!(config.passes[0].opts.is_empty());
    }

    #[test]
    fn pass_with_options() {
        let config =
            Config::load_from_str("passes:\n  - static-cc:\n      verbose: true\n").unwrap();

        assert_eq!(config.passes[0].id, "static-cc");
        assert_eq!(
            config.passes[0].opts.get("verbose"),
            Some(&Yaml::Boolean(true))
        );
    }

    #[test]
    fn unknown_top_level_option_is_rejected() {
        match Config::load_from_str("surprises: yes\n") {
            Err(LoadConfigError::UnknownOption(option)) => assert_eq!(option, "surprises"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
