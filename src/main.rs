use std::process;

use clap::{App, Arg};

use static_cc::driver::{Driver, DriverArgs};
use static_cc::ui::UiName;

fn main() {
    let matches = App::new("static-cc")
        .version("0.1")
        .about("Counts per-function direct calls in an IR module")
        .arg(
            Arg::with_name("MODULE")
                .help("Input IR file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("Config file listing the passes to run")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("log")
                .long("log")
                .value_name("FILE")
                .help("Write a run log to the given file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("json")
                .long("json")
                .help("Print results as a JSON document"),
        )
        .get_matches();

    let ui = if matches.is_present("json") {
        UiName::Json
    } else {
        UiName::Cli
    };

    let args = DriverArgs::new(matches.value_of("MODULE").unwrap())
        .with_config_path(matches.value_of("config"))
        .with_log_path(matches.value_of("log"))
        .with_ui(ui);

    // The error has already been reported through the UI.
    if Driver::run(&args).is_err() {
        process::exit(1);
    }
}
