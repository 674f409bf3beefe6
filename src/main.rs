use imageprep::args::{self, ParseOutcome};
use imageprep::config::{self, DefaultsSettings};
use imageprep::imaging::SipsTool;
use imageprep::interrupt::Cancellation;
use imageprep::output::{self, Reporter};
use imageprep::{paths, process};
use std::error::Error;
use std::process::ExitCode;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let (message, code) = output::format_fatal(e.as_ref());
            // Errors print even with --quiet
            Reporter::new(true).error(&message);
            ExitCode::from(code)
        }
    }
}

/// Handle `--help`, `--version` and `--gen-config`.
fn print_exit(outcome: ParseOutcome) -> Result<(), Box<dyn Error>> {
    match outcome {
        ParseOutcome::Help => print!("{}", output::help_text()),
        ParseOutcome::Version => println!("imageprep {}", version_string()),
        ParseOutcome::GenConfig => print!("{}", config::stock_config_toml()),
        ParseOutcome::Run(_) => {}
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn Error>> {
    let argv = args::utf8_args(std::env::args_os().skip(1))?;

    // Exit flags and -v work without reading the settings file.
    let verbose = match args::parse(&argv, &DefaultsSettings::default())? {
        ParseOutcome::Run(invocation) => invocation.config.verbose,
        exit => return print_exit(exit),
    };
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let settings = config::load_from_env()?;
    let invocation = match args::parse(&argv, &settings.defaults)? {
        ParseOutcome::Run(invocation) => invocation,
        exit => return print_exit(exit),
    };
    let run_config = &invocation.config;

    let reporter = Reporter::new(run_config.quiet);
    for warning in &invocation.warnings {
        reporter.warning(warning);
    }

    let cwd = paths::current_dir()?;
    let layout = paths::plan_layout(run_config, &cwd)?;
    for warning in &layout.warnings {
        reporter.warning(warning);
    }
    if !run_config.info_only {
        for line in output::format_header(run_config, &layout) {
            reporter.progress(&line);
        }
    }

    let cancel = Cancellation::install();
    let tool = SipsTool::new(&settings.tool.path);
    log::debug!(
        "{} source file(s), tool {}",
        layout.sources.len(),
        tool.program().display()
    );

    let summary = process::process(run_config, &layout, &tool, &cancel, |event| {
        reporter.event(&event)
    })?;

    if !run_config.info_only {
        reporter.progress(&output::format_summary(summary.converted));
    }
    Ok(())
}
