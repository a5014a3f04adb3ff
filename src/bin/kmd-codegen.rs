use clap::Parser;
use kmd_codegen::interface::{generate_from_config, introspect_from_config, Cli, Logger};
use kmd_codegen::GenerateConfig;
use std::process;

fn main() {
    let cli = Cli::parse();

    let config = match cli.to_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let succeeded = if config.is_introspection() {
        run_introspection(&config)
    } else {
        run_generate(&config)
    };

    if !succeeded {
        process::exit(1);
    }
}

fn run_introspection(config: &GenerateConfig) -> bool {
    let logger = Logger::new(config.is_verbose(), false);
    let run = match introspect_from_config(config) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Error: {}", e);
            return false;
        }
    };

    for warning in &run.warnings {
        logger.warning(warning);
    }
    print!("{}", run.report);

    if !run.is_success() {
        logger.diagnostics(&run.errors);
    }
    run.is_success()
}

fn run_generate(config: &GenerateConfig) -> bool {
    let logger = Logger::new(config.is_verbose(), false);
    let report = match generate_from_config(config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return false;
        }
    };

    if config.list_generated_files {
        for path in &report.written {
            println!("{}", path.display());
        }
    }

    if report.is_success() {
        println!("Generation success");
        true
    } else {
        println!("Generation failed");
        logger.diagnostics(&report.errors);
        false
    }
}
