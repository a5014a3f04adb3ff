use crate::interface::config::GenerateConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kmd-codegen")]
#[command(version, about = "Generate code from interface description documents")]
pub struct Cli {
    /// Primary document files or directories; their content is generated
    #[arg(short = 'r', long = "rom", num_args = 1.., value_name = "PATH")]
    pub rom: Vec<PathBuf>,

    /// Dependency document files or directories; referenced but never generated
    #[arg(long = "deprom", visible_alias = "dr", num_args = 1.., value_name = "PATH")]
    pub deprom: Vec<PathBuf>,

    /// Template directory; takes precedence over the built-in set
    #[arg(short = 't', long = "templates", value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Built-in template set (rust or typescript)
    #[arg(long = "internal-templates", visible_alias = "it", value_name = "NAME")]
    pub internal_templates: Option<String>,

    /// Destination directory for generated code
    #[arg(short = 'c', long = "codegen", value_name = "DIR")]
    pub codegen: Option<PathBuf>,

    /// Delete the destination directory's contents before generating
    #[arg(short = 'd', long = "delete", action = clap::ArgAction::SetTrue)]
    pub delete: bool,

    /// Do not overwrite files that already exist
    #[arg(short = 'n', long = "no-overwrite", action = clap::ArgAction::SetTrue)]
    pub no_overwrite: bool,

    /// Print the path of every generated file
    #[arg(long = "list-generated-files", visible_alias = "lf", action = clap::ArgAction::SetTrue)]
    pub list_generated_files: bool,

    /// Config overlay document (JSON)
    #[arg(long = "config", visible_alias = "cf", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the value of each dotted key for every module, then exit
    #[arg(short = 's', long = "show-values", num_args = 1.., value_name = "KEY")]
    pub show_values: Vec<String>,

    /// Directory receiving the merged model as documents
    #[arg(short = 'o', long = "output-model", value_name = "DIR")]
    pub output_model: Option<PathBuf>,

    /// File-name pattern used when scanning directories
    #[arg(long = "pattern", value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Run settings file (JSON); flags given here take precedence
    #[arg(long = "settings", value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::SetTrue)]
    pub verbose: bool,
}

impl From<&Cli> for GenerateConfig {
    fn from(cli: &Cli) -> Self {
        let defaults = GenerateConfig::default();
        GenerateConfig {
            rom: cli.rom.clone(),
            deprom: cli.deprom.clone(),
            templates: cli.templates.clone(),
            internal_templates: cli
                .internal_templates
                .clone()
                .unwrap_or(defaults.internal_templates),
            codegen: cli.codegen.clone(),
            delete: cli.delete,
            no_overwrite: cli.no_overwrite,
            list_generated_files: cli.list_generated_files,
            config: cli.config.clone(),
            show_values: cli.show_values.clone(),
            output_model: cli.output_model.clone(),
            pattern: cli.pattern.clone().unwrap_or(defaults.pattern),
            verbose: cli.verbose.then_some(true),
        }
    }
}

impl Cli {
    /// Settings file (if any) with the command line merged over it
    pub fn to_config(&self) -> Result<GenerateConfig, crate::interface::config::ConfigError> {
        let mut config = match &self.settings {
            Some(path) => GenerateConfig::from_file(path)?,
            None => GenerateConfig::default(),
        };
        config.merge(&GenerateConfig::from(self));
        Ok(config)
    }
}
