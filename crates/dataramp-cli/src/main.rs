use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, ValueHint};
use std::path::PathBuf;

use dataramp::config::PathKey;
use dataramp::logging::{self, DEFAULT_FILTER};
use dataramp::{create_project, PathResolver};

fn main() -> Result<()> {
    let key_names: Vec<&'static str> = PathKey::ALL.iter().map(|k| k.name()).collect();

    let matches = Command::new("dataramp")
        .version(clap::crate_version!())
        .author("Meshack Kitonga")
        .about("dataramp - scaffold data-science projects and look up their paths")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log_file")
                .long("log-file")
                .global(true)
                .help("Append log records to this file instead of stderr")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .subcommand(
            Command::new("new")
                .about("Create a new project with the standard folder layout")
                .arg(
                    Arg::new("name")
                        .help("Name of the project folder to create")
                        .required(true)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                )
                .arg(dir_arg("Parent directory of the new project")),
        )
        .subcommand(
            Command::new("path")
                .about("Print a project path recorded in the project configuration")
                .arg(
                    Arg::new("key")
                        .help("Logical path key")
                        .required(true)
                        .value_parser(key_names),
                )
                .arg(dir_arg("Directory to start the configuration lookup from")),
        )
        .subcommand(
            Command::new("config")
                .about("Print the project configuration as JSON")
                .arg(dir_arg("Directory to start the configuration lookup from")),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Written by {author-with-newline}Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    let log_file = matches.get_one::<PathBuf>("log_file");
    logging::init(DEFAULT_FILTER, log_file.map(PathBuf::as_path))
        .context("failed to set up logging")?;

    match matches.subcommand() {
        Some(("new", sub_m)) => handle_new(sub_m),
        Some(("path", sub_m)) => handle_path(sub_m),
        Some(("config", sub_m)) => handle_config(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn dir_arg(help: &'static str) -> Arg {
    Arg::new("dir")
        .short('d')
        .long("dir")
        .help(help)
        .default_value(".")
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::DirPath)
}

fn dir_of(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<PathBuf>("dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."))
}

fn handle_new(matches: &ArgMatches) -> Result<()> {
    let name = matches
        .get_one::<String>("name")
        .context("missing project name")?;
    let parent = dir_of(matches);
    log::debug!("[dataramp::new] Creating {} in {:?}", name, parent);

    let config = create_project(&parent, name)
        .with_context(|| format!("failed to create project `{}`", name))?;
    println!("{}", config.base_path.display());
    Ok(())
}

fn handle_path(matches: &ArgMatches) -> Result<()> {
    let key = matches.get_one::<String>("key").context("missing path key")?;
    let resolver = PathResolver::new(dir_of(matches));

    let path = resolver
        .resolve(key)
        .with_context(|| format!("failed to resolve `{}`", key))?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config(matches: &ArgMatches) -> Result<()> {
    let resolver = PathResolver::new(dir_of(matches));
    let config = resolver.load_config()?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
