//! Argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgGroup, ArgMatches, Command};
use migrate_client::DatadogClient;
use migrate_core::{available_patchers, patcher_by_id};
use migrate_model::DocumentKind;
use migrate_store::{Config, LocalStore};

use crate::commands::{dump, patch, update};

const DEFAULT_CONFIG: &str = "config.json";
const DEFAULT_STORE: &str = "objects";

/// Arguments of `dump`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpArgs {
    /// Dashboard reference file
    pub dashboards: Option<PathBuf>,
    /// Monitor reference file
    pub monitors: Option<PathBuf>,
    /// Store root
    pub output: PathBuf,
    /// Fetch objects that already exist locally
    pub update_existing: bool,
}

/// Arguments of `patch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchArgs {
    /// Patcher identifier
    pub patcher: String,
    /// Store root
    pub input: PathBuf,
}

/// Arguments of `update`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateArgs {
    /// Store root
    pub input: PathBuf,
    /// Push every stored object, not only touched ones
    pub update_all: bool,
}

/// Selected command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Pull objects into the store
    Dump(DumpArgs),
    /// Rewrite stored objects
    Patch(PatchArgs),
    /// Push stored objects back
    Update(UpdateArgs),
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Config file path
    pub config: PathBuf,
    /// Command to run
    pub action: Action,
}

fn store_arg(name: &'static str, short: char, help: &'static str) -> Arg {
    Arg::new(name)
        .short(short)
        .long(name)
        .default_value(DEFAULT_STORE)
        .value_parser(value_parser!(PathBuf))
        .help(help)
}

/// Build the `migrate` command
#[must_use]
pub fn command() -> Command {
    Command::new("migrate")
        .version(crate::VERSION)
        .about("Migrate")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .global(true)
                .default_value(DEFAULT_CONFIG)
                .value_parser(value_parser!(PathBuf))
                .help("Path to the config file"),
        )
        .subcommand(
            Command::new("dump")
                .about("Dump all specified datadog objects in input files")
                .arg(
                    Arg::new("dashboards")
                        .short('d')
                        .long("dashboards")
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to the dashboard source file"),
                )
                .arg(
                    Arg::new("monitors")
                        .short('m')
                        .long("monitors")
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to the monitor source file"),
                )
                .group(
                    ArgGroup::new("inputs")
                        .args(["dashboards", "monitors"])
                        .multiple(true)
                        .required(true),
                )
                .arg(store_arg("output", 'o', "Output folder"))
                .arg(
                    Arg::new("update-existing")
                        .short('u')
                        .long("update-existing")
                        .action(ArgAction::SetTrue)
                        .help("Update existing objects from Datadog API"),
                ),
        )
        .subcommand(
            Command::new("patch")
                .about("Patch all specified datadog objects in input files using selected patcher")
                .arg(
                    Arg::new("patcher")
                        .short('p')
                        .long("patcher")
                        .required(true)
                        .help("Name of the patcher to use"),
                )
                .arg(store_arg("input", 'i', "Input folder")),
        )
        .subcommand(
            Command::new("update")
                .about("Update all (touched) files in input directory")
                .arg(store_arg("input", 'i', "Input folder"))
                .arg(
                    Arg::new("update-all")
                        .short('u')
                        .long("update-all")
                        .action(ArgAction::SetTrue)
                        .help("Update all files, not just touched ones"),
                ),
        )
}

fn path_arg(args: &ArgMatches, name: &str) -> Result<PathBuf, anyhow::Error> {
    args.get_one::<PathBuf>(name)
        .cloned()
        .ok_or_else(|| anyhow!("missing --{name}"))
}

impl Invocation {
    /// Read an invocation from parsed arguments
    ///
    /// # Errors
    /// Returns error if no known subcommand was given
    pub fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let Some((name, args)) = matches.subcommand() else {
            bail!("missing command");
        };
        let config = path_arg(args, "config")?;

        let action = match name {
            "dump" => Action::Dump(DumpArgs {
                dashboards: args.get_one::<PathBuf>("dashboards").cloned(),
                monitors: args.get_one::<PathBuf>("monitors").cloned(),
                output: path_arg(args, "output")?,
                update_existing: args.get_flag("update-existing"),
            }),
            "patch" => Action::Patch(PatchArgs {
                patcher: args.get_one::<String>("patcher").cloned().unwrap_or_default(),
                input: path_arg(args, "input")?,
            }),
            "update" => Action::Update(UpdateArgs {
                input: path_arg(args, "input")?,
                update_all: args.get_flag("update-all"),
            }),
            other => bail!("unknown command {other}"),
        };

        Ok(Self { config, action })
    }

    /// Parse from an argument list, program name first
    ///
    /// # Errors
    /// Returns error if the arguments do not parse
    pub fn try_parse_from<I, T>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = command().try_get_matches_from(args)?;
        Self::from_matches(&matches)
    }
}

/// Run an invocation against the live API, printing each report to stdout
///
/// # Errors
/// Returns error if the command could not run or any object failed
pub async fn run(invocation: Invocation) -> anyhow::Result<()> {
    match invocation.action {
        Action::Dump(args) => {
            let config = Config::load(&invocation.config).await?;
            let api = DatadogClient::from_config(&config)?;
            let store = LocalStore::new(&args.output);

            let mut failed = false;
            let inputs = [
                (DocumentKind::Dashboard, &args.dashboards),
                (DocumentKind::Monitor, &args.monitors),
            ];
            for (kind, input) in inputs {
                let Some(input) = input else { continue };
                let report = dump::dump(&config, &api, &store, input, kind, args.update_existing).await?;
                print!("{report}");
                failed |= !report.is_success();
            }
            if failed {
                bail!("failed to dump some objects");
            }
        }
        Action::Patch(args) => {
            let patcher = patcher_by_id(&args.patcher).ok_or_else(|| {
                anyhow!(
                    "missing or unknown patcher {} (available: {})",
                    args.patcher,
                    available_patchers().join(", ")
                )
            })?;
            let store = LocalStore::new(&args.input);

            let report = patch::patch(&store, patcher.as_ref())
                .await
                .with_context(|| format!("failed to patch {}", args.input.display()))?;
            print!("{report}");
            if !report.is_success() {
                bail!("failed to patch some objects");
            }
        }
        Action::Update(args) => {
            let config = Config::load(&invocation.config).await?;
            let api = DatadogClient::from_config(&config)?;
            let store = LocalStore::new(&args.input);

            let report = update::update(&config, &api, &store, args.update_all)
                .await
                .with_context(|| format!("failed to update from {}", args.input.display()))?;
            print!("{report}");
            if !report.is_success() {
                bail!("failed to update some objects");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn command_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn dump_defaults() {
        let invocation = Invocation::try_parse_from(["migrate", "dump", "-m", "monitors.json"]).unwrap();
        assert_eq!(
            invocation,
            Invocation {
                config: PathBuf::from("config.json"),
                action: Action::Dump(DumpArgs {
                    dashboards: None,
                    monitors: Some(PathBuf::from("monitors.json")),
                    output: PathBuf::from("objects"),
                    update_existing: false,
                }),
            }
        );
    }

    #[test]
    fn dump_needs_an_input_file() {
        assert!(Invocation::try_parse_from(["migrate", "dump", "-o", "out"]).is_err());
    }

    #[test]
    fn global_config_after_subcommand() {
        let invocation =
            Invocation::try_parse_from(["migrate", "update", "-u", "-c", "prod.json", "-i", "store"]).unwrap();
        assert_eq!(invocation.config, PathBuf::from("prod.json"));
        assert_eq!(
            invocation.action,
            Action::Update(UpdateArgs {
                input: PathBuf::from("store"),
                update_all: true,
            })
        );
    }

    #[test]
    fn patch_requires_patcher() {
        assert!(Invocation::try_parse_from(["migrate", "patch"]).is_err());
        let invocation = Invocation::try_parse_from(["migrate", "-c", "x.json", "patch", "-p", "KSM-to-core"]).unwrap();
        assert_eq!(invocation.config, PathBuf::from("x.json"));
        assert_eq!(
            invocation.action,
            Action::Patch(PatchArgs {
                patcher: "KSM-to-core".into(),
                input: PathBuf::from("objects"),
            })
        );
    }

    #[tokio::test]
    async fn unknown_patcher_is_an_error() {
        let invocation = Invocation::try_parse_from(["migrate", "patch", "-p", "nope"]).unwrap();
        let err = run(invocation).await.unwrap_err();
        assert!(err.to_string().starts_with("missing or unknown patcher nope"));
    }
}
