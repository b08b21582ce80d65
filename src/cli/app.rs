//! Main CLI application

use crate::config::{validate_targets, Arguments, Variables};
use crate::error::{MakeError, Result, UsageError, UsageResult};
use crate::logging::init_logging;
use crate::runner::{Context, Task, Tasks, Verbosity};
use crate::utils::base;
use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::Colorize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::process;
use tracing::debug;

const DEFAULT_PROGRAM: &str = "rmake";

const HELP_FLAGS: [&str; 3] = ["-h", "-help", "--help"];

/// Entry point for a build script
///
/// ```no_run
/// use rmake::{command, target_default, Make, Tasks, Variables};
///
/// fn targets(vars: &Variables) -> anyhow::Result<Tasks> {
///     let cc = vars.get("CC", "cc")?;
///     let mut tasks = Tasks::new();
///     tasks.add(target_default("build", [command([cc.as_str(), "-o", "hello", "hello.c"])]));
///     Ok(tasks)
/// }
///
/// fn main() {
///     Make::new().script(file!()).main(targets)
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Make {
    program: Option<String>,
    script: Option<PathBuf>,
    deps: Vec<PathBuf>,
}

impl Make {
    pub fn new() -> Self {
        Self::default()
    }

    /// Program name shown in the usage text
    pub fn program(mut self, name: impl Into<String>) -> Self {
        self.program = Some(name.into());
        self
    }

    /// The build script itself; an implicit dependency of every staleness check
    pub fn script(mut self, path: impl Into<PathBuf>) -> Self {
        self.script = Some(path.into());
        self
    }

    /// Add an implicit dependency of every staleness check
    pub fn dependency(mut self, path: impl Into<PathBuf>) -> Self {
        self.deps.push(path.into());
        self
    }

    /// Add implicit dependencies of every staleness check
    pub fn dependencies<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.deps.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Global dependencies: the script first, then the extra ones
    pub fn global_deps(&self) -> Vec<PathBuf> {
        self.script
            .iter()
            .cloned()
            .chain(self.deps.iter().cloned())
            .collect()
    }

    /// Parse arguments and construct the targets
    ///
    /// `args` excludes the program name. Construction errors are reported
    /// here; usage errors are deferred to [`App::run`] so that the usage
    /// text can list the targets.
    pub fn app<I, S, F>(&self, args: I, targets: F) -> Result<App>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce(&Variables) -> anyhow::Result<Tasks>,
    {
        let program = self
            .program
            .clone()
            .unwrap_or_else(|| DEFAULT_PROGRAM.to_string());
        let args: Vec<String> = args.into_iter().map(Into::into).collect();

        let (flags, arguments, parse_error) = if is_help_request(&args) {
            (Flags::help(), Arguments::default(), None)
        } else {
            let parsed = build_command(&program).try_get_matches_from(
                std::iter::once(program.clone()).chain(args.iter().cloned()),
            );
            match parsed {
                Ok(matches) => (Flags::from_matches(&matches), positional(&matches), None),
                Err(err) => (
                    Flags::default(),
                    Arguments::parse(args.iter().filter(|a| !a.starts_with('-'))),
                    Some(clap_message(&err)),
                ),
            }
        };

        let vars = arguments.variables();
        let targets: Vec<Task> = targets(&vars)?.into();
        let has_default = validate_targets(&targets)?;

        Ok(App {
            program,
            global_deps: self.global_deps(),
            flags,
            arguments,
            parse_error,
            vars,
            targets,
            has_default,
        })
    }

    /// Run with arguments in-process
    pub fn run<I, S, F>(&self, args: I, targets: F) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce(&Variables) -> anyhow::Result<Tasks>,
    {
        self.app(args, targets)?.run()
    }

    /// Run with the process arguments and exit
    ///
    /// Exit code 0 on success (including "nothing to be done"), 2 on usage
    /// errors, 1 on any other failure.
    pub fn main<F>(mut self, targets: F) -> !
    where
        F: FnOnce(&Variables) -> anyhow::Result<Tasks>,
    {
        let mut argv = std::env::args();
        let argv0 = argv.next();
        if self.program.is_none() {
            self.program = argv0.map(|a| base(&a));
        }
        let args: Vec<String> = argv.collect();

        let app = match self.app(args, targets) {
            Ok(app) => app,
            Err(err) => exit_with(&err, None),
        };

        init_logging(app.verbosity());

        match app.run() {
            Ok(Outcome::Help) => {
                eprint!("{}", app.usage());
                process::exit(0);
            }
            Ok(Outcome::Ran(_)) => process::exit(0),
            Err(err) => exit_with(&err, Some(&app)),
        }
    }
}

fn exit_with(err: &MakeError, app: Option<&App>) -> ! {
    eprintln!("{} {}", "error:".red().bold(), err);
    if let Some(app) = app.filter(|_| err.wants_usage()) {
        eprintln!();
        eprint!("{}", app.usage());
    }
    process::exit(err.exit_code());
}

/// Global command-line flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub help: bool,
    pub verbose: bool,
    pub quiet: bool,
}

impl Flags {
    fn help() -> Self {
        Flags {
            help: true,
            ..Flags::default()
        }
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Flags {
            help: false,
            verbose: matches.get_flag("verbose"),
            quiet: matches.get_flag("quiet"),
        }
    }
}

/// Result of a successful invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Usage was requested
    Help,

    /// Targets ran, in order
    Ran(Vec<TargetRun>),
}

/// Whether a selected target did any work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRun {
    pub name: String,
    pub worked: bool,
}

/// A parsed invocation with its constructed targets
#[derive(Debug)]
pub struct App {
    program: String,
    global_deps: Vec<PathBuf>,
    flags: Flags,
    arguments: Arguments,
    parse_error: Option<String>,
    vars: Variables,
    targets: Vec<Task>,
    has_default: bool,
}

impl App {
    /// Available top-level targets
    pub fn targets(&self) -> &[Task] {
        &self.targets
    }

    /// Variables with the queries recorded during construction
    pub fn variables(&self) -> &Variables {
        &self.vars
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn verbosity(&self) -> Verbosity {
        if self.flags.verbose {
            Verbosity::Verbose
        } else if self.flags.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }

    /// Execution context for this invocation
    pub fn context(&self) -> Context {
        Context::new()
            .with_global_deps(self.global_deps.iter().cloned())
            .with_verbosity(self.verbosity())
    }

    /// Select and run the requested targets
    ///
    /// One context is shared by all selected targets, so a task reachable
    /// from several of them runs once. The first failure stops the run.
    pub fn run(&self) -> Result<Outcome> {
        if let Some(name) = self.vars.unknown().into_iter().next() {
            return Err(UsageError::UnknownVariable(name).into());
        }
        if self.flags.help {
            return Ok(Outcome::Help);
        }
        if let Some(message) = &self.parse_error {
            return Err(UsageError::InvalidArguments(message.clone()).into());
        }

        let selected = select_targets(&self.targets, &self.arguments.targets, self.has_default)?;

        let mut ctx = self.context();
        let mut results = Vec::with_capacity(selected.len());

        for task in selected {
            let name = task.name().unwrap_or_default().to_string();
            debug!(target_name = %name, "running target");

            let worked = task.run(&mut ctx)?;
            if !worked {
                ctx.print_nothing_to_do(&name);
            }
            results.push(TargetRun { name, worked });
        }

        Ok(Outcome::Ran(results))
    }

    /// Usage text listing targets and variables
    pub fn usage(&self) -> String {
        let meta = if self.has_default { "[TARGET]..." } else { "target" };
        let prog = &self.program;

        let mut out = format!("Usage: {} {} [VAR=value]...\n", prog, meta);
        out.push_str(&format!("       {} -h|--help\n\n", prog));
        out.push_str("Options:\n");
        out.push_str("  -v, --verbose  Print debug logging\n");
        out.push_str("  -q, --quiet    Do not print commands as they run\n\n");
        out.push_str("Targets:\n");

        for task in &self.targets {
            match task.name() {
                Some(name) if task.is_default() => out.push_str(&format!("  {} (default)\n", name)),
                Some(name) => out.push_str(&format!("  {}\n", name)),
                None => {}
            }
        }

        let entries = self.vars.entries();
        if !entries.is_empty() {
            out.push_str("\nVariables:\n");
            for (name, value) in entries {
                if value.is_empty() {
                    out.push_str(&format!("  {}\n", name));
                } else {
                    out.push_str(&format!("  {} ({})\n", name, value));
                }
            }
        }

        out.push('\n');
        out
    }
}

/// Pick the targets to run, in declaration order
///
/// With no names, the default targets are selected. Every name must match a
/// target.
pub fn select_targets(
    available: &[Task],
    names: &[String],
    has_default: bool,
) -> UsageResult<Vec<Task>> {
    if names.is_empty() && !has_default {
        return Err(UsageError::NoTarget);
    }

    let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
    let mut found = HashSet::new();
    let mut selected = Vec::new();

    for task in available {
        let Some(name) = task.name() else {
            continue;
        };
        if wanted.contains(name) || (wanted.is_empty() && task.is_default()) {
            selected.push(task.clone());
            found.insert(name);
        }
    }

    for name in names {
        if !found.contains(name.as_str()) {
            return Err(UsageError::UnknownTarget(name.clone()));
        }
    }

    Ok(selected)
}

/// Build the clap command
fn build_command(program: &str) -> Command {
    Command::new(program.to_string())
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print debug logging")
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Do not print commands as they run")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("args")
                .value_name("ARG")
                .help("Target names and VAR=value assignments")
                .num_args(0..)
                .action(ArgAction::Append),
        )
}

/// Help is honored only as the sole argument
fn is_help_request(args: &[String]) -> bool {
    matches!(args, [only] if HELP_FLAGS.contains(&only.as_str()))
}

/// Positional arguments from parsed matches
fn positional(matches: &ArgMatches) -> Arguments {
    let tokens: Vec<&String> = matches
        .get_many::<String>("args")
        .map(|values| values.collect())
        .unwrap_or_default();
    Arguments::parse(tokens.into_iter().map(String::as_str))
}

/// First line of a clap error, without the "error: " prefix
fn clap_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}
