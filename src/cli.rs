//! CLI: check → generate | fix-all | apply
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use anyhow::{bail, Context};
use clap::{Parser, Subcommand, Args};
use colored::Colorize;

use crate::apply::{apply, create};
use crate::codegen::Codegen;
use crate::config::Config;
use crate::contract::{declared_contracts, MethodPlan};
use crate::ir::Ty;
use crate::suggest::{self, Edit, Location, Severity};
use crate::workspace::Workspace;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// find mapping contracts in a workspace of type descriptions and generate their copy bodies
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// JSON config file (built-in defaults when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// debug logging; RUST_LOG takes precedence
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print mapping diagnostics
    Check(CheckOut),
    /// print generated mapping methods as Rust
    Generate(GenerateOut),
    /// compute every suggestion in the workspace, printed as JSON edits
    FixAll(FixAllOut),
    /// run a type's mapping over JSON records
    Apply(ApplyOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more workspace files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// only this type
    #[arg(long = "type")]
    type_name: Option<String>,

    /// output .rs file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct FixAllOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ApplyOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// type declaring the mapping contract
    #[arg(long = "type")]
    type_name: String,

    /// type written to (picks the contract and, for two-way contracts, the direction)
    #[arg(long)]
    into: Option<String>,

    /// JSON record read from
    #[arg(long)]
    source: PathBuf,

    /// JSON record written into; a new record is created when omitted
    #[arg(long)]
    target: Option<PathBuf>,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_workspace(&self) -> anyhow::Result<Workspace> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut ws = Workspace::default();
        for source_path in source_paths {
            let loaded = Workspace::load(&source_path)
                .with_context(|| format!("failed to load workspace file ({})", source_path.display()))?;
            tracing::debug!(path = %source_path.display(), types = loaded.len(), "workspace file loaded");
            ws.merge(loaded);
        }
        Ok(ws)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn verbose(&self) -> bool {
        self.verbose
    }
    pub fn run(&self) -> anyhow::Result<()> {
        let cfg = Config::load_or_default(self.config.as_deref())
            .context("failed to load config")?;
        match &self.cmd {
            Command::Check(target) => {
                let ws = target.input_settings.load_workspace()?;
                let mut errors = 0;
                for desc in ws.iter() {
                    for diagnostic in suggest::diagnose(&cfg, desc) {
                        let label = match diagnostic.severity {
                            Severity::Hidden => diagnostic.id.cyan(),
                            Severity::Error => {
                                errors += 1;
                                diagnostic.id.red().bold()
                            }
                        };
                        println!("{label} {}: {}", describe(&diagnostic.location), diagnostic.message);
                    }
                }
                if errors > 0 {
                    bail!("{errors} mapping method error(s)");
                }
            }
            Command::Generate(target) => {
                let ws = target.input_settings.load_workspace()?;
                if let Some(name) = target.type_name.as_ref() {
                    if ws.get(name).is_none() {
                        bail!("no type named {name} in the workspace");
                    }
                }
                let mut cg = Codegen::new(&cfg);
                for desc in ws.iter() {
                    if target.type_name.as_ref().is_some_and(|name| name != &desc.name) {
                        continue;
                    }
                    for edit in suggest::fixes_for(&ws, &cfg, desc) {
                        let (method, plan) = match &edit {
                            Edit::ReplaceBody { method, plan, .. } | Edit::AddMethod { method, plan, .. } => (method, plan),
                        };
                        cg.comment(&edit_header(&edit));
                        cg.emit_method(method, plan, &method.body)?;
                    }
                }
                write_output(target.out.as_deref(), &cg.into_string())?;
            }
            Command::FixAll(target) => {
                let ws = target.input_settings.load_workspace()?;
                let cancel = AtomicBool::new(false);
                let fixes = suggest::fix_all(&ws, &cfg, &cancel);
                let src = serde_json::to_string_pretty(&fixes)?;
                write_output(target.out.as_deref(), &src)?;
            }
            Command::Apply(target) => {
                let ws = target.input_settings.load_workspace()?;
                let desc = ws
                    .get(&target.type_name)
                    .with_context(|| format!("no type named {} in the workspace", target.type_name))?;
                let into = target
                    .into
                    .as_deref()
                    .map(str::parse::<Ty>)
                    .transpose()
                    .context("invalid --into type")?;
                let mut found = None;
                for contract in declared_contracts(&cfg, desc) {
                    if let Some(plan) = MethodPlan::writing(&cfg, &contract, into.as_ref())? {
                        found = Some(plan);
                        break;
                    }
                }
                let Some(plan) = found else {
                    bail!("{} declares no mapping contract writing the requested type", desc.name);
                };
                tracing::debug!(from = %plan.read_role(), into = %plan.write_role(), "applying mapping");
                let ops = suggest::operations(&ws, &plan)?;

                let source = read_record(&target.source)?;
                let record = match target.target.as_ref() {
                    Some(path) => {
                        let mut record = read_record(path)?;
                        apply(&ops, &source, &mut record)?;
                        record
                    }
                    None => create(&ops, &suggest::written_shape(&ws, &plan)?, &source)?,
                };
                write_output(target.out.as_deref(), &serde_json::to_string_pretty(&record)?)?;
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn describe(location: &Location) -> String {
    match location {
        Location::Contract { ty, contract } => format!("{} implements {contract}", ty.bold()),
        Location::Method { ty, method, index } => format!("{}::{method} (method #{index})", ty.bold()),
    }
}

fn edit_header(edit: &Edit) -> String {
    match edit {
        Edit::ReplaceBody { ty, index, method, .. } => format!("{ty}: replace body of {} (method #{index})", method.name),
        Edit::AddMethod { ty, method, .. } => format!("{ty}: add {}", method.name),
    }
}

fn read_record(path: &Path) -> anyhow::Result<serde_json::Value> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read record ({})", path.display()))?;
    serde_json::from_str(&src).with_context(|| format!("failed to parse record ({})", path.display()))
}

fn write_output(out: Option<&Path>, src: &str) -> anyhow::Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => println!("{src}"),
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // an explicit glob that matches nothing is a mistake
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
