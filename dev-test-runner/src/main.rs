//! Golden fixtures: `fixtures/*.json`, each a workspace plus the expected
//! generated bodies per type, one body per edit in edit order.
use std::collections::BTreeMap;
use std::path::Path;
use anyhow::Context;
use colored::Colorize;
use serde::Deserialize;
use shape_mapper::config::Config;
use shape_mapper::suggest::{fixes_for, Edit};
use shape_mapper::workspace::Workspace;

#[derive(Debug, Deserialize)]
struct Fixture {
    workspace: serde_json::Value,
    #[serde(default)]
    config: Option<serde_json::Value>,
    expect: Expectations,
}

type Expectations = BTreeMap<String, Vec<Vec<String>>>;

fn main() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("fixtures");
    match run(&root) {
        Ok(0) => println!("{}", "all fixtures passed".green()),
        Ok(failed) => {
            eprintln!("{}", format!("{failed} fixture(s) failed").red().bold());
            std::process::exit(1);
        }
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            std::process::exit(2);
        }
    }
}

fn run(root: &Path) -> anyhow::Result<usize> {
    let pattern = root.join("*.json");
    let pattern = pattern.to_string_lossy();
    let mut failed = 0;
    for entry in glob::glob(&pattern)? {
        let path = entry?;
        match check_fixture(&path) {
            Ok(mismatches) if mismatches.is_empty() => println!("{} {}", "PASS".green(), path.display()),
            Ok(mismatches) => {
                failed += 1;
                println!("{} {}", "FAIL".red(), path.display());
                for line in mismatches {
                    println!("    {line}");
                }
            }
            Err(error) => {
                failed += 1;
                println!("{} {}: {error:#}", "FAIL".red(), path.display());
            }
        }
    }
    Ok(failed)
}

fn check_fixture(path: &Path) -> anyhow::Result<Vec<String>> {
    let src = std::fs::read_to_string(path).context("failed to read fixture")?;
    let fixture: Fixture = serde_json::from_str(&src).context("failed to parse fixture")?;
    let cfg = match fixture.config {
        Some(value) => serde_json::from_value::<Config>(value).context("invalid fixture config")?,
        None => Config::default(),
    };
    let ws = Workspace::from_json(&fixture.workspace.to_string())?;
    Ok(compare(&ws, &cfg, &fixture.expect))
}

fn compare(ws: &Workspace, cfg: &Config, expect: &Expectations) -> Vec<String> {
    let mut mismatches = Vec::new();
    for (ty, expected) in expect {
        let Some(desc) = ws.get(ty) else {
            mismatches.push(format!("{ty}: not in the workspace"));
            continue;
        };
        let actual = fixes_for(ws, cfg, desc)
            .into_iter()
            .map(|edit| match edit {
                Edit::ReplaceBody { method, .. } | Edit::AddMethod { method, .. } => method.body,
            })
            .collect::<Vec<_>>();
        if &actual != expected {
            mismatches.push(format!("{ty}:\n      expected {expected:?}\n      actual   {actual:?}"));
        }
    }
    mismatches
}
