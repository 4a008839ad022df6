use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use cw_branch::Branch;
use cw_sdk::{Findings, KnowledgeBase};
use cw_store::{Config, SparqlStore};
use serde_json::json;
use tracing::debug;

use crate::cli::*;

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path),
        None => Config::from_env(),
    };
    config.context("loading configuration")
}

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(&cli)?;
    debug!(endpoint = %config.endpoint(), "configuration loaded");
    let kb = KnowledgeBase::connect(&config)?;
    let gateway = kb.store().gateway();

    match cli.command {
        Command::Start => {
            gateway.start()?;
            println!("{} Store up at {}", "✓".green().bold(), gateway.endpoint().bold());
        }
        Command::Stop => {
            gateway.stop()?;
            println!("{} Store stopped", "✓".green().bold());
        }
        Command::Status => {
            if gateway.alive() {
                println!("Store at {} is {}", gateway.endpoint().bold(), "up".green());
            } else {
                println!("Store at {} is {}", gateway.endpoint().bold(), "down".red());
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Clean => {
            gateway.clean()?;
            println!("{} Store data wiped", "✓".green().bold());
        }
        Command::Branch(args) => cmd_branch(&kb, args, &cli.format)?,
        Command::Rebase(args) => {
            kb.branches().rebase(&args.branch)?;
            println!("{} Rebased {}", "✓".green(), args.branch.yellow());
        }
        Command::Save(args) => {
            for saved in kb.branches().save(&args.branch)? {
                let marker = if saved.contributed { "changed".green() } else { "unchanged".dimmed() };
                println!("{} ({marker})", saved.file_name().bold());
                print!("{}", saved.content);
            }
        }
        Command::Merge(args) => {
            if kb.merge(&args.branch, &args.ticket)? {
                println!("{} Merged {} ({})", "✓".green().bold(), args.branch.yellow(), args.ticket);
            } else {
                println!("{} Nothing merged from {}", "✗".red().bold(), args.branch.yellow());
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Validate(args) => {
            let branch = resolve(&kb, args.branch.as_deref())?;
            let findings = kb.validate(branch.as_ref())?;
            print_findings(&findings, &cli.format)?;
            if findings.values().any(|rows| !rows.is_empty()) {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Mappings(args) => {
            let branch = resolve(&kb, args.branch.as_deref())?;
            let mappings =
                kb.retrieve_mappings(&args.source_type, &args.target_type, branch.as_ref())?;
            match cli.format {
                OutputFormat::Json => {
                    let list: Vec<_> = mappings
                        .iter()
                        .map(|m| {
                            json!({
                                "uri": m.uri().map(|u| u.data()),
                                "source": m.source().uri().map(|u| u.data()),
                                "target": m.target().uri().map(|u| u.data()),
                                "invertible": m.invertible(),
                            })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&list)?);
                }
                OutputFormat::Text => {
                    for m in &mappings {
                        let uri = m.uri().map(|u| u.data()).unwrap_or("?");
                        let source = m.source().uri().map(|u| u.data()).unwrap_or("?");
                        let target = m.target().uri().map(|u| u.data()).unwrap_or("?");
                        let arrow = if m.invertible() { "<->" } else { "->" };
                        println!("{}  {source} {arrow} {target}", uri.yellow());
                    }
                    println!("{} current mappings", mappings.len().to_string().bold());
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn resolve(kb: &KnowledgeBase<SparqlStore>, id: Option<&str>) -> anyhow::Result<Option<Branch>> {
    id.map(|id| kb.branches().get(id))
        .transpose()
        .context("resolving branch")
}

fn cmd_branch(
    kb: &KnowledgeBase<SparqlStore>,
    args: BranchArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    match args.action {
        BranchAction::Create { owner } => {
            let branch = kb.branches().create(&owner)?;
            println!("Created branch {} for {}", branch.id.yellow().bold(), owner.bold());
        }
        BranchAction::List => {
            let branches = kb.branches().list()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&branches)?),
                OutputFormat::Text => {
                    if branches.is_empty() {
                        println!("No branches.");
                    }
                    for b in &branches {
                        println!("{}  {}  {}", b.id.yellow(), b.owner.bold(), b.created.to_rfc3339().dimmed());
                    }
                }
            }
        }
        BranchAction::Delete { branch, owner } => {
            kb.branches().delete(&branch, &owner)?;
            println!("Deleted branch {}", branch.yellow());
        }
    }
    Ok(())
}

fn print_findings(findings: &Findings, format: &OutputFormat) -> anyhow::Result<()> {
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(findings)?);
        return Ok(());
    }
    for (label, rows) in findings {
        if rows.is_empty() {
            println!("{} {}", "✓".green(), label);
            continue;
        }
        println!("{} {} ({})", "✗".red().bold(), label.bold(), rows.len());
        for row in rows {
            let cells: Vec<String> = row.iter().map(|(k, v)| format!("{k}={v}")).collect();
            println!("    {}", cells.join("  "));
        }
    }
    Ok(())
}
