//! Proficiency Ledger - interactive shell
//!
//! Builds a character one command at a time so grants, optional picks and
//! refunds can be exercised by hand. Names containing spaces are quoted:
//! `grant skills "Sleight of Hand" Class`.

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

use proficiency_ledger::core::error::Result;
use proficiency_ledger::{Character, LedgerConfig, LedgerError, Origin, ProficiencyType};

/// Interactive proficiency ledger
#[derive(Parser, Debug)]
#[command(name = "proficiency-ledger")]
#[command(about = "Grant, retract and allocate character proficiencies interactively")]
struct Args {
    /// Ledger configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Character JSON to start from instead of a fresh character
    #[arg(long)]
    load: Option<PathBuf>,

    /// Name for a fresh character
    #[arg(long, default_value = "Adventurer")]
    name: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("proficiency_ledger=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => LedgerConfig::load_from_toml(path)?,
        None => LedgerConfig::default(),
    };

    let mut character = match &args.load {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            Character::from_json(&json, config)?
        }
        None => Character::with_config(args.name.clone(), config),
    };

    tracing::info!(character = %character.id, name = %character.name, "Proficiency ledger ready");
    character.drain_events();
    print_help();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        let read = io::stdin().read_line(&mut input)?;
        if read == 0 {
            break;
        }

        let tokens = tokenize(input.trim());
        if tokens.is_empty() {
            continue;
        }
        if tokens[0] == "quit" || tokens[0] == "q" {
            break;
        }

        if let Err(err) = run_command(&mut character, &tokens) {
            println!("Error: {}", err);
        }
    }

    println!("\nGoodbye, {}.", character.name);
    Ok(())
}

fn run_command(character: &mut Character, tokens: &[String]) -> Result<()> {
    let args = &tokens[1..];
    match tokens[0].as_str() {
        "grant" => {
            let [ty, name, source] = expect_args::<3>(args, "grant <type> <name> <source>")?;
            let ty: ProficiencyType = ty.parse()?;
            let newly = character.add_grant(ty, name, source);
            println!("{}", if newly { "Granted (new)" } else { "Granted" });
        }
        "retract" => {
            let [source] = expect_args::<1>(args, "retract <source>")?;
            let removed = character.remove_grants_by_source(source);
            if removed.is_empty() {
                println!("Nothing granted by {}", source);
            }
            for (ty, names) in removed {
                println!("  {}: {}", ty, names.join(", "));
            }
        }
        "revoke" => {
            let [ty, name, source] = expect_args::<3>(args, "revoke <type> <name> <source>")?;
            let ty: ProficiencyType = ty.parse()?;
            let retracted = character.retract_grant(ty, name, source);
            println!("{}", if retracted { "Revoked" } else { "Not granted by that source" });
        }
        "has" => {
            let [ty, name] = expect_args::<2>(args, "has <type> <name>")?;
            println!("{}", character.has_grant(ty.parse()?, name));
        }
        "sources" => {
            let [ty, name] = expect_args::<2>(args, "sources <type> <name>")?;
            let sources = character.grant_sources(ty.parse()?, name);
            let sources: Vec<&str> = sources.iter().map(String::as_str).collect();
            println!("{{{}}}", sources.join(", "));
        }
        "alloc" => {
            if args.len() < 3 {
                return Err(usage("alloc <type> <origin> <count> [option...]"));
            }
            let ty: ProficiencyType = args[0].parse()?;
            let origin: Origin = args[1].parse()?;
            let count: u32 = args[2]
                .parse()
                .map_err(|_| LedgerError::Validation(format!("invalid count '{}'", args[2])))?;
            character.set_allocation(ty, origin, count, &args[3..])?;
            println!("{} {} slots: {}", origin, ty, count);
        }
        "clear" => {
            let [ty, origin] = expect_args::<2>(args, "clear <type> <origin>")?;
            let cleared = character.clear_allocation(ty.parse()?, origin.parse()?)?;
            println!("{}", if cleared { "Cleared" } else { "Not configured" });
        }
        "select" => {
            let [ty, origin, name] = expect_args::<3>(args, "select <type> <origin> <name>")?;
            let (ty, origin): (ProficiencyType, Origin) = (ty.parse()?, origin.parse()?);
            match character.try_select_optional(ty, origin, name) {
                Ok(()) => println!("Selected"),
                Err(err) if err.is_business_rejection() => println!("Refused: {}", err),
                Err(err) => return Err(err),
            }
        }
        "deselect" => {
            let [ty, origin, name] = expect_args::<3>(args, "deselect <type> <origin> <name>")?;
            let deselected = character.deselect_optional(ty.parse()?, origin.parse()?, name)?;
            println!("{}", if deselected { "Deselected" } else { "Not selected" });
        }
        "available" => {
            let [ty, origin] = expect_args::<2>(args, "available <type> <origin>")?;
            let options = character.available_options(ty.parse()?, origin.parse()?);
            println!("{}", options.join(", "));
        }
        "show" => display_status(character),
        "dump" => println!("{}", character.to_json()?),
        "events" => {
            for event in character.drain_events() {
                println!("  #{} {:?}", event.id, event.kind);
            }
        }
        "help" | "h" => print_help(),
        other => println!("Unknown command '{}'. Type 'help' for a list.", other),
    }
    Ok(())
}

fn expect_args<'a, const N: usize>(args: &'a [String], usage_line: &str) -> Result<[&'a str; N]> {
    if args.len() != N {
        return Err(usage(usage_line));
    }
    let mut out = [""; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg.as_str();
    }
    Ok(out)
}

fn usage(line: &str) -> LedgerError {
    LedgerError::Validation(format!("usage: {}", line))
}

/// Split on whitespace, keeping double-quoted runs together
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                if quoted {
                    tokens.push(std::mem::take(&mut current));
                }
                quoted = !quoted;
            }
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn print_help() {
    println!();
    println!("=== PROFICIENCY LEDGER ===");
    println!("Types: armor, weapons, tools, skills, languages, savingThrows");
    println!("Origins: race, class, background");
    println!();
    println!("  grant <type> <name> <source>        - Grant a proficiency");
    println!("  retract <source>                    - Remove everything a source granted");
    println!("  revoke <type> <name> <source>       - Remove one source from one proficiency");
    println!("  has <type> <name>                   - Check a proficiency");
    println!("  sources <type> <name>               - List granting sources");
    println!("  alloc <type> <origin> <n> [opts...] - Configure optional slots");
    println!("  clear <type> <origin>               - Reset optional slots");
    println!("  select <type> <origin> <name>       - Spend an optional slot");
    println!("  deselect <type> <origin> <name>     - Return an optional slot");
    println!("  available <type> <origin>           - Options still worth picking");
    println!("  show / dump / events / quit         - Status, JSON, changes since last 'events'");
    println!();
}

fn display_status(character: &Character) {
    println!();
    println!("--- {} ({}) ---", character.name, character.id);
    for ty in ProficiencyType::ALL {
        let listed = character.proficiencies(ty);
        let aggregate = character.aggregate(ty);
        if listed.is_empty() && aggregate.allowed == 0 {
            continue;
        }
        println!("  {}: {}", ty, listed.join(", "));
        if aggregate.allowed > 0 {
            println!(
                "    optional {}/{} picked: {}",
                aggregate.selected.len(),
                aggregate.allowed,
                aggregate.selected.join(", ")
            );
        }
    }
    println!();
}
