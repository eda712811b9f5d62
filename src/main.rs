use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use skate_score::codec::{self, storage};
use skate_score::model::{Discipline, Program};
use skate_score::output;
use skate_score::rules::{self, RuleTables};
use skate_score::scoring;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_CONFIG: i32 = 4;
const EXIT_VIOLATIONS: i32 = 5;
const EXIT_INPUT: i32 = 6;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty program for a class and discipline
    New {
        /// Competition class id (see `classes`)
        #[arg(long, default_value = skate_score::model::DEFAULT_CLASS)]
        class: String,
        /// SP (short program) or FS (free skating)
        #[arg(long, default_value = "SP")]
        discipline: Discipline,
        /// Write the program to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Score every element of a program and report violations
    #[command(group(ArgGroup::new("source").required(true).args(["file", "data"])))]
    Score {
        /// Program JSON file
        file: Option<PathBuf>,
        /// Shared program link, `?data=...` query or bare transport string
        #[arg(long)]
        data: Option<String>,
        /// Print the score sheet and validation as JSON
        #[arg(long, conflicts_with = "tsv")]
        json: bool,
        /// Print one tab-separated line per element
        #[arg(long)]
        tsv: bool,
    },
    /// Check a program against its class and discipline limits
    Validate {
        /// Program JSON file
        file: PathBuf,
    },
    /// Print the shareable `?data=` query for a program file
    Encode {
        /// Program JSON file
        file: PathBuf,
    },
    /// Turn a shared link back into program JSON
    Decode {
        /// `?data=...` query, full link, or bare transport string
        input: String,
        /// Write the program to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List competition classes with their element limits
    Classes,
    /// List jump combination templates with base values
    Templates,
}

#[derive(Parser, Debug)]
#[command(name = "skate-score")]
#[command(about = "Figure skating element scoring CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to rules file (defaults to ~/.config/skate-score/rules.yaml)
    #[arg(short, long, global = true)]
    rules: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("skate_score=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Load rule tables
    let rules_path = cli.rules.map(PathBuf::from);
    let rules = match rules::load_rules(rules_path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Rules error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate rule tables at startup
    if let Err(errors) = rules::validate_rules(&rules) {
        eprintln!("Rule table errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let use_colors = output::should_use_colors();

    let code = match cli.command {
        Commands::New {
            class,
            discipline,
            output,
        } => run_new(&rules, &class, discipline, output.as_deref()),
        Commands::Score {
            file,
            data,
            json,
            tsv,
        } => run_score(&rules, file.as_deref(), data.as_deref(), json, tsv, use_colors),
        Commands::Validate { file } => run_validate(&rules, &file, use_colors),
        Commands::Encode { file } => run_encode(&file),
        Commands::Decode { input, output } => run_decode(&input, output.as_deref()),
        Commands::Classes => {
            println!("{}", output::format_classes(&rules, use_colors));
            EXIT_SUCCESS
        }
        Commands::Templates => {
            println!("{}", output::format_templates(&rules, use_colors));
            EXIT_SUCCESS
        }
    };

    std::process::exit(code);
}

fn run_new(
    rules: &RuleTables,
    class_id: &str,
    discipline: Discipline,
    output: Option<&Path>,
) -> i32 {
    if rules.discipline_config(class_id, discipline).is_none() {
        eprintln!(
            "Unknown class or discipline: '{}' {}. Run `skate-score classes` to list them.",
            class_id,
            discipline.id()
        );
        return EXIT_INPUT;
    }

    let program = Program::new_empty(rules, class_id, discipline);
    match write_program(&program, output) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Failed to write program: {:#}", e);
            EXIT_INPUT
        }
    }
}

fn run_score(
    rules: &RuleTables,
    file: Option<&Path>,
    data: Option<&str>,
    json: bool,
    tsv: bool,
    use_colors: bool,
) -> i32 {
    let program = match read_program(file, data) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Rejected program: {:#}", e);
            return EXIT_INPUT;
        }
    };

    let sheet = scoring::score_program(&program, rules);
    let validation = scoring::validate_program(&program, rules);
    debug!(
        elements = sheet.slots.len(),
        total = sheet.total_score,
        valid = validation.valid,
        "Scored program"
    );

    if json {
        let report = serde_json::json!({
            "classId": program.class_id,
            "discipline": program.discipline,
            "sheet": sheet,
            "validation": validation,
        });
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Failed to serialize score sheet: {}", e);
                return EXIT_INPUT;
            }
        }
        return EXIT_SUCCESS;
    }

    if tsv {
        let lines = output::format_sheet_tsv(&sheet);
        if !lines.is_empty() {
            println!("{}", lines);
        }
        return EXIT_SUCCESS;
    }

    println!("{} {}", program.class_id, program.discipline.label());
    println!("{}", output::format_score_sheet(&sheet, use_colors));
    let violations = output::format_violations(&validation.errors, use_colors);
    if !violations.is_empty() {
        eprintln!();
        eprintln!("{}", violations);
    }

    EXIT_SUCCESS
}

fn run_validate(rules: &RuleTables, file: &Path, use_colors: bool) -> i32 {
    let program = match storage::import_program(file) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Rejected program: {:#}", e);
            return EXIT_INPUT;
        }
    };

    let validation = scoring::validate_program(&program, rules);
    if validation.valid {
        println!("Program is valid.");
        EXIT_SUCCESS
    } else {
        println!("{}", output::format_violations(&validation.errors, use_colors));
        EXIT_VIOLATIONS
    }
}

fn run_encode(file: &Path) -> i32 {
    let query = storage::import_program(file)
        .and_then(|program| Ok(codec::to_query(&program)?));
    match query {
        Ok(q) => {
            println!("{}", q);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Rejected program: {:#}", e);
            EXIT_INPUT
        }
    }
}

fn run_decode(input: &str, output: Option<&Path>) -> i32 {
    let program = match codec::from_query(input) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Rejected shared program: {:#}", anyhow::Error::from(e));
            return EXIT_INPUT;
        }
    };

    match write_program(&program, output) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Failed to write program: {:#}", e);
            EXIT_INPUT
        }
    }
}

fn read_program(file: Option<&Path>, data: Option<&str>) -> Result<Program> {
    match (file, data) {
        (Some(path), _) => storage::import_program(path),
        (None, Some(data)) => Ok(codec::from_query(data)?),
        (None, None) => anyhow::bail!("no program file or --data given"),
    }
}

/// Pretty JSON to stdout, or an atomic write when a path is given
fn write_program(program: &Program, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            storage::export_program(path, program)?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{}", codec::to_pretty_json(program)?),
    }
    Ok(())
}
