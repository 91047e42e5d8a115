use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;

use analysis_config_core::{
    create_category_id, find_unregistered_processes, get_root_processes_from_campaign,
    get_shifts_from_sources, verify_config_processes, Analysis, AnalysisFile, CategoryKey, Config,
    ProcessIndex, ProcessKey, Result, ANALYSIS_FILE,
};

mod args;
use args::{Cli, Commands, Shell};

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let file = resolve_file(cli.file);

    let result = match cli.command {
        Some(Commands::Init) => handle_init(&file),
        Some(Commands::Categories { flat }) => handle_categories(&file, flat),
        Some(Commands::Id {
            name,
            hash_len,
            salt,
        }) => handle_id(&file, &name, hash_len, salt.as_deref()),
        Some(Commands::Processes) => handle_processes(&file),
        Some(Commands::Verify { warn }) => handle_verify(&file, warn),
        Some(Commands::Shifts { sources }) => handle_shifts(&file, &sources),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "anacfg", &mut io::stdout());
}

fn resolve_file(cli_file: Option<PathBuf>) -> PathBuf {
    cli_file.unwrap_or_else(|| PathBuf::from(ANALYSIS_FILE))
}

fn load_analysis(file: &Path) -> Result<Analysis> {
    tracing::info!(path = %file.display(), "loading analysis file");
    AnalysisFile::load(file)?.build()
}

fn handle_init(file: &Path) -> Result<()> {
    let existed = file.exists();
    let path = AnalysisFile::init(file)?;
    if existed {
        println!("{} {}", "Exists:".yellow(), path.display());
    } else {
        println!("{} {}", "Initialized:".green(), path.display());
    }
    Ok(())
}

fn handle_categories(file: &Path, flat: bool) -> Result<()> {
    let analysis = load_analysis(file)?;
    let config = &analysis.config;

    println!();
    println!(
        "{} {} (id {})",
        "Config:".bold(),
        config.name.cyan(),
        config.id
    );
    println!();

    if flat {
        for (_, category) in config.categories() {
            println!(
                "  {:<24} {:>12}  {}",
                category.name,
                category.id,
                category.selection.to_string().dimmed()
            );
        }
    } else {
        for &root in config.root_categories() {
            print_category_tree(config, root, 0);
        }
    }

    println!();
    println!(
        "{} {} categories, {} created by combination",
        "Total:".bold(),
        config.category_count(),
        analysis.created_categories
    );
    Ok(())
}

fn print_category_tree(config: &Config, key: CategoryKey, depth: usize) {
    let category = config.category(key);
    let indent = "  ".repeat(depth + 1);
    println!(
        "{}{} {}",
        indent,
        category.name.cyan(),
        format!("({})", category.id).dimmed()
    );
    for &child in category.children() {
        print_category_tree(config, child, depth + 1);
    }
}

fn handle_id(file: &Path, name: &str, hash_len: usize, salt: Option<&str>) -> Result<()> {
    let analysis = load_analysis(file)?;
    let id = create_category_id(&analysis.config, name, hash_len, salt)?;
    println!("{}", id);
    Ok(())
}

fn handle_processes(file: &Path) -> Result<()> {
    let analysis = load_analysis(file)?;
    let index = get_root_processes_from_campaign(&analysis.campaign)?;

    println!();
    println!("{} {}", "Campaign:".bold(), analysis.campaign.name.cyan());
    println!();
    for root in index.roots() {
        print_process_tree(&index, root);
    }
    println!();
    Ok(())
}

fn print_process_tree(index: &ProcessIndex, root: ProcessKey) {
    for (key, depth) in index.walk(root, true) {
        let process = index.process(key);
        let indent = "  ".repeat(depth + 1);
        println!(
            "{}{} {}",
            indent,
            process.name.cyan(),
            format!("({})", process.id).dimmed()
        );
    }
}

fn handle_verify(file: &Path, warn: bool) -> Result<()> {
    let analysis = load_analysis(file)?;
    verify_config_processes(&analysis.config, warn)?;
    if find_unregistered_processes(&analysis.config).is_empty() {
        println!(
            "{} processes of config '{}'",
            "Verified:".green(),
            analysis.config.name
        );
    }
    Ok(())
}

fn handle_shifts(file: &Path, sources: &[String]) -> Result<()> {
    let analysis = load_analysis(file)?;
    let shifts = get_shifts_from_sources(&analysis.config, sources)?;

    println!();
    for shift in shifts {
        println!(
            "  {} {}",
            shift.name.cyan(),
            format!("({})", shift.id).dimmed()
        );
        for (target, source) in &shift.column_aliases {
            println!("    {} -> {}", target, source);
        }
    }
    println!();
    Ok(())
}
