//! td CLI - Tools for python development.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tooldev::classify::{classify, Category};
use tooldev::config::Config;
use tooldev::errors::{exit_code, TooldevError};
use tooldev::interpreter::Interpreter;
use tooldev::namespace::{normalize, NamespaceLike};
use tooldev::resolver::{module_of_directory, module_of_working_directory, search_root, ResolveError};
use tooldev::shell::SHELL_CONFIG;
use tooldev::summary::{build_report, write_report, write_report_json, Section, SummaryOptions};
use tooldev::table::terminal_width;
use tooldev::theme::{ColorMode, Theme};

#[derive(Parser)]
#[command(name = "td")]
#[command(about = "CLI tools for python development")]
#[command(version)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Config file (defaults to $TOOLDEV_CONFIG or the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// When to use color
    #[arg(long, global = true, value_enum)]
    color: Option<ColorArg>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize the namespace of a python module
    Lsp {
        /// Module to import (defaults to the module of the working directory)
        target: Option<String>,

        /// Show internal and external modules
        #[arg(short = 'm', long)]
        modules: bool,

        /// Show functions
        #[arg(short = 'f', long)]
        functions: bool,

        /// Show classes
        #[arg(short = 'c', long)]
        classes: bool,

        /// Show exceptions
        #[arg(short = 'e', long)]
        exceptions: bool,

        /// Show dunder names
        #[arg(short = 'd', long)]
        dunder: bool,

        /// Show other objects
        #[arg(short = 'o', long)]
        other: bool,

        /// Do not shorten module paths
        #[arg(short = 'v', long)]
        verbose: bool,

        /// Table width (defaults to the terminal width)
        #[arg(long, value_parser = parse_width)]
        width: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Python interpreter to import with
        #[arg(long)]
        python: Option<String>,
    },

    /// Print the dotted module path of the working directory
    Pwp,

    /// Print shell functions and aliases to add to a shell profile
    Shell,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorArg {
    Auto,
    Always,
    Never,
}

impl From<ColorArg> for ColorMode {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => ColorMode::Auto,
            ColorArg::Always => ColorMode::Always,
            ColorArg::Never => ColorMode::Never,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        return;
    };
    let json_output = matches!(command, Commands::Lsp { json: true, .. });

    let result = match command {
        Commands::Lsp {
            target,
            modules,
            functions,
            classes,
            exceptions,
            dunder,
            other,
            verbose,
            width,
            json,
            python,
        } => {
            let flags = SectionFlags {
                modules,
                functions,
                classes,
                exceptions,
                dunder,
                other,
            };
            run_lsp(LspArgs {
                config: cli.config.as_deref(),
                color: cli.color.map(ColorMode::from),
                target,
                sections: flags.sections(),
                verbose,
                width,
                json,
                python,
            })
        }
        Commands::Pwp => run_pwp(),
        Commands::Shell => {
            print!("{SHELL_CONFIG}");
            Ok(())
        }
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "td", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        if json_output {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
            }

            let payload = ErrorOutput {
                error: e.to_string(),
            };

            let json = serde_json::to_string(&payload)
                .unwrap_or_else(|_| "{\"error\":\"serialization failed\"}".to_string());
            eprintln!("{json}");
        } else {
            eprintln!("error: {}", e);
        }
        std::process::exit(exit_code(&e));
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// --- lsp command ---

fn parse_width(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("width must be positive".to_string()),
        Ok(width) => Ok(width),
        Err(e) => Err(e.to_string()),
    }
}

struct SectionFlags {
    modules: bool,
    functions: bool,
    classes: bool,
    exceptions: bool,
    dunder: bool,
    other: bool,
}

impl SectionFlags {
    /// Title plus the flagged categories, or everything when nothing is flagged.
    fn sections(&self) -> Option<Vec<Section>> {
        let selected: Vec<Category> = Category::ALL
            .into_iter()
            .filter(|category| match category {
                Category::InternalModules | Category::ExternalModules => self.modules,
                Category::Functions => self.functions,
                Category::Classes => self.classes,
                Category::Exceptions => self.exceptions,
                Category::Dunder => self.dunder,
                Category::Other => self.other,
            })
            .collect();
        if selected.is_empty() {
            return None;
        }
        Some(
            std::iter::once(Section::Title)
                .chain(selected.into_iter().map(Section::Category))
                .collect(),
        )
    }
}

struct LspArgs<'a> {
    config: Option<&'a Path>,
    color: Option<ColorMode>,
    target: Option<String>,
    sections: Option<Vec<Section>>,
    verbose: bool,
    width: Option<usize>,
    json: bool,
    python: Option<String>,
}

fn run_lsp(args: LspArgs<'_>) -> Result<(), TooldevError> {
    let config = Config::discover(args.config)?;

    let (target, root) = match args.target {
        Some(target) => (target, None),
        None => {
            let cwd = std::env::current_dir().map_err(ResolveError::WorkingDirectory)?;
            let module = module_of_directory(&cwd)?;
            let root = search_root(&cwd, &module);
            (module, root)
        }
    };
    let program = args.python.unwrap_or_else(|| config.interpreter());
    let mut interpreter = Interpreter::locate(&program)?;
    if let Some(root) = root {
        interpreter = interpreter.with_search_path(root);
    }
    let snapshot = interpreter.snapshot(&target)?;

    let namespace = normalize(NamespaceLike::Source(&snapshot))?;
    let classification = classify(&namespace);
    debug!(module = %target, total = classification.total(), "classified namespace");

    let options = SummaryOptions {
        sections: args.sections,
        verbose: args.verbose,
        module_path_width: config.display.module_path_width,
        max_width: args.width.or(config.display.max_width),
    };
    let report = build_report(&classification, &options);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        write_report_json(&mut out, &report)?;
    } else {
        let color = args.color.unwrap_or(config.display.color);
        let theme = if color.enabled() {
            config.theme.to_theme().unwrap_or_default()
        } else {
            Theme::plain()
        };
        let max_width = options.max_width.unwrap_or_else(terminal_width);
        write_report(&mut out, &report, max_width, &theme)?;
    }
    out.flush()?;
    Ok(())
}

// --- pwp command ---

fn run_pwp() -> Result<(), TooldevError> {
    let module = module_of_working_directory()?;
    println!("{module}");
    Ok(())
}
