use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use regctx_core::abi::CallingConvention;
use regctx_core::config::AccessorConfig;
use regctx_core::guard::ConflictFlags;
use regctx_core::layout::{LayoutRegistry, RegisterLayout};
use regctx_core::platform::SimulatedKernel;
use regctx_core::types::{register_for_role, Architecture, RegisterRole};
use regctx_core::{RegctxError, ThreadContext};
use regctx_utils::{debug, init_logging_with, LogFormat, LogLevel, LoggingConfig};

/// Inspect cross-architecture thread-state layouts.
#[derive(Parser, Debug)]
#[command(name = "regctx")]
#[command(version)]
#[command(about = "Inspect cross-architecture thread-state layouts and conflict negotiation", long_about = None)]
struct Cli
{
    #[command(flatten)]
    logging: LoggingArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct LoggingArgs
{
    /// Log level (error, warn, info, debug, trace). Defaults to RUST_LOG, then info
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,
    /// Log format (pretty or json). Defaults to REGCTX_LOG_FORMAT, then pretty
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
    /// Also write logs to this file (or a dated file in this directory)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Show the general-register layout of one architecture
    Layout
    {
        /// Architecture (x86_64, arm64, ...)
        arch: Architecture,
    },
    /// Show every supported layout
    Layouts,
    /// Show which thread-state symbols the host declares
    Guard,
    /// Show calling-convention register roles of one architecture
    Abi
    {
        /// Architecture (x86_64, arm64, ...)
        arch: Architecture,
    },
    /// Show the architecture of this binary
    Host,
    /// Encode register values into a thread-state blob on a simulated thread
    Encode
    {
        /// Architecture (x86_64, arm64, ...)
        arch: Architecture,
        /// Register assignments, e.g. `--set pc=0x100003f00 --set x0=1`
        #[arg(long = "set", value_name = "NAME=VALUE")]
        assignments: Vec<String>,
    },
}

fn main()
{
    let cli = Cli::parse();

    let logging = match logging_config(&cli.logging) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };
    let _guard = match init_logging_with(&logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn logging_config(args: &LoggingArgs) -> Result<LoggingConfig, regctx_utils::LoggingError>
{
    let mut config = LoggingConfig::from_env()?;
    if let Some(level) = args.log_level {
        config = config.with_level(level);
    }
    if let Some(format) = args.log_format {
        config = config.with_format(format);
    }
    if let Some(file) = &args.log_file {
        config = config.with_file(file);
    }
    Ok(config)
}

fn run_command(command: Commands) -> Result<(), Box<dyn std::error::Error>>
{
    match command {
        Commands::Layout { arch } => {
            let registry = LayoutRegistry::global()?;
            print_layout(registry.layout_for(arch)?);
        }
        Commands::Layouts => {
            let registry = LayoutRegistry::global()?;
            for (idx, layout) in registry.iter().enumerate() {
                if idx > 0 {
                    println!();
                }
                print_layout(layout);
            }
        }
        Commands::Guard => {
            print!("{}", ConflictFlags::host());
        }
        Commands::Abi { arch } => print_abi(arch),
        Commands::Host => {
            println!("{}", Architecture::host()?);
        }
        Commands::Encode { arch, assignments } => encode(arch, &assignments)?,
    }

    Ok(())
}

fn print_layout(layout: &RegisterLayout)
{
    let provenance = layout.provenance();

    println!("{} general-register thread state", layout.architecture());
    println!("  type:       {} ({})", layout.type_name(), provenance.structure);
    println!("  flavor:     {} ({})", layout.flavor(), provenance.flavor);
    println!("  word count: {} ({})", layout.word_count(), provenance.word_count);
    println!("  size:       {} bytes", layout.size());
    println!();
    println!("  {:<8} {:>6} {:>6}", "register", "offset", "width");
    for field in layout.fields() {
        println!("  {:<8} {:>6} {:>6}", field.name, field.offset, field.width);
    }
}

fn print_abi(arch: Architecture)
{
    let convention = CallingConvention::for_architecture(arch);
    let role = |role| register_for_role(arch, role).unwrap_or("-");

    println!("{arch}: {convention}");
    println!("  program counter: {}", role(RegisterRole::ProgramCounter));
    println!("  stack pointer:   {}", role(RegisterRole::StackPointer));
    println!("  frame pointer:   {}", role(RegisterRole::FramePointer));
    println!("  link register:   {}", convention.link_register().unwrap_or("-"));
    println!("  status:          {}", role(RegisterRole::Status));
    println!("  return value:    {}", convention.return_register());
    println!("  arguments:       {}", convention.argument_registers().join(" "));
}

fn encode(arch: Architecture, assignments: &[String]) -> Result<(), Box<dyn std::error::Error>>
{
    let kernel = SimulatedKernel::new();
    let thread = kernel.spawn(arch);
    let context = ThreadContext::new(&kernel)?.with_config(AccessorConfig::from_env()?);

    let snapshot = context.modify(thread, arch, |regs| {
        for assignment in assignments {
            let (name, value) = parse_assignment(assignment)?;
            regs.set(name, value)?;
        }
        Ok(())
    })?;
    debug!(thread = %thread, assignments = assignments.len(), "encoded simulated thread state");

    print!("{snapshot}");
    println!();

    let words = kernel.raw_state(thread, arch).unwrap_or_default();
    for (row, chunk) in words.chunks(4).enumerate() {
        let rendered: Vec<String> = chunk.iter().map(|word| format!("{word:08x}")).collect();
        println!("  [{:>2}] {}", row * 4, rendered.join(" "));
    }

    Ok(())
}

/// Split `name=value`, with the value in decimal or `0x` hex.
fn parse_assignment(assignment: &str) -> Result<(&str, u64), RegctxError>
{
    let invalid = || RegctxError::InvalidConfig(format!("expected NAME=VALUE, got '{assignment}'"));

    let (name, value) = assignment.split_once('=').ok_or_else(invalid)?;
    let value = value.trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => value.replace('_', "").parse(),
    };

    parsed.map(|value| (name.trim(), value)).map_err(|_| invalid())
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_assignment()
    {
        assert_eq!(parse_assignment("pc=0x1_0000_3f00").unwrap(), ("pc", 0x1_0000_3f00));
        assert_eq!(parse_assignment(" x0 = 42").unwrap(), ("x0", 42));
        assert!(parse_assignment("x0").is_err());
        assert!(parse_assignment("x0=0xzz").is_err());
    }

    #[test]
    fn test_cli_parses()
    {
        let cli = Cli::try_parse_from(["regctx", "--log-level", "debug", "layout", "aarch64"]).unwrap();
        assert_eq!(cli.logging.log_level, Some(LogLevel::Debug));
        assert!(matches!(cli.command, Commands::Layout { arch: Architecture::Arm64 }));

        assert!(Cli::try_parse_from(["regctx", "layout", "sparc"]).is_err());
    }

    #[test]
    fn test_encode_rejects_unknown_register()
    {
        let err = encode(Architecture::X86_64, &["x0=1".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Unknown x86_64 register"));
    }
}
