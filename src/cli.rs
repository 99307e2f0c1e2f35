// Command-line interface for oxips.
//
// Subcommands mirror the engine surface: `create` diffs two files into
// an IPS patch, `apply` replays one or more patches onto a ROM, and
// `parse` prints the record list of a patch as JSON.

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::io::{self, IoError};
use crate::ips::Chunk;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// IPS patch encoder/decoder.
#[derive(Parser, Debug)]
#[command(
    name = "oxips",
    version,
    about = "IPS patch encoder/decoder",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Apply IPS patches to a file.
    Apply(ApplyArgs),
    /// Create an IPS patch from an original and a modified file.
    Create(CreateArgs),
    /// Print the record list of an IPS patch as JSON.
    Parse(ParseArgs),
}

#[derive(Args, Debug)]
struct ApplyArgs {
    /// File to patch.
    input: PathBuf,

    /// Patched output file.
    output: PathBuf,

    /// Patch files, applied in order.
    #[arg(required = true)]
    patches: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct CreateArgs {
    /// Original (unpatched) file.
    original: PathBuf,

    /// Modified file the patch should reproduce.
    modified: PathBuf,

    /// Patch output file.
    output: PathBuf,
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// IPS patch file.
    input: PathBuf,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn refuse_overwrite(path: &Path, force: bool) -> bool {
    if path.exists() && !force {
        eprintln!(
            "oxips: output file exists, use -f to overwrite: {}",
            path.display()
        );
        return true;
    }
    false
}

fn report(err: &IoError, context: &str) -> i32 {
    eprintln!("oxips: {context}: {err}");
    1
}

fn cmd_apply(cli: &Cli, args: &ApplyArgs) -> i32 {
    if refuse_overwrite(&args.output, cli.force) {
        return 1;
    }

    let patches: Vec<&Path> = args.patches.iter().map(PathBuf::as_path).collect();
    let stats = match io::apply_files(&args.input, &args.output, &patches) {
        Ok(stats) => stats,
        Err(e) => return report(&e, "apply"),
    };

    if !cli.quiet {
        eprintln!(
            "oxips: applied {} patch(es): {} -> {} bytes",
            stats.patches, stats.input_size, stats.output_size
        );
        if cli.verbose > 0
            && let Some(digest) = stats.output_sha256
        {
            eprintln!("oxips: output sha256: {}", hex(&digest));
        }
    }
    0
}

fn cmd_create(cli: &Cli, args: &CreateArgs) -> i32 {
    if refuse_overwrite(&args.output, cli.force) {
        return 1;
    }

    let stats = match io::create_file(&args.original, &args.modified, &args.output) {
        Ok(stats) => stats,
        Err(e) => return report(&e, "create"),
    };

    if !cli.quiet {
        eprintln!(
            "oxips: created {}: {} record(s), {} bytes",
            args.output.display(),
            stats.chunks,
            stats.patch_size
        );
        if let Some(truncate) = stats.truncate {
            eprintln!("oxips: patch truncates output to {truncate} bytes");
        }
    }
    0
}

fn cmd_parse(args: &ParseArgs) -> i32 {
    let chunks = match io::parse_file(&args.input) {
        Ok(chunks) => chunks,
        Err(e) => return report(&e, "parse"),
    };

    let records: Vec<serde_json::Value> = chunks.iter().map(chunk_json).collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&records).expect("chunk list serializes")
    );
    0
}

/// One record as JSON, offsets in hex like the rest of the IPS tooling.
fn chunk_json(chunk: &Chunk) -> serde_json::Value {
    serde_json::json!({
        "start": format!("{:x}", chunk.start),
        "end": format!("{:x}", chunk.end),
        "rle": chunk.run.map(|v| format!("{v:x}")),
    })
}

fn hex(digest: &[u8]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();

    let exit_code = match &cli.command {
        Cmd::Apply(args) => cmd_apply(&cli, args),
        Cmd::Create(args) => cmd_create(&cli, args),
        Cmd::Parse(args) => cmd_parse(args),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_cli(args: &[&str]) -> Cli {
        let argv: Vec<String> = std::iter::once("oxips".to_string())
            .chain(args.iter().map(|s| s.to_string()))
            .collect();
        Cli::try_parse_from(argv).expect("cli parse failed")
    }

    #[test]
    fn apply_requires_at_least_one_patch() {
        let argv = ["oxips", "apply", "in.bin", "out.bin"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn apply_collects_patches_in_order() {
        let cli = parse_cli(&["apply", "in.bin", "out.bin", "a.ips", "b.ips"]);
        let Cmd::Apply(args) = &cli.command else {
            panic!("expected apply");
        };
        assert_eq!(args.patches, [PathBuf::from("a.ips"), PathBuf::from("b.ips")]);
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = parse_cli(&["create", "orig.bin", "mod.bin", "out.ips", "-f", "-v", "-v"]);
        assert!(cli.force);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn chunk_json_uses_hex_offsets() {
        let value = chunk_json(&Chunk::run(0x10, 0x1F, 0xAB));
        assert_eq!(value["start"], "10");
        assert_eq!(value["end"], "1f");
        assert_eq!(value["rle"], "ab");

        let value = chunk_json(&Chunk::copy(3, 5));
        assert_eq!(value["rle"], serde_json::Value::Null);
    }
}
