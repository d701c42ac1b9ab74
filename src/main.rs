use clap::{CommandFactory, Parser};
use img_delta::{batch, config, output};
use std::path::PathBuf;
use std::process::ExitCode;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Called once at startup, so the leak is bounded.
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "img-delta")]
#[command(about = "Generate and apply per-pixel diff images")]
#[command(long_about = "\
Generate and apply per-pixel diff images

Works on three flat directories of identically named PNG files. Generate
mode compares each original with its edited counterpart and writes a diff
image holding only the changed pixels. Apply mode rebuilds the edited image
from the original and its diff.

  img-delta --generate --input originals/ --compare edited/ --output diffs/
  img-delta --apply    --input originals/ --compare diffs/  --output rebuilt/

Diffs keep the original's color model. Unchanged pixels are palette entry 0
for indexed images and transparent black (0,0,0,0) for RGBA images, so an
edit *to* that exact color cannot be represented and is restored to the
original on apply.

Files without a counterpart in --compare are skipped. A file that fails to
read, diff or write is reported and the run continues. The output directory
must already exist.")]
#[command(version = version_string())]
struct Cli {
    /// Directory of original images
    #[arg(long, value_name = "DIR")]
    input: Option<PathBuf>,

    /// Existing directory results are written to
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Edited images (with --generate) or diff images (with --apply)
    #[arg(long, value_name = "DIR")]
    compare: Option<PathBuf>,

    /// Generate diffs from originals and edits
    #[arg(long)]
    generate: bool,

    /// Apply diffs to originals
    #[arg(long)]
    apply: bool,
}

impl From<Cli> for config::Options {
    fn from(cli: Cli) -> Self {
        Self {
            input: cli.input,
            output: cli.output,
            compare: cli.compare,
            generate: cli.generate,
            apply: cli.apply,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let invocation = match config::Options::from(cli).validate() {
        Ok(invocation) => invocation,
        Err(e) => {
            println!("{e}");
            println!("{}", Cli::command().render_usage());
            return ExitCode::from(2);
        }
    };

    match batch::run(&invocation, |event| output::print_batch_event(&event)) {
        Ok(stats) => {
            output::print_summary(invocation.mode, &stats);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
