use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter};

use uclca_rs::error::Result;
use uclca_rs::input::write_text;
use uclca_rs::types::{ConsensusOptions, LoadMode, LookupPolicy};
use uclca_rs::{build_otu_table, consensus_taxonomy};

#[derive(Parser, Debug)]
#[command(name = "uclca-rs", version, about = "Consensus taxonomy and OTU tables from .uc cluster files")]
struct Args {
    #[command(subcommand)]
    command: SubArgs,

    #[arg(
        short = 't',
        long = "threads",
        value_name = "THREADS",
        default_value_t = 0,
        global = true,
        help = "Worker threads for the consensus step (0 = all cores)"
    )]
    threads: usize,

    #[arg(short = 'v', long = "verbose", global = true, help = "Log every record-level decision")]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum SubArgs {
    /// Lowest common ancestor lineage of every cluster
    #[command(name = "lca")]
    Lca {
        #[arg(long = "uc", value_name = "PATH", help = "vsearch/usearch .uc file")]
        uc: PathBuf,

        #[arg(
            long = "tax",
            value_name = "PATH",
            help = "Taxonomy file: <id>\\t<k__...|p__...|...|s__...>"
        )]
        tax: PathBuf,

        #[arg(short = 'o', value_name = "PATH", help = "Output: <cluster>\\t<lineage>")]
        outfile: PathBuf,

        #[arg(long = "strict", help = "Fail on .uc ids missing from the taxonomy instead of skipping them")]
        strict: bool,

        #[arg(
            long = "strict-taxonomy",
            help = "Fail on malformed or duplicated taxonomy lines instead of skipping them"
        )]
        strict_taxonomy: bool,
    },
    /// OTU x sample count table
    #[command(name = "otutable")]
    OtuTable {
        #[arg(short = 'i', value_name = "PATH", help = "vsearch/usearch .uc file")]
        infile: PathBuf,

        #[arg(short = 'l', value_name = "PATH", help = "Sample ids, one per line, in column order")]
        sampleids: PathBuf,

        #[arg(short = 'o', value_name = "PATH", help = "Output OTU table")]
        outfile: PathBuf,
    },
}

fn spinner(color: &str, msg: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let template = format!("{{spinner:.{color}}} {{msg}}");
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template(&template)
    {
        spinner.set_style(style);
    }
    spinner.set_message(msg.to_string());
    spinner
}

/// Reports a fatal error on stderr whatever the log filter says, then exits 1.
fn fatal(e: &dyn std::error::Error) -> ! {
    eprintln!("Error: {}", e);
    process::exit(1);
}

fn run_lca(
    uc: PathBuf,
    tax: PathBuf,
    outfile: PathBuf,
    options: ConsensusOptions,
) -> Result<()> {
    let progress = spinner("green", "Computing consensus taxonomy...");
    let results = consensus_taxonomy(&uc, &tax, options)?;
    progress.finish_with_message(format!("{} clusters resolved.", results.rows.len()));

    let progress = spinner("yellow", "Writing consensus lineages...");
    write_text(&outfile, &results.get_consensus_output()?)?;
    progress.finish_with_message(format!("Wrote {}", outfile.display()));
    Ok(())
}

fn run_otu_table(infile: PathBuf, sampleids: PathBuf, outfile: PathBuf) -> Result<()> {
    let progress = spinner("green", "Counting OTU members per sample...");
    let results = build_otu_table(&infile, &sampleids)?;
    progress.finish_with_message(format!(
        "{} OTUs x {} samples.",
        results.table.len(),
        results.samples.len()
    ));

    let progress = spinner("yellow", "Writing OTU table...");
    write_text(&outfile, &results.get_otu_table_output())?;
    progress.finish_with_message(format!("Wrote {}", outfile.display()));
    Ok(())
}

fn main() {
    let start = Instant::now();
    let args = Args::parse();

    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()
    {
        fatal(&e);
    }

    let outcome = match args.command {
        SubArgs::Lca {
            uc,
            tax,
            outfile,
            strict,
            strict_taxonomy,
        } => {
            let options = ConsensusOptions {
                lookup: if strict { LookupPolicy::Fail } else { LookupPolicy::Skip },
                taxonomy: if strict_taxonomy { LoadMode::Strict } else { LoadMode::Lenient },
            };
            info!(
                "Missing ids: {}, taxonomy parsing: {}",
                options.lookup, options.taxonomy
            );
            run_lca(uc, tax, outfile, options)
        }
        SubArgs::OtuTable {
            infile,
            sampleids,
            outfile,
        } => run_otu_table(infile, sampleids, outfile),
    };

    if let Err(e) = outcome {
        fatal(&e);
    }

    info!("Elapsed time: {:.3?}", start.elapsed());
}
