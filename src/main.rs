use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use is_terminal::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use treecmp::areas::session::Session;
use treecmp::artifacts::compare::CompareFlags;
use treecmp::artifacts::errors::ErrorPolicy;
use treecmp::commands::align::AlignOptions;
use treecmp::commands::compare::{CompareOptions, ForcedRoot};

#[derive(Parser)]
#[command(
    name = "treecmp",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "Compare and align two directory trees",
    long_about = "Compares two file trees entry by entry, choosing the cheapest way to prove \
    that two files have the same content. Trees wrapped in a different number of \
    directories are aligned automatically before they are compared.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(short, long, global = true, action = ArgAction::Count, help = "Log more (-v info, -vv debug)")]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "compare",
        about = "Compare two trees",
        long_about = "This command compares two directories (or files) and prints one line per \
        differing entry, followed by a summary."
    )]
    Compare {
        #[arg(index = 1, help = "The old tree")]
        old: PathBuf,
        #[arg(index = 2, help = "The new tree")]
        new: PathBuf,
        #[arg(short, long, help = "Match names regardless of case")]
        ignore_case: bool,
        #[arg(short, long, help = "Compare content as text, ignoring line endings")]
        text: bool,
        #[arg(long, help = "Do not align the trees before comparing them")]
        no_align: bool,
        #[arg(long = "force", value_name = "SIDE=PATH", help = "Compare from this sub-tree (old=a/b or new=c)")]
        forced: Vec<ForcedRoot>,
        #[arg(short, long, value_name = "REGEX", help = "Skip entries whose name matches")]
        exclude: Vec<String>,
        #[arg(short, long, help = "List identical entries too")]
        all: bool,
        #[arg(short, long, help = "Report unreadable entries as different instead of failing")]
        keep_going: bool,
    },
    #[command(
        name = "align",
        about = "Show how two trees would be aligned",
        long_about = "This command prints the depth offset that best lines up the two trees, \
        their match factor and the sub-trees automatic alignment would compare."
    )]
    Align {
        #[arg(index = 1, help = "The old tree")]
        old: PathBuf,
        #[arg(index = 2, help = "The new tree")]
        new: PathBuf,
        #[arg(short, long, value_name = "REGEX", help = "Skip entries whose name matches")]
        exclude: Vec<String>,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Compare {
            old,
            new,
            ignore_case,
            text,
            no_align,
            forced,
            exclude,
            all,
            keep_going,
        } => {
            let mut flags = CompareFlags::AUTO_ALIGN;
            flags.set(CompareFlags::IGNORE_CASE, ignore_case);
            flags.set(CompareFlags::TEXT, text);
            flags.set(CompareFlags::AUTO_ALIGN, !no_align);
            let policy = if keep_going {
                ErrorPolicy::Ignore
            } else {
                ErrorPolicy::Abort
            };

            let mut session = Session::new(flags, policy, Box::new(std::io::stdout()));
            let options = CompareOptions {
                old,
                new,
                exclude,
                forced,
                show_all: all,
            };
            session.compare(&options)?;
        }
        Commands::Align { old, new, exclude } => {
            let mut session = Session::new(
                CompareFlags::AUTO_ALIGN,
                ErrorPolicy::Abort,
                Box::new(std::io::stdout()),
            );
            let mut options = AlignOptions::new(old, new);
            options.exclude = exclude;
            session.align(&options)?;
        }
    }

    Ok(())
}
