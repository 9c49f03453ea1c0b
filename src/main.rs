use std::{fs, path::PathBuf, process};

use clap::Parser;

use wright::run;

/// The Wright programming language (BlackRose).
#[derive(Parser, Debug)]
#[command(name = "wright", version, about, long_about = None)]
struct Args {
    /// Run BlackRose interactively.
    #[arg(short = 'i', long, conflicts_with = "interpret")]
    interactive: bool,

    /// Interpret and run via the tree-walk interpreter (the default).
    #[arg(short = 'I', long)]
    interpret: bool,

    /// BlackRose file to use.
    file: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    if args.interactive {
        process::exit(run::interactive());
    }

    // Tree-walking is the only strategy, so -I and the default coincide.
    let _ = args.interpret;

    let Some(file) = args.file else {
        eprintln!("wright: file is required for the interpreter");
        process::exit(2);
    };

    let source = match fs::read_to_string(&file) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("wright: {}: {}", file.display(), err);
            process::exit(2);
        }
    };

    // Diagnostics use the absolute path when it resolves.
    let path = file
        .canonicalize()
        .unwrap_or_else(|_| file.clone())
        .display()
        .to_string();

    process::exit(run::interpret(&source, &path));
}
