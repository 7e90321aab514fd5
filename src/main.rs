use minilang::compile::{compile_source, Options};
use minilang::error::SourceMetadata;
use minilang::report;
use structopt::StructOpt;

use tracing_subscriber::fmt;

fn main() {
    if let Err(ref e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), anyhow::Error> {
    use std::fs;

    let opt = Opt::from_args();

    if let Some((_, filter)) = std::env::vars().find(|x| x.0 == "MINILANG_TRACE") {
        let subscriber = fmt::Subscriber::builder()
            .with_ansi(true)
            .pretty()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        tracing_log::LogTracer::init()?;
    }

    let filename = opt.file;
    let file = fs::read_to_string(&filename)?;
    log::debug!("read {} bytes from {}", file.len(), filename.display());

    let meta = SourceMetadata::new(&file).with_file(filename);
    let options = Options {
        eager_label_check: opt.check_labels,
    };
    let mut compilation = compile_source(&meta, &options);
    let error = compilation.error.take();

    if opt.quiet {
        if error.is_none() {
            println!("{}", report::bindings(&compilation.bindings()));
        }
    } else {
        println!("{}", report::render(&compilation));
    }

    match error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

#[derive(Debug, StructOpt)]
#[structopt(name = "minilang", about = "Compiles and runs a MiniLang program")]
struct Opt {
    /// The file to run
    #[structopt(parse(from_os_str))]
    file: std::path::PathBuf,
    /// Check that every jump has a matching label before running
    #[structopt(long = "check-labels")]
    check_labels: bool,
    /// Only print the final variables
    #[structopt(short = "q", long = "quiet")]
    quiet: bool,
}
