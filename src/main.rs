//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{bail, Context};
use log::{info, warn, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use bzstream::tools::cli::{bzopts_init, BzOpts, Mode, Output};
use bzstream::{BzDecoder, BzEncoder};

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> anyhow::Result<()> {
    // Available log levels are Error, Warn, Info, Debug, Trace. The command line narrows this down.
    // Logs go to stderr so they never mix with data sent to stdout.
    TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let options = bzopts_init();

    // With no files we are a filter from stdin to stdout
    if options.files.is_empty() {
        return run_stdio(&options);
    }

    let mut failed = 0;
    for file in &options.files {
        if let Err(e) = run_file(&options, file) {
            eprintln!("bzstream: {}: {:#}", file, e);
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{} of {} files failed", failed, options.files.len());
    }
    info!("Done.\n");
    Ok(())
}

/// Compress everything from input into output.
fn zip<R: Read, W: Write>(mut input: R, output: W, opts: &BzOpts) -> anyhow::Result<W> {
    let mut encoder = BzEncoder::new(output, opts.block_size)?.with_work_factor(opts.work_factor)?;
    let bytes_in = io::copy(&mut input, &mut encoder)?;
    let randomised = encoder.blocks_randomised();
    let output = encoder.finish()?;
    info!("Compressed {} bytes.", bytes_in);
    if randomised > 0 {
        info!("{} blocks were randomised.", randomised);
    }
    Ok(output)
}

/// Decompress everything from input into output.
fn unzip<R: Read, W: Write>(input: R, mut output: W) -> anyhow::Result<W> {
    let mut decoder = BzDecoder::new(input);
    let bytes_out = io::copy(&mut decoder, &mut output)?;
    info!(
        "Decompressed {} bytes, stream crc {:#010x}.",
        bytes_out,
        decoder.combined_crc()
    );
    Ok(output)
}

fn run_stdio(opts: &BzOpts) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let input = BufReader::new(stdin.lock());
    match opts.op_mode {
        Mode::Zip => zip(input, BufWriter::new(stdout.lock()), opts)?
            .flush()
            .context("Unable to write to stdout")?,
        Mode::Unzip => unzip(input, BufWriter::new(stdout.lock()))?
            .flush()
            .context("Unable to write to stdout")?,
        Mode::Test => {
            unzip(input, io::sink()).context("(stdin)")?;
        }
    }
    Ok(())
}

/// Name of the output file for a given input file.
fn output_name(name: &str, mode: Mode) -> String {
    match mode {
        Mode::Zip => format!("{}.bz2", name),
        _ => match name.strip_suffix(".bz2").or_else(|| name.strip_suffix(".bz")) {
            Some(stem) if !stem.is_empty() => stem.to_string(),
            _ => format!("{}.out", name),
        },
    }
}

fn run_file(opts: &BzOpts, name: &str) -> anyhow::Result<()> {
    let path = Path::new(name);
    if !path.is_file() {
        bail!("not a regular file");
    }
    let input = BufReader::new(
        File::open(path).with_context(|| format!("Unable to open path {}", path.display()))?,
    );

    if opts.op_mode == Mode::Test {
        unzip(input, io::sink())?;
        info!("{}: ok", name);
        return Ok(());
    }

    if opts.output == Output::Stdout {
        let stdout = io::stdout();
        let out = BufWriter::new(stdout.lock());
        let mut out = match opts.op_mode {
            Mode::Zip => zip(input, out, opts)?,
            _ => unzip(input, out)?,
        };
        out.flush().context("Unable to write to stdout")?;
        return Ok(());
    }

    let out_name = output_name(name, opts.op_mode);
    if Path::new(&out_name).exists() && !opts.force_overwrite {
        bail!("output file {} already exists", out_name);
    }
    let out = BufWriter::new(
        File::create(&out_name).with_context(|| format!("Unable to write to path {}", out_name))?,
    );
    let result = match opts.op_mode {
        Mode::Zip => zip(input, out, opts),
        _ => unzip(input, out),
    }
    .and_then(|mut out| {
        out.flush()
            .with_context(|| format!("Unable to write to path {}", out_name))
    });

    if let Err(e) = result {
        // Don't leave a partial output file behind
        if fs::remove_file(&out_name).is_err() {
            warn!("Could not remove partial output {}", out_name);
        }
        return Err(e);
    }

    if !opts.keep_input_files {
        fs::remove_file(path).with_context(|| format!("Unable to remove {}", name))?;
    }
    info!("{} -> {}", name, out_name);
    Ok(())
}
