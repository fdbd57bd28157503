use std::fmt::{Display, Formatter};

use clap::{ArgAction, Parser};
use log::{info, LevelFilter};

use crate::tools::tables::DEFAULT_WORK_FACTOR;

/// Verbosity of user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Errors,
    Warnings,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    pub fn level(&self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::Off,
            Verbosity::Errors => LevelFilter::Error,
            Verbosity::Warnings => LevelFilter::Warn,
            Verbosity::Info => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
            Verbosity::Trace => LevelFilter::Trace,
        }
    }
}

/// Zip, Unzip, Test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Zip,
    Unzip,
    Test,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Define the two output channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    File,
    Stdout,
}
impl Display for Output {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug)]
pub struct BzOpts {
    /// Maximum input block size (in 100k units) to process during each loop
    pub block_size: u32,
    /// Vec of names of files to read for input
    pub files: Vec<String>,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Don't remove input files after processing
    pub keep_input_files: bool,
    /// Compress/Decompress/Test
    pub op_mode: Mode,
    /// Location where output is sent
    pub output: Output,
    /// Verbosity of user information
    pub verbose: Verbosity,
    /// How hard to try sorting repetitive data before randomising it
    pub work_factor: u32,
}

impl BzOpts {
    pub fn new() -> Self {
        Self {
            block_size: 9,
            files: vec![],
            force_overwrite: false,
            keep_input_files: false,
            op_mode: Mode::Zip,
            output: Output::File,
            verbose: Verbosity::Errors,
            work_factor: DEFAULT_WORK_FACTOR,
        }
    }

    /// Put command line information from CLAP into our internal structure.
    pub fn from_args(args: Args) -> Self {
        let mut opts = BzOpts::new();

        if args.decompress {
            opts.op_mode = Mode::Unzip
        }
        // Test wins over decompress, compress wins over both
        if args.test {
            opts.op_mode = Mode::Test
        }
        if args.compress {
            opts.op_mode = Mode::Zip
        }
        opts.force_overwrite = args.force;
        opts.keep_input_files = args.keep;
        if args.stdout {
            opts.output = Output::Stdout
        }
        if args.fast {
            opts.block_size = 1
        }
        if args.best {
            opts.block_size = 9
        }
        // NOTE: This overwrites the best and fast flags!
        if let Some(block_size) = args.block_size {
            opts.block_size = block_size
        }
        opts.work_factor = args.work_factor;
        opts.verbose = match (args.quiet, args.verbose) {
            (true, _) => Verbosity::Quiet,
            (_, 0) => Verbosity::Errors,
            (_, 1) => Verbosity::Warnings,
            (_, 2) => Verbosity::Info,
            (_, 3) => Verbosity::Debug,
            _ => Verbosity::Trace,
        };
        opts.files = args.files;
        opts
    }
}

impl Default for BzOpts {
    fn default() -> Self {
        Self::new()
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "bzip2, a block-sorting file compressor.",
    long_about = "
    Compresses and decompresses files in the bzip2 format. With no file names, bzstream
    compresses or decompresses from standard input to standard output. Block sizes of
    100k to 900k can be chosen with -1 .. -9."
)]
pub struct Args {
    /// Files to process
    #[clap()]
    pub files: Vec<String>,

    /// Force compression
    #[clap(short = 'z', long = "compress")]
    pub compress: bool,

    /// Force decompression
    #[clap(short = 'd', long = "decompress")]
    pub decompress: bool,

    /// Test compressed file integrity
    #[clap(short = 't', long = "test")]
    pub test: bool,

    /// Overwrite existing output files
    #[clap(short = 'f', long = "force")]
    pub force: bool,

    /// Keep (don't delete) input files
    #[clap(short = 'k', long = "keep")]
    pub keep: bool,

    /// Output to standard out
    #[clap(short = 'c', long = "stdout")]
    pub stdout: bool,

    /// Suppress noncritical error messages
    #[clap(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Be verbose (a 2nd -v gives more)
    #[clap(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Alias for 100k block mode
    #[clap(long = "fast")]
    pub fast: bool,

    /// Alias for 900k block mode
    #[clap(long = "best")]
    pub best: bool,

    /// 1..9 - Set the block size from 100-900k. 900k is the default
    #[clap(short = 'b', long = "block-size", value_parser = clap::value_parser!(u32).range(1..=9))]
    pub block_size: Option<u32>,

    /// How hard to sort repetitive data before falling back to randomising it (1-250)
    #[clap(long = "work-factor", default_value_t = DEFAULT_WORK_FACTOR,
        value_parser = clap::value_parser!(u32).range(1..=250))]
    pub work_factor: u32,

    /// Display software version & license
    #[clap(short = 'L', long = "license")]
    pub license: bool,
}

/// Rewrite the bzip2 style -1 .. -9 flags (alone or combined, as in -v9k) into --block-size.
fn expand_level_flags<I: IntoIterator<Item = String>>(args: I) -> Vec<String> {
    let mut out = vec![];
    for arg in args {
        if arg.len() > 1 && arg.starts_with('-') && !arg.starts_with("--") {
            let mut rest = String::from("-");
            for c in arg[1..].chars() {
                if c.is_ascii_digit() && c != '0' {
                    out.push(format!("--block-size={}", c));
                } else {
                    rest.push(c);
                }
            }
            if rest.len() > 1 {
                out.push(rest);
            }
        } else {
            out.push(arg);
        }
    }
    out
}

/// Parse the command line and set the log level from it.
pub fn bzopts_init() -> BzOpts {
    let args = Args::parse_from(expand_level_flags(std::env::args()));
    if args.license {
        println!("{}", license());
    }
    let opts = BzOpts::from_args(args);

    // Set the log level
    log::set_max_level(opts.verbose.level());

    // Below we report initialization status to the user
    info!("---- Bzip2 Initialization Start ----",);
    info!("Verbosity set to {}", log::max_level());
    info!("Operational mode set to {}", opts.op_mode);
    info!("Block size set to {}", opts.block_size);
    info!("Output to {}", opts.output);
    if opts.force_overwrite {
        info!("Forcing file overwriting")
    };
    if opts.keep_input_files {
        info!("Keeping input files")
    };
    info!("---- Bzip2 Initialization End ----\n");
    opts
}

/// Official license statement for Bzip2
fn license() -> &'static str {
    "
   bzip2, a block-sorting file compressor.
   Copyright (C) 1996-2010 by Julian Seward; 2010-2023 by various.

   This program is free software; you can redistribute it and/or modify
   it under the terms set out in the LICENSE file, which is included
   in the bzip2 source distribution.

   This program is distributed in the hope that it will be useful,
   but WITHOUT ANY WARRANTY; without even the implied warranty of
   MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
   LICENSE file for more details."
}

#[cfg(test)]
mod test {
    use super::{expand_level_flags, Args, BzOpts, Mode, Output, Verbosity};
    use clap::Parser;

    fn parse(line: &[&str]) -> BzOpts {
        let args = expand_level_flags(line.iter().map(|s| s.to_string()));
        BzOpts::from_args(Args::parse_from(args))
    }

    #[test]
    fn defaults_test() {
        let opts = parse(&["bzstream"]);
        assert_eq!(opts.op_mode, Mode::Zip);
        assert_eq!(opts.block_size, 9);
        assert_eq!(opts.work_factor, 50);
        assert_eq!(opts.output, Output::File);
        assert_eq!(opts.verbose, Verbosity::Errors);
        assert!(opts.files.is_empty());
    }

    #[test]
    fn combined_flags_test() {
        let opts = parse(&["bzstream", "-dk4", "-vv", "a.bz2", "b.bz2"]);
        assert_eq!(opts.op_mode, Mode::Unzip);
        assert!(opts.keep_input_files);
        assert_eq!(opts.block_size, 4);
        assert_eq!(opts.verbose, Verbosity::Info);
        assert_eq!(opts.files, vec!["a.bz2".to_string(), "b.bz2".to_string()]);
    }

    #[test]
    fn fast_and_stdout_test() {
        let opts = parse(&["bzstream", "--fast", "-c", "-t", "-q"]);
        assert_eq!(opts.block_size, 1);
        assert_eq!(opts.output, Output::Stdout);
        assert_eq!(opts.op_mode, Mode::Test);
        assert_eq!(opts.verbose, Verbosity::Quiet);
    }

    #[test]
    fn expand_test() {
        let args = expand_level_flags(["x", "-9", "-v1", "--best", "file"].map(String::from));
        assert_eq!(
            args,
            vec!["x", "--block-size=9", "--block-size=1", "-v", "--best", "file"]
        );
    }
}
