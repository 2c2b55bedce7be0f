use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

const DEFAULT_INPUT_FILE: &str = "./input/urls.txt";
const DEFAULT_OUTPUT_FILE: &str = "./output/md5.txt";

/// Download every URL listed in a file and write the MD5 of each body,
/// one per line, in the same order as the input.
///
/// A URL that cannot be fetched leaves an empty line in its place.
#[derive(Clone, Debug, Parser)]
#[command(name = "digestline", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct App {
    /// File to read URLs from, one per line
    #[arg(long = "input-file", alias = "inputFile", default_value = DEFAULT_INPUT_FILE)]
    pub input_file: PathBuf,

    /// File to write digests to; created or truncated
    #[arg(long = "output-file", alias = "outputFile", default_value = DEFAULT_OUTPUT_FILE)]
    pub output_file: PathBuf,

    /// Number of concurrent workers (must be >= 1)
    #[arg(long = "num-workers", alias = "numWorkers", default_value = "2")]
    pub num_workers: NonZeroUsize,
}
