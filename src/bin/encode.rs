use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{error, info};

use huffman_codec::CodecOptions;
use huffman_codec::file::{COMPRESSED_EXTENSION, compress_file, with_suffix};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        error!("Usage: {} <input_file> [output_file] [--improve]", args[0]);
        eprintln!("  📂 <input_file>:  path to the file to encode.");
        eprintln!("  💾 [output_file]: defaults to <input_file>.huf.");
        std::process::exit(1);
    }

    let input_filepath = Path::new(&args[1]);
    let mut output_filepath: Option<PathBuf> = None;
    let mut options = CodecOptions::default();

    for arg in &args[2..] {
        if arg == "--improve" {
            options.improve_tree = true;
        } else {
            output_filepath = Some(PathBuf::from(arg));
        }
    }
    let output_filepath =
        output_filepath.unwrap_or_else(|| with_suffix(input_filepath, COMPRESSED_EXTENSION));

    info!("--- Start Encoding ---");
    info!("Tree improvement: {}", options.improve_tree);
    let start = Instant::now();

    let report = match compress_file(input_filepath, &output_filepath, &options) {
        Ok(report) => report,
        Err(e) => {
            error!("Failed to encode {}: {}", input_filepath.display(), e);
            std::process::exit(1);
        }
    };

    let output_size = fs::metadata(&output_filepath).map(|m| m.len()).unwrap_or(0);

    println!(
        "\r\n✅ Encoding successful.\n\
         📂  Input:       {} ({} bytes)\n\
         💾  Output:      {} ({} bytes)\n\
         🌳  Symbols:     {} ({} tree records)\n\
         📏  Bits/symbol: {:.4}\n\
         ℹ️  Entropy:     {:.4} bits/symbol\n\
         🗜️  Ratio:       {:.4}%\n\
         ⏱️  Elapsed:     {:.2?}",
        input_filepath.display(),
        report.input_len,
        output_filepath.display(),
        output_size,
        report.unique_symbols,
        report.node_count,
        report.bits_per_symbol,
        report.entropy,
        report.ratio(),
        start.elapsed()
    );

    info!("--- End ---");
}
