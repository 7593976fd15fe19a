use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{error, info};

use huffman_codec::file::{RESTORED_EXTENSION, decompress_file, with_suffix};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        error!("Usage: {} <input_file> [output_file]", args[0]);
        eprintln!("  📂 <input_file>:  path to the encoded file.");
        eprintln!("  💾 [output_file]: defaults to <input_file>.orig.");
        std::process::exit(1);
    }

    let input_filepath = Path::new(&args[1]);
    let output_filepath = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| with_suffix(input_filepath, RESTORED_EXTENSION));

    info!("--- Start Decoding ---");
    let start = Instant::now();

    let restored = match decompress_file(input_filepath, &output_filepath) {
        Ok(n) => n,
        Err(e) => {
            error!("Failed to decode {}: {}", input_filepath.display(), e);
            std::process::exit(1);
        }
    };

    let input_size = fs::metadata(input_filepath).map(|m| m.len()).unwrap_or(0);
    let ratio = if restored > 0 {
        100.0 * (1.0 - (input_size as f64) / (restored as f64))
    } else {
        0.0
    };

    println!(
        "\r\n✅ decoding successful.\n\
         📂 input file:        {} ({} bytes)\n\
         💾 output file:       {} ({} bytes)\n\
         🗜️ compression ratio: {:.2}% (relative to decoded output)\n\
         ⏱️ elapsed:           {:.2?}",
        input_filepath.display(),
        input_size,
        output_filepath.display(),
        restored,
        ratio,
        start.elapsed()
    );

    info!("--- End ---");
}
