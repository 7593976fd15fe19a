use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Instant;

use log::{error, info};

use huffman_codec::CodecOptions;
use huffman_codec::file::{
    COMPRESSED_EXTENSION, RESTORED_EXTENSION, compress_file, decompress_file, with_suffix,
};

fn prompt(stdin: &mut impl BufRead, message: &str) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    stdin.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn run() -> huffman_codec::Result<()> {
    let mut stdin = io::stdin().lock();
    let mode = prompt(&mut stdin, "Press c to compress or u to uncompress: ")?;

    match mode.as_str() {
        "c" => {
            let fname = prompt(&mut stdin, "File to compress: ")?;
            let input = Path::new(&fname);
            let output = with_suffix(input, COMPRESSED_EXTENSION);
            let start = Instant::now();
            let report = compress_file(input, &output, &CodecOptions::default())?;
            println!("Bits per symbol: {}", report.bits_per_symbol);
            println!(
                "compressed {} in {} seconds.",
                fname,
                start.elapsed().as_secs_f64()
            );
        }
        "u" => {
            let fname = prompt(&mut stdin, "File to uncompress: ")?;
            let input = Path::new(&fname);
            let output = with_suffix(input, RESTORED_EXTENSION);
            let start = Instant::now();
            decompress_file(input, &output)?;
            println!(
                "uncompressed {} in {} seconds.",
                fname,
                start.elapsed().as_secs_f64()
            );
        }
        other => info!("Unknown mode {:?}, nothing to do", other),
    }
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
