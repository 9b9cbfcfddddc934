/*
MIT License

Copyright (c) 2021 Philipp Schuster

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/
use pax_untar::TarArchive;

/// Lists the entries of an uncompressed Tar archive and extracts the first
/// one whose name contains the given pattern.
///
/// `cargo run --example extract_file -- dictionary.tar system.dic system.dic.out`
fn main() {
    // log: not mandatory
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(archive_path), Some(needle)) = (args.next(), args.next()) else {
        eprintln!("usage: extract_file <archive.tar> <name pattern> [output file]");
        std::process::exit(2);
    };
    let output = args.next();

    let bytes = std::fs::read(&archive_path).expect("archive should be readable");
    let archive = TarArchive::new(&bytes);

    for entry in archive.entries() {
        match entry {
            Ok(entry) => println!(
                "{:>10} {:>1} {}",
                entry.size().unwrap_or_default(),
                entry.typeflag().map(|flag| flag.to_string()).unwrap_or_default(),
                entry.name().unwrap_or("<no name>")
            ),
            Err(e) => {
                eprintln!("archive is corrupt: {e}");
                std::process::exit(1);
            }
        }
    }

    match archive.find_file(&needle) {
        Ok(Some(entry)) => {
            println!(
                "found {:?} with {} bytes",
                entry.name(),
                entry.data().len()
            );
            if let Some(output) = output {
                std::fs::write(&output, entry.into_buffer()).expect("output should be writable");
                println!("written to {output}");
            }
        }
        Ok(None) => {
            eprintln!("no entry matches '{needle}'");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("archive is corrupt: {e}");
            std::process::exit(1);
        }
    }
}
