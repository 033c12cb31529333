//! `blockforge` -- a thin `clap`-derived front-end over the library's
//! public API. Owns no cryptographic logic of its own: argument parsing,
//! file iteration and exit-code mapping only.
use std::{
    io::Write,
    path::PathBuf,
    process::ExitCode,
};

use blockforge::{digest_of_file, Blake2b, Blake2s, Csprg, Sha256, Sha512};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "blockforge", version, about = "Checksums and randomness over blockforge's own primitives")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute and print a checksum for one or more files
    Checksum {
        /// Which hash to use
        #[arg(value_enum)]
        hash: HashAlgo,
        /// Files to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Write cryptographically secure random bytes to stdout
    Rand {
        /// Number of bytes to write; omit to stream indefinitely
        #[arg(short = 'n', long)]
        n: Option<u64>,
    },
    /// Print library version, PRG name and enabled hash implementations
    Info,
}

#[derive(Clone, Copy, ValueEnum)]
enum HashAlgo {
    Sha256,
    Sha512,
    Blake2b,
    Blake2s,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Checksum { hash, files } => checksum(hash, &files),
        Command::Rand { n } => rand(n),
        Command::Info => {
            info();
            ExitCode::SUCCESS
        }
    }
}

/// `checksum <hash> <files...>`: one `<hex>  <path>` line per file.
/// Exits 1 if any file could not be hashed (missing, unreadable); the
/// successfully hashed files are still printed.
fn checksum(hash: HashAlgo, files: &[PathBuf]) -> ExitCode {
    let mut all_ok = true;
    for path in files {
        let result = match hash {
            HashAlgo::Sha256 => digest_of_file::<Sha256>(path).map(|d| d.to_string()),
            HashAlgo::Sha512 => digest_of_file::<Sha512>(path).map(|d| d.to_string()),
            HashAlgo::Blake2b => digest_of_file::<Blake2b>(path).map(|d| d.to_string()),
            HashAlgo::Blake2s => digest_of_file::<Blake2s>(path).map(|d| d.to_string()),
        };
        match result {
            Ok(hex) => println!("{hex}  {}", path.display()),
            Err(e) => {
                eprintln!("blockforge: {}: {e}", path.display());
                all_ok = false;
            }
        }
    }
    if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// `rand [-n N]`: writes raw bytes from a freshly-seeded CSPRG to stdout.
/// With no `-n`, streams until the reader goes away (a closed pipe ends
/// the loop cleanly rather than erroring).
fn rand(n: Option<u64>) -> ExitCode {
    let mut csprg = match Csprg::from_os_entropy() {
        Ok(csprg) => csprg,
        Err(e) => {
            eprintln!("blockforge: {e}");
            return ExitCode::FAILURE;
        }
    };

    const CHUNK: usize = 64 * 1024;
    let mut buf = vec![0u8; CHUNK];
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let mut remaining = n;
    loop {
        let take = match remaining {
            Some(0) => break,
            Some(r) => CHUNK.min(r as usize),
            None => CHUNK,
        };
        if let Err(e) = csprg.fill_random(&mut buf[..take]) {
            eprintln!("blockforge: {e}");
            return ExitCode::FAILURE;
        }
        if out.write_all(&buf[..take]).is_err() {
            break;
        }
        if let Some(r) = remaining.as_mut() {
            *r -= take as u64;
        }
    }
    ExitCode::SUCCESS
}

fn info() {
    println!("blockforge {}", env!("CARGO_PKG_VERSION"));
    println!("prg: ChaCha20 fast-key-erasure CSPRG (RFC 7539), OS-entropy seeded");
    println!("hashes: sha256, sha512, blake2b, blake2s");
    println!("mac: hmac (generic over any of the above, including sha1)");
    println!("sha1: legacy, kept for HMAC-SHA1 compatibility only, not exposed as a checksum target");
}
