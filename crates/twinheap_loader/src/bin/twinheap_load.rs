//! # TWINHEAP Object Loader
//!
//! Loads a batch of objects from a directory into one frame heap and
//! reports how much of the pool they use.
//!
//! ## Usage
//!
//! ```bash
//! twinheap_load --dir assets --heap upper CopCar RobberCar
//! twinheap_load --config frames.toml --dir assets Level1.pak
//! ```

use std::path::PathBuf;
use std::process;

use twinheap_core::{FrameAllocator, FrameConfig, FrameStats, HeapSide};
use twinheap_loader::{DirectorySource, LoadResult, ObjectLoader};

struct Options {
    config: Option<PathBuf>,
    capacity: Option<usize>,
    alignment: Option<usize>,
    dir: PathBuf,
    heap: HeapSide,
    objects: Vec<String>,
}

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         TWINHEAP OBJECT LOADER                                   ║");
    println!("║         TWO HEAPS, ONE POOL                                      ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let Some(options) = parse_args() else {
        return;
    };

    if let Err(err) = run(&options) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn parse_args() -> Option<Options> {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options {
        config: None,
        capacity: None,
        alignment: None,
        dir: PathBuf::from("."),
        heap: HeapSide::Lower,
        objects: Vec::new(),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    options.config = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--dir" | "-d" => {
                if i + 1 < args.len() {
                    options.dir = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--heap" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse() {
                        Ok(heap) => options.heap = heap,
                        Err(err) => exit_with(&err),
                    }
                    i += 1;
                }
            }
            "--capacity" => {
                if i + 1 < args.len() {
                    match parse_bytes("--capacity", &args[i + 1]) {
                        Ok(bytes) => options.capacity = Some(bytes),
                        Err(err) => exit_with(&err),
                    }
                    i += 1;
                }
            }
            "--alignment" => {
                if i + 1 < args.len() {
                    match parse_bytes("--alignment", &args[i + 1]) {
                        Ok(bytes) => options.alignment = Some(bytes),
                        Err(err) => exit_with(&err),
                    }
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Usage: twinheap_load [OPTIONS] <OBJECT>...");
                println!();
                println!("Options:");
                println!("  -c, --config <FILE>        Pool configuration (TOML)");
                println!("  -d, --dir <DIR>            Directory holding the objects (default: .)");
                println!("      --heap <lower|upper>   Heap to load into (default: lower)");
                println!("      --capacity <BYTES>     Pool size, overrides the config");
                println!("      --alignment <BYTES>    Alignment, overrides the config");
                println!("  -h, --help                 Show this help");
                return None;
            }
            name => options.objects.push(name.to_owned()),
        }
        i += 1;
    }

    Some(options)
}

fn run(options: &Options) -> LoadResult<()> {
    let mut config = match &options.config {
        Some(path) => FrameConfig::load(path)?,
        None => FrameConfig::default(),
    };
    if let Some(capacity) = options.capacity {
        config.capacity_bytes = capacity;
    }
    if let Some(alignment) = options.alignment {
        config.alignment = alignment;
    }

    let mut frames = FrameAllocator::from_config(&config)?;
    let loader = ObjectLoader::new(DirectorySource::new(&options.dir));

    println!("┌─ CONFIGURATION ─────────────────────────────────────────────────┐");
    println!("│ Pool:               {} bytes", frames.capacity());
    println!("│ Alignment:          {} bytes", frames.alignment());
    println!("│ Directory:          {}", options.dir.display());
    println!("│ Heap:               {}", options.heap);
    println!("└─────────────────────────────────────────────────────────────────┘");
    println!();

    let loaded = loader.load_batch(&mut frames, options.heap, &options.objects)?;
    for object in &loaded {
        println!(
            "  {:<24} {:>10} bytes @ {:#010x}",
            object.name,
            object.block.len(),
            object.block.offset()
        );
    }
    println!();
    print_stats(&frames.stats());

    frames.shutdown();
    Ok(())
}

fn print_stats(stats: &FrameStats) {
    println!("┌─ USAGE ─────────────────────────────────────────────────────────┐");
    println!("│ Lower heap:         {} bytes", stats.lower_used);
    println!("│ Upper heap:         {} bytes", stats.upper_used);
    println!("│ Free:               {} bytes", stats.free);
    println!("│ Peak:               {} bytes", stats.peak_used);
    println!("└─────────────────────────────────────────────────────────────────┘");
}

fn parse_bytes(flag: &str, value: &str) -> Result<usize, String> {
    value
        .parse()
        .map_err(|err| format!("{flag} expects a byte count, got '{value}': {err}"))
}

fn exit_with(err: &dyn std::fmt::Display) -> ! {
    eprintln!("error: {err}");
    process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bytes() {
        assert_eq!(parse_bytes("--capacity", "4096"), Ok(4096));

        let err = parse_bytes("--alignment", "abc").unwrap_err();
        assert!(err.starts_with("--alignment"));
        assert!(err.contains("'abc'"));
        assert!(parse_bytes("--capacity", "-1").is_err());
    }
}
