//! Replay an operation script against the index engines.
//!
//! Usage:
//!   index_cli <script> [--degree N] [--kind all|avl|btree|bplus|bstar] [--verbose] [--dump]
//!
//! Every selected engine receives the same operations in file order. A
//! summary line is printed per engine; `--verbose` also prints each
//! operation outcome and `--dump` prints the final tree as JSON.

use ordered_index::{
    load_script, Config, Engine, IndexKind, OrderedIndex, Operation, DEFAULT_MIN_DEGREE,
};
use std::env;
use std::process::exit;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct Options {
    script: String,
    degree: usize,
    kinds: Vec<IndexKind>,
    verbose: bool,
    dump: bool,
}

#[derive(Default)]
struct Tally {
    inserts: usize,
    search_hits: usize,
    search_misses: usize,
    delete_hits: usize,
    delete_misses: usize,
}

fn usage() -> ! {
    eprintln!("Usage: index_cli <script> [options]");
    eprintln!("Options:");
    eprintln!("  --degree <n>   - Minimum degree of the multiway trees (default {DEFAULT_MIN_DEGREE})");
    eprintln!("  --kind <kind>  - all, avl, btree, bplus or bstar (default all)");
    eprintln!("  --verbose      - Print every operation outcome");
    eprintln!("  --dump         - Print the final tree as JSON");
    exit(1);
}

fn parse_args() -> Options {
    let mut args = env::args().skip(1);
    let mut script = None;
    let mut degree = DEFAULT_MIN_DEGREE;
    let mut kinds = IndexKind::ALL.to_vec();
    let mut verbose = false;
    let mut dump = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--degree" => {
                degree = match args.next().map(|s| s.parse::<usize>()) {
                    Some(Ok(n)) => n,
                    _ => {
                        eprintln!("ERROR: Invalid degree");
                        exit(1);
                    }
                };
            }
            "--kind" => {
                let Some(value) = args.next() else { usage() };
                kinds = if value.eq_ignore_ascii_case("all") {
                    IndexKind::ALL.to_vec()
                } else {
                    match value.parse::<IndexKind>() {
                        Ok(kind) => vec![kind],
                        Err(e) => {
                            eprintln!("ERROR: {}", e);
                            exit(1);
                        }
                    }
                };
            }
            "--verbose" => verbose = true,
            "--dump" => dump = true,
            "-h" | "--help" => usage(),
            other if other.starts_with("--") => {
                eprintln!("Unknown option: {}", other);
                usage();
            }
            _ if script.is_none() => script = Some(arg.clone()),
            _ => usage(),
        }
    }

    let Some(script) = script else { usage() };
    Options {
        script,
        degree,
        kinds,
        verbose,
        dump,
    }
}

fn replay(engine: &mut Engine, ops: &[Operation], verbose: bool) -> Tally {
    let mut tally = Tally::default();
    for op in ops {
        match op {
            Operation::Insert { key, payload } => {
                engine.insert(*key, payload.clone());
                tally.inserts += 1;
                if verbose {
                    println!("  Insert {} -> {}", key, payload);
                }
            }
            Operation::Search { key } => {
                let found = engine.search(*key);
                match found {
                    Some(_) => tally.search_hits += 1,
                    None => tally.search_misses += 1,
                }
                if verbose {
                    match found {
                        Some(entry) => println!("  Search {} -> {}", key, entry.payload()),
                        None => println!("  Search {} -> NOT_FOUND", key),
                    }
                }
            }
            Operation::Delete { key } => {
                let removed = engine.delete(*key);
                match removed {
                    Some(_) => tally.delete_hits += 1,
                    None => tally.delete_misses += 1,
                }
                if verbose {
                    match removed {
                        Some(entry) => println!("  Delete {} -> {}", key, entry.payload()),
                        None => println!("  Delete {} -> NOT_FOUND", key),
                    }
                }
            }
        }
    }
    tally
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ordered_index=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = parse_args();

    let ops = match load_script(&options.script) {
        Ok(ops) => ops,
        Err(e) => {
            eprintln!("ERROR: Failed to load script: {}", e);
            exit(1);
        }
    };
    tracing::info!(script = %options.script, operations = ops.len(), "loaded script");

    for kind in &options.kinds {
        let config = Config::new(*kind).min_degree(options.degree);
        let mut engine = match Engine::open(&config) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("ERROR: Failed to open {} engine: {}", kind, e);
                exit(1);
            }
        };

        println!("[{}]", kind);
        let start = Instant::now();
        let tally = replay(&mut engine, &ops, options.verbose);
        let elapsed = start.elapsed();

        if let Err(e) = engine.validate() {
            eprintln!("ERROR: {} engine is inconsistent: {}", kind, e);
            exit(1);
        }

        let stats = engine.stats();
        println!("INSERTS: {}", tally.inserts);
        println!("SEARCHES: {} found, {} missing", tally.search_hits, tally.search_misses);
        println!("DELETES: {} removed, {} missing", tally.delete_hits, tally.delete_misses);
        println!("LEN: {}", stats.len);
        println!("HEIGHT: {}", stats.height);
        println!("NODES: {}", stats.node_count);
        println!("TIME_US: {}", elapsed.as_micros());

        if options.dump {
            match serde_json::to_string_pretty(&engine.export_tree()) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Warning: Failed to export tree: {}", e),
            }
        }
    }
}
