//! Load every plugin named in a `plugins.txt` and print what was loaded.
//!
//! ```text
//! RUST_LOG=debug cargo run --example dump -- <data dir> [plugins.txt]
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use esmkit::{LoadOrder, RecordKind, RecordSet, Result, load_all};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".into()));
    let plugins_txt = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir.join("plugins.txt"));

    let order = LoadOrder::from_plugins_txt(File::open(&plugins_txt)?)?;
    println!("{} plugins in {}", order.len(), plugins_txt.display());

    let mut sources = Vec::with_capacity(order.len());
    for plugin in order.plugins() {
        let file = BufReader::new(File::open(data_dir.join(plugin))?);
        sources.push((plugin.clone(), file));
    }

    let results = load_all(&order, sources);
    for (plugin, result) in order.plugins().iter().zip(&results) {
        match result {
            Ok(file) => {
                let count =
                    |kind: RecordKind| file.records.iter().filter(|r| r.kind() == kind).count();
                println!(
                    "{plugin:<40} {:>5} NPC_ {:>5} GLOB  ({:?}, {} masters)",
                    count(RecordKind::Npc),
                    count(RecordKind::Global),
                    file.header.version,
                    file.header.masters.len(),
                );
            }
            Err(e) => println!("{plugin:<40} error: {e}"),
        }
    }

    let mut set = RecordSet::new();
    let failed = set.merge(results).len();
    println!("{} records after overrides, {failed} plugins failed", set.len());

    Ok(())
}
