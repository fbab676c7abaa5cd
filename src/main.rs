use std::path::PathBuf;
use std::process::ExitCode;

use genlog::state::pager::{fetch_page, Pager};
use genlog::state::store::RecordStore;
use genlog::GenerationRecord;

/// Records fetched per page when walking the history
const PAGE_SIZE: usize = 50;

/// Parsed command-line options
struct Options {
    db_path: Option<PathBuf>,
    json: bool,
    limit: Option<usize>,
    thumb: Option<(i64, PathBuf)>,
}

fn print_usage() {
    eprintln!("Usage: genlog [DATABASE] [--json] [--limit N] [--thumb PREVIEW_ID OUT.jpg]");
    eprintln!();
    eprintln!("Lists an image-generation history database, newest first.");
    eprintln!("Without DATABASE, the default location under the user data dir is probed.");
}

fn parse_args() -> Option<Options> {
    let mut options = Options {
        db_path: None,
        json: false,
        limit: None,
        thumb: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => options.json = true,
            "--limit" => {
                options.limit = Some(args.next()?.parse().ok()?);
            }
            "--thumb" => {
                let id: i64 = args.next()?.parse().ok()?;
                let out = PathBuf::from(args.next()?);
                options.thumb = Some((id, out));
            }
            "--help" | "-h" => return None,
            other if options.db_path.is_none() => {
                options.db_path = Some(PathBuf::from(other));
            }
            _ => return None,
        }
    }
    Some(options)
}

/// Default history database location: ~/.local/share/genlog/history.sqlite3
/// (platform equivalents via the data dir)
fn default_db_path() -> Option<PathBuf> {
    let mut path = dirs::data_dir().or_else(dirs::home_dir)?;
    path.push("genlog");
    path.push("history.sqlite3");
    Some(path)
}

fn print_record(record: &GenerationRecord) {
    println!(
        "#{:<6} {}x{}  seed {:<10}  {:>2} steps  {}  {}",
        record.id,
        record.width,
        record.height,
        record.seed,
        record.steps,
        record.sampler.label(),
        record.model,
    );
    if !record.prompt.is_empty() {
        println!("        📝 {}", record.prompt);
    }
    for lora in &record.loras {
        println!("        🧩 {} @ {:.2}", lora.file, lora.weight);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let Some(options) = parse_args() else {
        print_usage();
        return ExitCode::FAILURE;
    };

    let Some(db_path) = options.db_path.or_else(default_db_path) else {
        eprintln!("⚠️  Could not determine a history database location");
        return ExitCode::FAILURE;
    };

    if let Some((preview_id, out_path)) = options.thumb {
        return dump_thumbnail(&db_path, preview_id, &out_path);
    }

    // Walk the history page by page. The pager enforces "one fetch at a
    // time"; each fetch opens and releases its own read-only handle.
    let mut pager = Pager::new();
    let mut collected: Vec<GenerationRecord> = Vec::new();
    while let Some(request) = pager.begin(PAGE_SIZE) {
        let result = fetch_page(db_path.clone(), request).await;
        let Some(records) = pager.complete(result) else {
            break;
        };
        // an empty page just means a corrupt stretch of rows; the pager's
        // cursor still advances, so the loop terminates on its own
        collected.extend(records);
        if let Some(limit) = options.limit {
            if collected.len() >= limit {
                collected.truncate(limit);
                break;
            }
        }
    }

    if options.json {
        match serde_json::to_string_pretty(&collected) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("⚠️  JSON encoding failed: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        for record in &collected {
            print_record(record);
        }
        println!(
            "✅ {} of {} records listed from {}",
            collected.len(),
            pager.total().unwrap_or(0),
            db_path.display(),
        );
    }

    ExitCode::SUCCESS
}

/// Fetch one thumbnail through the tier logic and write it to disk.
fn dump_thumbnail(db_path: &PathBuf, preview_id: i64, out_path: &PathBuf) -> ExitCode {
    let store = match RecordStore::open(db_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("⚠️  {}", e);
            return ExitCode::FAILURE;
        }
    };

    match store.fetch_thumbnail(preview_id) {
        Some(jpeg) => {
            if let Err(e) = std::fs::write(out_path, &jpeg) {
                eprintln!("⚠️  Failed to write {}: {}", out_path.display(), e);
                return ExitCode::FAILURE;
            }
            println!(
                "📸 Wrote {} bytes of thumbnail for preview {} to {}",
                jpeg.len(),
                preview_id,
                out_path.display(),
            );
            ExitCode::SUCCESS
        }
        None => {
            println!("⚠️  No thumbnail found for preview {}", preview_id);
            ExitCode::FAILURE
        }
    }
}
