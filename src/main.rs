use std::path::PathBuf;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use brintel::config::{SdeData, WhoseWho};
use brintel::parser::parse_battle;
use brintel::registry::AllData;
use brintel::source::{read_reference_list, BattleSource, FsBattleSource};

struct Paths {
    whose_who: PathBuf,
    sde: PathBuf,
    references: PathBuf,
    cache_dir: PathBuf,
    out_dir: PathBuf,
}

impl Paths {
    /// Positional arguments with conventional defaults; there are no other
    /// CLI flags.
    fn from_args() -> Self {
        let mut args = std::env::args().skip(1);
        Self {
            whose_who: args
                .next()
                .map(PathBuf::from)
                .unwrap_or_else(|| "data/whosewho.json".into()),
            sde: args
                .next()
                .map(PathBuf::from)
                .unwrap_or_else(|| "data/sde.json".into()),
            references: args
                .next()
                .map(PathBuf::from)
                .unwrap_or_else(|| "data/br_links.txt".into()),
            cache_dir: args.next().map(PathBuf::from).unwrap_or_else(|| "cache".into()),
            out_dir: args.next().map(PathBuf::from).unwrap_or_else(|| "output".into()),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let paths = Paths::from_args();

    let whose_who = match WhoseWho::from_file(&paths.whose_who) {
        Ok(whose_who) => whose_who,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };
    let sde = SdeData::from_file(&paths.sde).unwrap_or_else(|e| {
        error!("No usable SDE data ({e}), systems will get default weather and statics");
        SdeData::default()
    });
    let references = match read_reference_list(&paths.references) {
        Ok(references) => references,
        Err(e) => {
            eprintln!("Failed to read battle reference list: {e}");
            std::process::exit(1);
        }
    };

    let source = FsBattleSource::new(&paths.cache_dir);
    let mut database = AllData::new();
    let mut failed = 0usize;

    // Battles are processed strictly sequentially, in input order; entity
    // resolution is stateful across the whole run.
    for reference in &references {
        let raw = match source.load(reference) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to load battle {reference}: {e}");
                failed += 1;
                continue;
            }
        };
        // One bad battle never aborts the batch.
        if let Err(e) = parse_battle(&raw, &mut database, &whose_who, &sde) {
            error!("Failed to parse battle {reference}: {e}");
            failed += 1;
        }
    }

    info!(
        "Parsed {} battles ({failed} failed) spanning {} to {}",
        database.battles.len(),
        database.start_date,
        database.end_date
    );

    if let Err(e) = write_outputs(&database, &whose_who, &paths.out_dir) {
        error!("Failed to write outputs: {e}");
        std::process::exit(1);
    }
}

fn write_outputs(
    database: &AllData,
    whose_who: &WhoseWho,
    out_dir: &PathBuf,
) -> Result<(), brintel::error::Error> {
    std::fs::create_dir_all(out_dir)?;

    let dump = serde_json::to_string_pretty(&database.export())?;
    std::fs::write(out_dir.join("all_data.json"), dump)?;

    let owners = serde_json::to_string_pretty(&database.station_owners(whose_who))?;
    std::fs::write(out_dir.join("station_owners.json"), owners)?;

    info!("Wrote exports to {}", out_dir.display());
    Ok(())
}
