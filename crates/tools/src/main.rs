use std::env;
use std::fs;
use std::path::PathBuf;

use catalog::{build_catalog, compute_neighbors, TourConfig, DEFAULT_NEIGHBOR_RADIUS_M};
use formats::{list_asset_dirs, load_coordinate_table};

fn main() {
    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "build" => cmd_build(args),
        "neighbors" => cmd_neighbors(args),
        _ => Err(usage()),
    }
}

fn cmd_build(args: Vec<String>) -> Result<(), String> {
    // pano build <coords.csv> <assets_dir> [--radius METERS] [--out FILE]
    if args.len() < 2 {
        return Err(usage());
    }

    let coords_path = PathBuf::from(&args[0]);
    let assets_root = PathBuf::from(&args[1]);
    let mut config = TourConfig::default();
    let mut out: Option<PathBuf> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--radius" => {
                i += 1;
                config.link_radius_m = parse_radius(&args, i)?;
            }
            "--out" => {
                i += 1;
                if i >= args.len() {
                    return Err("--out requires a value".to_string());
                }
                out = Some(PathBuf::from(&args[i]));
            }
            s => {
                return Err(format!("unknown arg: {s}\n\n{}", usage()));
            }
        }
        i += 1;
    }

    let table = load_coordinate_table(&coords_path).map_err(|e| e.to_string())?;
    if table.dropped_rows > 0 {
        eprintln!("note: dropped {} malformed row(s)", table.dropped_rows);
    }
    let assets = list_asset_dirs(&assets_root).map_err(|e| e.to_string())?;
    let catalog = build_catalog(&table.points, &assets, &config);

    let body = serde_json::to_string_pretty(&catalog).map_err(|e| e.to_string())?;
    match out {
        Some(path) => {
            fs::write(&path, body).map_err(|e| format!("write {}: {e}", path.display()))?;
            eprintln!("wrote {} panorama(s) to {}", catalog.len(), path.display());
        }
        None => println!("{body}"),
    }
    Ok(())
}

fn cmd_neighbors(args: Vec<String>) -> Result<(), String> {
    // pano neighbors <coords.csv> [--radius METERS]
    if args.is_empty() {
        return Err(usage());
    }

    let coords_path = PathBuf::from(&args[0]);
    let mut radius_m = DEFAULT_NEIGHBOR_RADIUS_M;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--radius" => {
                i += 1;
                radius_m = parse_radius(&args, i)?;
            }
            s => {
                return Err(format!("unknown arg: {s}\n\n{}", usage()));
            }
        }
        i += 1;
    }

    let table = load_coordinate_table(&coords_path).map_err(|e| e.to_string())?;
    let map = compute_neighbors(&table.points, radius_m);

    let body = serde_json::to_string_pretty(&map).map_err(|e| e.to_string())?;
    println!("{body}");
    Ok(())
}

fn parse_radius(args: &[String], i: usize) -> Result<f64, String> {
    if i >= args.len() {
        return Err("--radius requires a value".to_string());
    }
    args[i]
        .parse::<f64>()
        .map_err(|_| format!("invalid radius: {}", args[i]))
}

fn usage() -> String {
    "usage:\n  \
     pano build <coords.csv> <assets_dir> [--radius METERS] [--out FILE]\n  \
     pano neighbors <coords.csv> [--radius METERS]"
        .to_string()
}
