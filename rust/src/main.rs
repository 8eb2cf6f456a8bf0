//! Small CLI over the library. Configuration comes from the JSON file named by
//! `DOCSCAN_CONFIG`; without it the defaults apply.

use std::env;
use std::process::ExitCode;

use docscan_rs::config::{load_config, AppConfig};
use docscan_rs::crypto::integrity::sha256_hex;
use docscan_rs::logging::init_logging;
use docscan_rs::signature::{Point, SignaturePad, ThemeSignal};
use docscan_rs::storage::{FileStore, MemoryStore, SecureStorage};

fn print_usage() {
    eprintln!("Commands:\n  slot-name <identity>\n  encrypt <identity> <plaintext>\n  decrypt <identity> <ciphertext>\n  forget <identity>\n  sign <layout-width> <x,y;x,y|x,y;...>\n  hash-bytes <data>");
}

fn load_app_config() -> Result<AppConfig, String> {
    match env::var("DOCSCAN_CONFIG") {
        Ok(path) => load_config(&path).map_err(|e| format!("config load failed: {e}")),
        Err(_) => Ok(AppConfig::default()),
    }
}

fn open_storage(config: &AppConfig) -> Result<SecureStorage<FileStore>, String> {
    let store = FileStore::open(&config.storage.path).map_err(|e| format!("store unavailable: {e}"))?;
    Ok(SecureStorage::with_namespace(store, config.storage.namespace.clone()))
}

/// Parses `x,y;x,y|x,y` into strokes.
fn parse_strokes(spec: &str) -> Result<Vec<Vec<Point>>, String> {
    spec.split('|')
        .filter(|stroke| !stroke.trim().is_empty())
        .map(|stroke| -> Result<Vec<Point>, String> {
            stroke
                .split(';')
                .map(|pair| -> Result<Point, String> {
                    let (x, y) = pair
                        .split_once(',')
                        .ok_or_else(|| format!("expected x,y but got {pair:?}"))?;
                    let x: f32 = x.trim().parse().map_err(|e| format!("bad x in {pair:?}: {e}"))?;
                    let y: f32 = y.trim().parse().map_err(|e| format!("bad y in {pair:?}: {e}"))?;
                    Ok(Point::new(x, y))
                })
                .collect()
        })
        .collect()
}

fn run(args: &[String], config: &AppConfig) -> Result<(), String> {
    match (args.first().map(String::as_str), args.len()) {
        (Some("slot-name"), 2) => {
            let storage =
                SecureStorage::with_namespace(MemoryStore::new(), config.storage.namespace.clone());
            println!("{}", storage.slot_name(&args[1]));
        }
        (Some("encrypt"), 3) => {
            let storage = open_storage(config)?;
            let token = storage
                .encrypt(&args[2], &args[1])
                .map_err(|e| format!("encryption failed: {e}"))?;
            println!("{token}");
        }
        (Some("decrypt"), 3) => {
            let storage = open_storage(config)?;
            println!("{}", storage.decrypt(&args[2], &args[1]));
        }
        (Some("forget"), 2) => {
            let storage = open_storage(config)?;
            storage.forget(&args[1]).map_err(|e| format!("forget failed: {e}"))?;
        }
        (Some("sign"), 3) => {
            let layout_width: f32 = args[1]
                .parse()
                .map_err(|e| format!("invalid layout width: {e}"))?;
            let strokes = parse_strokes(&args[2])?;
            let pad_config = config.signature.pad_config().map_err(|e| format!("{e}"))?;
            let theme = ThemeSignal::new(config.signature.initial_theme().map_err(|e| format!("{e}"))?);

            let mut pad = SignaturePad::mount(layout_width, &theme, pad_config);
            for stroke in strokes {
                let mut points = stroke.into_iter();
                if let Some(first) = points.next() {
                    pad.begin_stroke(first);
                    points.for_each(|point| pad.extend_stroke(point));
                    pad.end_stroke();
                }
            }
            match pad.confirm().map_err(|e| format!("{e}"))? {
                Some(url) => println!("{url}"),
                None => println!(),
            }
        }
        (Some("hash-bytes"), 2) => println!("{}", sha256_hex(args[1].as_bytes())),
        _ => print_usage(),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        print_usage();
        return ExitCode::FAILURE;
    }

    let config = match load_app_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(config.log_level.as_deref());

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_strokes;
    use docscan_rs::signature::Point;

    #[test]
    fn parses_stroke_lists() {
        let strokes = parse_strokes("10,10;50,50|70, 20").expect("valid strokes");
        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[0], vec![Point::new(10.0, 10.0), Point::new(50.0, 50.0)]);
        assert_eq!(strokes[1], vec![Point::new(70.0, 20.0)]);
        assert!(parse_strokes("10;10").is_err());
    }
}
