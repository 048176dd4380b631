use std::env;
use std::fs::{self, File};
use std::io::{self, Read};

use chrono::Utc;
use pipeline::build_report;
use ranking_core::RankingConfig;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("usage: ranking_cli <visits.json|-> [players.json]");
        std::process::exit(2);
    }

    let path = &args[1];
    let mut data = String::new();
    if path == "-" {
        let mut stdin = io::stdin();
        stdin.read_to_string(&mut data).unwrap_or_else(|err| {
            eprintln!("failed to read stdin: {}", err);
            std::process::exit(1);
        });
    } else {
        let mut file = File::open(path).unwrap_or_else(|err| {
            eprintln!("failed to open {}: {}", path, err);
            std::process::exit(1);
        });
        file.read_to_string(&mut data).unwrap_or_else(|err| {
            eprintln!("failed to read {}: {}", path, err);
            std::process::exit(1);
        });
    }

    let input = serde_json::from_str(&data).unwrap_or_else(|err| {
        eprintln!("failed to parse {}: {}", path, err);
        std::process::exit(1);
    });

    let report = build_report(&input, Utc::now(), &RankingConfig::default());
    let rendered = serde_json::to_string_pretty(&report).unwrap_or_else(|err| {
        eprintln!("failed to render report: {}", err);
        std::process::exit(1);
    });

    match args.get(2) {
        Some(output) => {
            fs::write(output, rendered).unwrap_or_else(|err| {
                eprintln!("failed to write {}: {}", output, err);
                std::process::exit(1);
            });
        }
        None => println!("{}", rendered),
    }

    if !report.success {
        std::process::exit(1);
    }
}
