use std::error::Error as _;
use std::{env, process};

use layini::Document;
use log::error;

fn main() {
    env_logger::init();

    let mut translate = false;
    let mut paths = Vec::new();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--translate" => translate = true,
            _ => paths.push(arg),
        }
    }

    if paths.is_empty() {
        eprintln!("usage: layini <path>... [--translate]");
        process::exit(1);
    }

    // Each file is layered over the ones before it.
    let mut document = Document::new();
    for path in &paths {
        if let Err(e) = document.load_additional(path) {
            if let Some(source) = e.source() {
                error!("{path}: {source}");
            }
            eprintln!("failed to load {path}: {e}");
            process::exit(1);
        }
    }

    if translate {
        let mut translated = Document::with_translation_section(document.translation_section());
        for section in document.sections() {
            for key in document.keys(section) {
                let value = document.translate(document.get(section, key));
                translated.set(section, key, &value);
            }
        }
        document = translated;
    }

    print!("{document}");
}
