use crate::config::Config;
use crate::progress::ProgressSink;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const WEBP_EXT: &str = "webp";

#[derive(Debug, Default)]
pub struct Expansion {
    pub files: Vec<PathBuf>,
    /// Caminhos que não puderam ser lidos.
    pub failed: usize,
}

/// Expande os caminhos informados na lista de arquivos a converter.
///
/// Diretórios contribuem com seus arquivos `.webp` (em ordem de nome);
/// arquivos informados diretamente entram como estão. Uma falha ao ler um
/// caminho descarta apenas aquele caminho e é enviada ao `progress`.
pub fn expand(config: &Config, progress: &mut dyn ProgressSink) -> Expansion {
    let mut expansion = Expansion::default();
    let mut seen = HashSet::new();

    for input in &config.paths {
        match collect_path(input, config.recursive) {
            Ok(found) => {
                for path in found {
                    if seen.insert(canonical(&path)) {
                        expansion.files.push(path);
                    }
                }
            }
            Err(err) => {
                expansion.failed += 1;
                progress.scan_failed(input, &err);
            }
        }
    }

    expansion
}

fn collect_path(input: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut acc = Vec::new();
    if input.is_dir() {
        if recursive {
            collect_recursive(input, &mut acc)?;
        } else {
            collect_shallow(input, &mut acc)?;
        }
    } else if input.is_file() {
        acc.push(input.to_path_buf());
    } else {
        anyhow::bail!("Caminho inválido: {:?}", input);
    }
    Ok(acc)
}

fn collect_recursive(input: &Path, acc: &mut Vec<PathBuf>) -> Result<()> {
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Falha ao percorrer diretório {:?}", input))?;
        let path = entry.path();
        if path.is_file() && has_webp_ext(path) {
            acc.push(path.to_path_buf());
        }
    }
    Ok(())
}

fn collect_shallow(input: &Path, acc: &mut Vec<PathBuf>) -> Result<()> {
    let dir_iter =
        fs::read_dir(input).with_context(|| format!("Falha ao ler diretório {:?}", input))?;
    let mut found = Vec::new();
    for entry in dir_iter {
        let entry = entry.with_context(|| format!("Falha ao ler diretório {:?}", input))?;
        let path = entry.path();
        if path.is_file() && has_webp_ext(&path) {
            found.push(path);
        }
    }
    found.sort();
    acc.append(&mut found);
    Ok(())
}

fn has_webp_ext(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(e) if cfg!(any(windows, target_os = "macos")) => e.eq_ignore_ascii_case(WEBP_EXT),
        Some(e) => e == WEBP_EXT,
        None => false,
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
