//! Filtros do romaneio: gaiola e bairro

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::Manifest;
use crate::utils::logging::{log_cage_filtered, log_neighborhood_filtered};
use crate::config::FilterSettings;
use crate::utils::normalization::{clean_string, is_similar, same_name};

/// Célula inteira com formato de gaiola: letra + (hífen/espaço) + número
static CAGE_CELL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][- ]?\d{1,4}$").expect("regex de gaiola válida"));

/// Gaiola mencionada no meio de um texto livre
static CAGE_MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z][- ]?\d+)").expect("regex de menção válida"));

/// Forma canônica do código de gaiola ("b-50" → "B50")
pub fn normalize_cage_code(code: &str) -> String {
    clean_string(code)
}

/// A célula parece um código de gaiola?
///
/// # Exemplos
/// ```
/// use waze_humano::services::filters::looks_like_cage_code;
///
/// assert!(looks_like_cage_code("B-50"));
/// assert!(looks_like_cage_code(" c12 "));
/// assert!(!looks_like_cage_code("Rua B, 50"));
/// ```
pub fn looks_like_cage_code(cell: &str) -> bool {
    CAGE_CELL_RE.is_match(cell.trim().to_uppercase().as_str())
}

/// Extrai o código de gaiola de uma pergunta livre
///
/// # Exemplos
/// ```
/// use waze_humano::services::filters::extract_cage_code;
///
/// assert_eq!(extract_cage_code("Quantas paradas tem a gaiola b50?").as_deref(), Some("B50"));
/// assert_eq!(extract_cage_code("Gaiola C-7 tem comércio?").as_deref(), Some("C7"));
/// assert_eq!(extract_cage_code("quantos pacotes hoje?"), None);
/// ```
pub fn extract_cage_code(text: &str) -> Option<String> {
    let upper = text.to_uppercase();
    CAGE_MENTION_RE
        .captures(&upper)
        .and_then(|caps| caps.get(1))
        .map(|m| normalize_cage_code(m.as_str()))
}

/// Resultado do filtro por gaiola
#[derive(Debug, Clone)]
pub struct CageSelection {
    pub code: String,
    /// Coluna onde a gaiola foi encontrada
    pub column: Option<usize>,
    pub manifest: Manifest,
}

/// Mantém só os pacotes da gaiola
///
/// Sem coluna conhecida, procura em todas as colunas e usa a primeira que
/// tiver correspondências.
pub fn filter_by_cage(manifest: &Manifest, cage_column: Option<usize>, code: &str) -> CageSelection {
    let target = normalize_cage_code(code);

    let candidates: Vec<usize> = match cage_column {
        Some(column) => vec![column],
        None => (0..manifest.width()).collect(),
    };

    for column in candidates {
        let selected = manifest.retain_rows(|row| {
            row.get(column).map_or(false, |cell| normalize_cage_code(cell) == target)
        });
        if !selected.is_empty() || cage_column.is_some() {
            log_cage_filtered(&target, selected.len());
            return CageSelection {
                code: target,
                column: Some(column),
                manifest: selected,
            };
        }
    }

    log_cage_filtered(&target, 0);
    CageSelection {
        code: target,
        column: None,
        manifest: manifest.retain_rows(|_| false),
    }
}

/// Mantém os pacotes cujos bairros batem com algum dos pedidos
///
/// A comparação é exata após `normalize_string`; com `fuzzy_neighborhoods`
/// aceita grafias próximas palavra a palavra.
pub fn filter_by_neighborhoods(
    manifest: &Manifest,
    neighborhood_column: usize,
    wanted: &[String],
    settings: &FilterSettings,
) -> Manifest {
    let matches = |bairro: &str, w: &str| {
        if settings.fuzzy_neighborhoods {
            is_similar(bairro, w, settings.neighborhood_threshold)
        } else {
            same_name(bairro, w)
        }
    };

    let filtered = manifest.retain_rows(|row| {
        let bairro = row.get(neighborhood_column).map(String::as_str).unwrap_or("");
        wanted.iter().any(|w| matches(bairro, w))
    });
    log_neighborhood_filtered(wanted.len(), filtered.len());
    filtered
}

/// Pacotes por gaiola
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CageCount {
    pub code: String,
    pub packages: usize,
}

/// Gaiolas presentes na coluna, ordenadas por letra e número
pub fn distinct_cages(manifest: &Manifest, cage_column: usize) -> Vec<CageCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for cell in manifest.column(cage_column) {
        if looks_like_cage_code(cell) {
            *counts.entry(normalize_cage_code(cell)).or_insert(0) += 1;
        }
    }

    let mut cages: Vec<CageCount> = counts
        .into_iter()
        .map(|(code, packages)| CageCount { code, packages })
        .collect();
    cages.sort_by_key(|c| cage_sort_key(&c.code));
    cages
}

fn cage_sort_key(code: &str) -> (String, u64, String) {
    let letters: String = code.chars().take_while(|c| !c.is_ascii_digit()).collect();
    let number = code[letters.len()..].parse().unwrap_or(u64::MAX);
    (letters, number, code.to_string())
}
