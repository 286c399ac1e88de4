//! Detecção de cabeçalho e de colunas do romaneio
//!
//! Os romaneios da Shopee chegam com layouts diferentes: às vezes com linhas de
//! título antes do cabeçalho, às vezes sem cabeçalho nenhum. A detecção segue a
//! ordem: coluna forçada na configuração → nome do cabeçalho → conteúdo.

use serde::Serialize;

use casadinha::StopColumns;

use crate::config::ColumnOverrides;
use crate::models::Manifest;
use crate::services::filters::looks_like_cage_code;
use crate::utils::logging::{log_column_detected, log_column_missing};
use crate::utils::normalization::{normalize_string, remove_accents};
use crate::utils::{AppError, AppResult};

const CAGE_HEADERS: &[&str] = &["gaiola", "cage", "corredor"];
const ADDRESS_HEADERS: &[&str] = &["endereco", "address", "logradouro"];
const SEQUENCE_HEADERS: &[&str] = &["sequence", "sequencia", "seq", "ordem", "stop", "parada"];
const LATITUDE_HEADERS: &[&str] = &["latitude", "lat"];
const LONGITUDE_HEADERS: &[&str] = &["longitude", "lon", "lng"];
const NEIGHBORHOOD_HEADERS: &[&str] = &["bairro", "neighborhood", "neighbourhood", "district"];

/// Trechos que denunciam uma coluna de endereço pelo conteúdo
const ADDRESS_HINTS: &[&str] = &["ENDERE", "LOGRA", "RUA", "ADDRESS"];

/// Quantas linhas olhar ao procurar o endereço pelo conteúdo
const ADDRESS_SCAN_ROWS: usize = 15;

/// Cabeçalhos reais são curtos; células longas são dados
const MAX_HEADER_LEN: usize = 40;

/// Fração mínima de células com cara de gaiola
const MIN_CAGE_RATIO: f64 = 0.5;

/// Posição (base zero) de cada coluna relevante
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMap {
    pub cage: Option<usize>,
    pub address: usize,
    pub sequence: Option<usize>,
    pub latitude: Option<usize>,
    pub longitude: Option<usize>,
    pub neighborhood: Option<usize>,
}

impl ColumnMap {
    /// Colunas no formato do motor de casadinhas
    pub fn stop_columns(&self) -> StopColumns {
        let columns = StopColumns {
            address: self.address,
            sequence: self.sequence,
            latitude: None,
            longitude: None,
        };
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => columns.with_coordinates(lat, lon),
            _ => columns,
        }
    }
}

fn header_matches(header: &str, keywords: &[&str]) -> bool {
    let normalized = normalize_string(header);
    if normalized.is_empty() || header.chars().count() > MAX_HEADER_LEN {
        return false;
    }
    let padded = format!(" {} ", normalized);
    keywords.iter().any(|kw| padded.contains(&format!(" {} ", kw)))
}

fn all_header_keywords() -> [&'static [&'static str]; 6] {
    [
        CAGE_HEADERS,
        ADDRESS_HEADERS,
        SEQUENCE_HEADERS,
        LATITUDE_HEADERS,
        LONGITUDE_HEADERS,
        NEIGHBORHOOD_HEADERS,
    ]
}

/// Procura a linha de cabeçalho nas primeiras `scan_rows` linhas
///
/// Uma linha é cabeçalho quando pelo menos dois papéis diferentes (gaiola,
/// endereço, bairro...) aparecem como nomes de coluna.
pub fn detect_header_row(grid: &[Vec<String>], scan_rows: usize) -> Option<usize> {
    grid.iter().take(scan_rows).position(|row| {
        all_header_keywords()
            .iter()
            .filter(|keywords| row.iter().any(|cell| header_matches(cell, keywords)))
            .count()
            >= 2
    })
}

fn by_header(manifest: &Manifest, keywords: &[&str]) -> Option<usize> {
    if manifest.header_row.is_none() {
        return None;
    }
    manifest
        .headers
        .iter()
        .position(|h| header_matches(h, keywords))
}

/// Coluna cujas células mais parecem códigos de gaiola ("B-50", "C12")
pub fn find_cage_column(manifest: &Manifest) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for column in 0..manifest.width() {
        let (matched, filled) = manifest
            .column(column)
            .filter(|v| !v.trim().is_empty())
            .fold((0usize, 0usize), |(m, f), v| {
                (m + usize::from(looks_like_cage_code(v)), f + 1)
            });

        if filled == 0 {
            continue;
        }
        let ratio = matched as f64 / filled as f64;
        if ratio >= MIN_CAGE_RATIO && best.map_or(true, |(_, r)| ratio > r) {
            best = Some((column, ratio));
        }
    }

    best.map(|(column, _)| column)
}

/// Coluna de endereço pelo conteúdo
///
/// Primeiro procura termos típicos (RUA, ENDEREÇO...) nas primeiras linhas;
/// sem sucesso, usa a coluna com a célula mais longa.
pub fn find_address_column(manifest: &Manifest) -> Option<usize> {
    for row in manifest.rows.iter().take(ADDRESS_SCAN_ROWS) {
        let hit = row.iter().position(|cell| {
            let upper = remove_accents(cell);
            ADDRESS_HINTS.iter().any(|hint| upper.contains(hint))
        });
        if hit.is_some() {
            return hit;
        }
    }

    (0..manifest.width())
        .map(|column| {
            let longest = manifest.column(column).map(|v| v.chars().count()).max().unwrap_or(0);
            (column, longest)
        })
        .filter(|(_, longest)| *longest > 0)
        // max_by_key devolve o último empate; queremos o primeiro
        .fold(None, |best: Option<(usize, usize)>, (column, longest)| match best {
            Some((_, best_len)) if best_len >= longest => best,
            _ => Some((column, longest)),
        })
        .map(|(column, _)| column)
}

fn resolve_override(manifest: &Manifest, role: &str, raw: &str) -> AppResult<usize> {
    let width = manifest.width();
    if let Ok(index) = raw.trim().parse::<usize>() {
        if index < width {
            return Ok(index);
        }
        return Err(AppError::ColumnNotFound(format!(
            "{}: index {} out of range (width {})",
            role, index, width
        )));
    }

    let wanted = normalize_string(raw);
    manifest
        .headers
        .iter()
        .position(|h| normalize_string(h) == wanted)
        .ok_or_else(|| AppError::ColumnNotFound(format!("{}: no header named '{}'", role, raw)))
}

fn detect_optional(
    manifest: &Manifest,
    role: &str,
    override_value: Option<&String>,
    keywords: &[&str],
    content: impl FnOnce(&Manifest) -> Option<usize>,
) -> AppResult<Option<usize>> {
    if let Some(raw) = override_value {
        let index = resolve_override(manifest, role, raw)?;
        log_column_detected(role, index, manifest.header(index), "configuração");
        return Ok(Some(index));
    }
    if let Some(index) = by_header(manifest, keywords) {
        log_column_detected(role, index, manifest.header(index), "cabeçalho");
        return Ok(Some(index));
    }
    if let Some(index) = content(manifest) {
        log_column_detected(role, index, manifest.header(index), "conteúdo");
        return Ok(Some(index));
    }
    log_column_missing(role);
    Ok(None)
}

fn no_content(_: &Manifest) -> Option<usize> {
    None
}

/// Detecta todas as colunas do romaneio
///
/// Endereço é obrigatório; as demais podem faltar.
pub fn detect_columns(manifest: &Manifest, overrides: &ColumnOverrides) -> AppResult<ColumnMap> {
    let address = detect_optional(
        manifest,
        "endereço",
        overrides.address.as_ref(),
        ADDRESS_HEADERS,
        find_address_column,
    )?
    .ok_or_else(|| AppError::ColumnNotFound(format!("address column in {}", manifest.source)))?;

    let cage = detect_optional(manifest, "gaiola", overrides.cage.as_ref(), CAGE_HEADERS, find_cage_column)?;
    let sequence = detect_optional(manifest, "sequência", overrides.sequence.as_ref(), SEQUENCE_HEADERS, no_content)?;
    let latitude = detect_optional(manifest, "latitude", overrides.latitude.as_ref(), LATITUDE_HEADERS, no_content)?;
    let longitude = detect_optional(manifest, "longitude", overrides.longitude.as_ref(), LONGITUDE_HEADERS, no_content)?;
    let neighborhood = detect_optional(
        manifest,
        "bairro",
        overrides.neighborhood.as_ref(),
        NEIGHBORHOOD_HEADERS,
        no_content,
    )?;

    Ok(ColumnMap {
        cage,
        address,
        sequence,
        latitude,
        longitude,
        neighborhood,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn shopee_grid() -> Vec<Vec<String>> {
        grid(&[
            &["ROMANEIO PM 31/01"],
            &["Gaiola", "AT ID", "Sequence", "Destination Address", "Bairro", "Latitude", "Longitude"],
            &["B-50", "BR1", "1", "Rua Canuto de Aguiar, 500, apto 301", "Meireles", "-3.7271", "-38.4950"],
            &["B-50", "BR2", "2", "Rua Canuto de Aguiar, 500", "Meireles", "-3.7271", "-38.4950"],
            &["C-12", "BR3", "1", "Av. Dom Luís, 1200, loja 3", "Aldeota", "-3.7360", "-38.4830"],
        ])
    }

    #[test]
    fn test_detect_header_row_skips_title() {
        assert_eq!(detect_header_row(&shopee_grid(), 15), Some(1));
    }

    #[test]
    fn test_detect_header_row_ignores_data_rows() {
        let raw = grid(&[
            &["B-50", "Rua A, 1", "Centro"],
            &["B-50", "Rua B, 2", "Centro"],
        ]);
        assert_eq!(detect_header_row(&raw, 15), None);
    }

    #[test]
    fn test_detect_columns_by_header() {
        let raw = shopee_grid();
        let header = detect_header_row(&raw, 15);
        let manifest = Manifest::from_grid(raw, header, "romaneio.xlsx");

        let map = detect_columns(&manifest, &ColumnOverrides::default()).unwrap();

        assert_eq!(
            map,
            ColumnMap {
                cage: Some(0),
                address: 3,
                sequence: Some(2),
                latitude: Some(5),
                longitude: Some(6),
                neighborhood: Some(4),
            }
        );
        assert_eq!(map.stop_columns(), StopColumns::new(3).with_sequence(2).with_coordinates(5, 6));
    }

    #[test]
    fn test_detect_columns_by_content_without_header() {
        let raw = grid(&[
            &["123", "B-50", "Av. Beira Mar, 10"],
            &["124", "B-50", "Travessa Crato, 22"],
            &["125", "C-7", "Rua Tereza Cristina, 7"],
        ]);
        let manifest = Manifest::from_grid(raw, None, "romaneio.xlsx");

        let map = detect_columns(&manifest, &ColumnOverrides::default()).unwrap();

        assert_eq!(map.cage, Some(1));
        // "RUA" só aparece na terceira linha, mas na coluna certa
        assert_eq!(map.address, 2);
        assert_eq!(map.sequence, None);
        assert_eq!(map.stop_columns().latitude, None);
    }

    #[test]
    fn test_address_falls_back_to_longest_cell() {
        let raw = grid(&[&["A1", "Av. Beira Mar 10 Meireles"], &["A1", "Travessa Crato 22"]]);
        let manifest = Manifest::from_grid(raw, None, "x.csv");

        assert_eq!(find_address_column(&manifest), Some(1));
    }

    #[test]
    fn test_overrides_by_index_and_name() {
        let raw = shopee_grid();
        let header = detect_header_row(&raw, 15);
        let manifest = Manifest::from_grid(raw, header, "romaneio.xlsx");

        let overrides = ColumnOverrides {
            cage: Some("1".to_string()),
            address: Some("destination address".to_string()),
            ..Default::default()
        };
        let map = detect_columns(&manifest, &overrides).unwrap();
        assert_eq!(map.cage, Some(1));
        assert_eq!(map.address, 3);

        let bad = ColumnOverrides {
            sequence: Some("Ordem de Entrega".to_string()),
            ..Default::default()
        };
        assert!(matches!(detect_columns(&manifest, &bad), Err(AppError::ColumnNotFound(_))));
    }

    #[test]
    fn test_empty_manifest_has_no_address() {
        let manifest = Manifest::from_grid(Vec::new(), None, "vazio.xlsx");
        assert!(matches!(
            detect_columns(&manifest, &ColumnOverrides::default()),
            Err(AppError::ColumnNotFound(_))
        ));
    }
}
