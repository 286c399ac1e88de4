//! Leitura do romaneio (xlsx/xls/ods via calamine, csv via csv)

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use encoding_rs::WINDOWS_1252;

use crate::config::ManifestSettings;
use crate::models::Manifest;
use crate::services::column_detector::detect_header_row;
use crate::utils::logging::log_manifest_loaded;
use crate::utils::{AppError, AppResult};

/// Converte uma célula do calamine para texto
///
/// Números inteiros gravados como float perdem o ".0" (sequência 12.0 → "12").
pub fn data_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

/// Linhas não vazias com o índice (base zero) que tinham na planilha
type SheetRows = Vec<(usize, Vec<String>)>;

fn read_workbook_rows(path: &Path, sheet: Option<&str>) -> AppResult<SheetRows> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names();

    let sheet_name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|name| name.as_str() == wanted)
            .cloned()
            .ok_or_else(|| {
                AppError::SpreadsheetError(format!(
                    "sheet '{}' not found (available: {})",
                    wanted,
                    sheet_names.join(", ")
                ))
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| AppError::SpreadsheetError("workbook has no sheets".to_string()))?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    // O range começa na primeira célula preenchida, não na linha 1
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

    Ok(range
        .rows()
        .enumerate()
        .map(|(i, row)| (first_row + i, row.iter().map(data_to_string).collect::<Vec<String>>()))
        .filter(|(_, row)| !is_blank(row))
        .collect())
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Quantas linhas não vazias olhar para adivinhar o separador
const SNIFF_LINES: usize = 10;

/// Célula em UTF-8 ou, se inválida, Windows-1252 (CSV salvo pelo Excel em pt-BR)
fn decode_cell(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(text) => text.trim().to_string(),
        Err(_) => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(raw);
            text.trim().to_string()
        }
    }
}

fn count_unquoted(line: &[u8], delimiter: u8) -> usize {
    let mut quoted = false;
    let mut count = 0;
    for &byte in line {
        if byte == b'"' {
            quoted = !quoted;
        } else if byte == delimiter && !quoted {
            count += 1;
        }
    }
    count
}

/// (linhas com a contagem mais comum, contagem) para um separador candidato
fn delimiter_score(lines: &[&[u8]], delimiter: u8) -> (usize, usize) {
    let mut frequency: HashMap<usize, usize> = HashMap::new();
    for line in lines {
        let count = count_unquoted(line, delimiter);
        if count > 0 {
            *frequency.entry(count).or_insert(0) += 1;
        }
    }
    frequency
        .into_iter()
        .map(|(count, hits)| (hits, count))
        .max()
        .unwrap_or((0, 0))
}

/// Separador do CSV: ';' é comum em planilhas exportadas no Brasil
///
/// Vence o separador que aparece com a mesma contagem no maior número das
/// primeiras linhas; uma linha de título com vírgula não decide sozinha.
fn sniff_delimiter(content: &[u8]) -> u8 {
    let lines: Vec<&[u8]> = content
        .split(|&b| b == b'\n')
        .filter(|line| line.iter().any(|b| !b.is_ascii_whitespace()))
        .take(SNIFF_LINES)
        .collect();

    if delimiter_score(&lines, b';') > delimiter_score(&lines, b',') {
        b';'
    } else {
        b','
    }
}

fn read_csv_rows(path: &Path) -> AppResult<SheetRows> {
    let bytes = std::fs::read(path)?;
    let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(sniff_delimiter(content))
        .from_reader(content);

    let mut rows = Vec::new();
    for (i, record) in reader.byte_records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line().saturating_sub(1) as usize)
            .unwrap_or(i);
        let row: Vec<String> = record.iter().map(decode_cell).collect();
        if !is_blank(&row) {
            rows.push((line, row));
        }
    }
    Ok(rows)
}

/// Lê o romaneio e detecta a linha de cabeçalho
pub fn read_manifest(path: &Path, settings: &ManifestSettings) -> AppResult<Manifest> {
    if !path.exists() {
        return Err(AppError::ValidationError(format!(
            "manifest file not found: {}",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let sheet_rows = match extension.as_str() {
        "csv" | "txt" => read_csv_rows(path)?,
        _ => read_workbook_rows(path, settings.sheet.as_deref())?,
    };
    let (lines, grid): (Vec<usize>, Vec<Vec<String>>) = sheet_rows.into_iter().unzip();

    let header_idx = detect_header_row(&grid, settings.header_scan_rows);
    let mut manifest = Manifest::from_grid(grid, header_idx, path.display().to_string());
    manifest.header_row = header_idx.and_then(|i| lines.get(i).copied());

    log_manifest_loaded(&manifest.source, manifest.len(), manifest.header_row);
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_data_to_string() {
        assert_eq!(data_to_string(&Data::Float(12.0)), "12");
        assert_eq!(data_to_string(&Data::Float(-3.7319)), "-3.7319");
        assert_eq!(data_to_string(&Data::Int(7)), "7");
        assert_eq!(data_to_string(&Data::String("  B-50 ".into())), "B-50");
        assert_eq!(data_to_string(&Data::Bool(true)), "true");
        assert_eq!(data_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("Gaiola;Endereço;Bairro".as_bytes()), b';');
        assert_eq!(sniff_delimiter("Gaiola,Endereço,Bairro".as_bytes()), b',');
        // Vírgulas entre aspas não contam
        assert_eq!(sniff_delimiter(b"Gaiola,Endereco\nB-50,\"Rua A, 1, apto 2\"\n"), b',');
    }

    #[test]
    fn test_sniff_delimiter_ignores_comma_in_title() {
        let content = "ROMANEIO PM, 31/01\nGaiola;Endereço;Bairro\nB-50;Rua A, 1;Centro\nC-7;Rua B, 2;Aldeota\n";
        assert_eq!(sniff_delimiter(content.as_bytes()), b';');
    }

    #[test]
    fn test_decode_cell() {
        assert_eq!(decode_cell("Endereço".as_bytes()), "Endereço");
        assert_eq!(decode_cell(b" Endere\xE7o "), "Endereço");
        assert_eq!(decode_cell(b"Cear\xE1"), "Ceará");
    }

    #[test]
    fn test_read_csv_with_title_and_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("romaneio.csv");
        std::fs::write(
            &path,
            "ROMANEIO PM 31/01;;\nGaiola;Endereço;Bairro\n\nB-50;Rua A, 1;Centro\nC-7;Rua B, 2;Aldeota\n;;\n",
        )
        .unwrap();

        let manifest = read_manifest(&path, &ManifestSettings::default()).unwrap();

        assert_eq!(manifest.header_row, Some(1));
        assert_eq!(manifest.headers, vec!["Gaiola", "Endereço", "Bairro"]);
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.cell(0, 1), "Rua A, 1");
    }

    #[test]
    fn test_read_windows_1252_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("romaneio_excel.csv");
        std::fs::write(
            &path,
            b"Gaiola;Endere\xE7o;Bairro\nB-50;Rua A, 1;Centro\nB-50;Pra\xE7a Portugal, 10;Aldeota\n",
        )
        .unwrap();

        let manifest = read_manifest(&path, &ManifestSettings::default()).unwrap();

        assert_eq!(manifest.headers, vec!["Gaiola", "Endereço", "Bairro"]);
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.cell(1, 1), "Praça Portugal, 10");
    }

    #[test]
    fn test_read_csv_with_utf8_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("romaneio_bom.csv");
        std::fs::write(&path, "\u{feff}Gaiola;Endereço\nB-50;Rua A, 1\n").unwrap();

        let manifest = read_manifest(&path, &ManifestSettings::default()).unwrap();
        assert_eq!(manifest.headers[0], "Gaiola");
    }

    #[test]
    fn test_header_row_counts_blank_lines_of_the_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("romaneio.csv");
        std::fs::write(&path, "\n\nGaiola;Endereço;Bairro\nB-50;Rua A, 1;Centro\n").unwrap();

        let manifest = read_manifest(&path, &ManifestSettings::default()).unwrap();

        assert_eq!(manifest.header_row, Some(2));
        assert_eq!(manifest.len(), 1);
    }

    fn write_workbook(path: &Path) {
        let mut workbook = rust_xlsxwriter::Workbook::new();

        let resumo = workbook.add_worksheet();
        resumo.set_name("Resumo").unwrap();
        resumo.write_string(0, 0, "Total de pacotes").unwrap();
        resumo.write_number(0, 1, 2.0).unwrap();

        let romaneio = workbook.add_worksheet();
        romaneio.set_name("Romaneio").unwrap();
        romaneio.write_string(0, 0, "ROMANEIO PM 31/01").unwrap();
        for (col, header) in ["Gaiola", "Sequence", "Destination Address"].iter().enumerate() {
            romaneio.write_string(2, col as u16, *header).unwrap();
        }
        romaneio.write_string(3, 0, "B-50").unwrap();
        romaneio.write_number(3, 1, 1.0).unwrap();
        romaneio.write_string(3, 2, "Rua A, 1").unwrap();
        romaneio.write_string(4, 0, "B-50").unwrap();
        romaneio.write_number(4, 1, 2.0).unwrap();
        romaneio.write_string(4, 2, "Rua B, 2").unwrap();

        workbook.save(path).unwrap();
    }

    #[test]
    fn test_read_xlsx_configured_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("romaneio.xlsx");
        write_workbook(&path);

        let settings = ManifestSettings {
            sheet: Some("Romaneio".to_string()),
            ..Default::default()
        };
        let manifest = read_manifest(&path, &settings).unwrap();

        assert_eq!(manifest.headers, vec!["Gaiola", "Sequence", "Destination Address"]);
        assert_eq!(manifest.header_row, Some(2));
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.cell(0, 1), "1");
        assert_eq!(manifest.cell(1, 2), "Rua B, 2");
    }

    #[test]
    fn test_read_xlsx_defaults_to_first_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("romaneio.xlsx");
        write_workbook(&path);

        let manifest = read_manifest(&path, &ManifestSettings::default()).unwrap();

        // "Resumo" não tem cabeçalho reconhecível
        assert_eq!(manifest.header_row, None);
        assert_eq!(manifest.rows, vec![vec!["Total de pacotes".to_string(), "2".to_string()]]);
    }

    #[test]
    fn test_read_xlsx_missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("romaneio.xlsx");
        write_workbook(&path);

        let settings = ManifestSettings {
            sheet: Some("Tarde".to_string()),
            ..Default::default()
        };
        let result = read_manifest(&path, &settings);
        assert!(matches!(result, Err(AppError::SpreadsheetError(msg)) if msg.contains("Romaneio")));
    }

    #[test]
    fn test_missing_file() {
        let result = read_manifest(Path::new("/nao/existe.xlsx"), &ManifestSettings::default());
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
