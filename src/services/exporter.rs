//! Exportação do romaneio tratado (xlsx para o Circuit, csv para conferência)

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_xlsxwriter::{Format, Workbook};

use crate::config::ExportSettings;
use crate::models::Manifest;
use crate::utils::logging::log_export_written;
use crate::utils::{AppError, AppResult};

/// Limite de linhas de uma planilha xlsx (cabeçalho incluso)
const XLSX_MAX_ROWS: usize = 1_048_576;

/// Número "puro": sem zero à esquerda e com no máximo 15 dígitos inteiros
/// (precisão do Excel). Códigos como "007" ou "1,3" continuam texto.
static NUMERIC_CELL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(0|[1-9]\d{0,14})(\.\d+)?$").expect("regex numérica válida"));

/// Valor numérico da célula, quando ela deve ir para o Excel como número
fn numeric_value(cell: &str) -> Option<f64> {
    if !NUMERIC_CELL_RE.is_match(cell) {
        return None;
    }
    cell.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(AppError::ValidationError(format!(
                "unsupported export extension '{}' (use .xlsx or .csv)",
                other
            ))),
        }
    }
}

/// Nome padrão: `<prefixo>_<GAIOLA>_<AAAAmmdd_HHMM>.xlsx` no diretório configurado
pub fn default_output_path(
    settings: &ExportSettings,
    prefix: &str,
    cage: Option<&str>,
    now: DateTime<Local>,
) -> PathBuf {
    let stamp = now.format("%Y%m%d_%H%M");
    let name = match cage {
        Some(code) => format!("{}_{}_{}.xlsx", prefix, code, stamp),
        None => format!("{}_{}.xlsx", prefix, stamp),
    };
    Path::new(&settings.output_dir).join(name)
}

fn write_xlsx(manifest: &Manifest, path: &Path, sheet_name: &str) -> AppResult<()> {
    if manifest.len() + 1 > XLSX_MAX_ROWS {
        return Err(AppError::ExportError(format!(
            "{} rows exceed the xlsx limit",
            manifest.len()
        )));
    }

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, header) in manifest.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }

    for (row_idx, row) in manifest.padded_rows().iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            let (xl_row, xl_col) = ((row_idx + 1) as u32, col as u16);
            match numeric_value(value) {
                Some(number) => {
                    worksheet.write_number(xl_row, xl_col, number)?;
                }
                None if !value.is_empty() => {
                    worksheet.write_string(xl_row, xl_col, value)?;
                }
                None => {}
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_csv(manifest: &Manifest, path: &Path) -> AppResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&manifest.headers)?;
    for row in manifest.padded_rows() {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Grava o romaneio no formato indicado pela extensão do arquivo
pub fn export_manifest(manifest: &Manifest, path: &Path, settings: &ExportSettings) -> AppResult<PathBuf> {
    if manifest.width() > u16::MAX as usize {
        return Err(AppError::ExportError(format!("too many columns: {}", manifest.width())));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    match ExportFormat::from_path(path)? {
        ExportFormat::Xlsx => write_xlsx(manifest, path, &settings.sheet_name)?,
        ExportFormat::Csv => write_csv(manifest, path)?,
    }

    log_export_written(&path.display().to_string(), manifest.len());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_auto, Data, Reader};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use crate::services::manifest_reader::data_to_string;

    fn manifest() -> Manifest {
        let raw = vec![
            vec!["Gaiola".to_string(), "Endereço".to_string()],
            vec!["B-50".to_string(), "Rua A, 1".to_string()],
            vec!["B-50".to_string()],
        ];
        Manifest::from_grid(raw, Some(0), "romaneio.xlsx")
    }

    #[test]
    fn test_numeric_value() {
        assert_eq!(numeric_value("12"), Some(12.0));
        assert_eq!(numeric_value("-3.7319"), Some(-3.7319));
        assert_eq!(numeric_value("0.5"), Some(0.5));
        assert_eq!(numeric_value("007"), None);
        assert_eq!(numeric_value("1,3"), None);
        assert_eq!(numeric_value("B-50"), None);
        assert_eq!(numeric_value("BR1234567890123456"), None);
        assert_eq!(numeric_value("1234567890123456"), None);
        assert_eq!(numeric_value(""), None);
    }

    #[test]
    fn test_export_xlsx_writes_numbers_as_numbers() {
        let raw = vec![
            vec!["Sequence".to_string(), "Latitude".to_string(), "CEP".to_string(), "Gaiola".to_string()],
            vec!["3".to_string(), "-3.7319".to_string(), "060100".to_string(), "B-50".to_string()],
            vec!["1,4".to_string(), "".to_string(), "60160".to_string(), "B-50".to_string()],
        ];
        let manifest = Manifest::from_grid(raw, Some(0), "romaneio.csv");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("circuit.xlsx");

        export_manifest(&manifest, &path, &ExportSettings::default()).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        let range = workbook.worksheet_range("Romaneio").unwrap();
        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(3.0)));
        assert_eq!(range.get_value((1, 1)), Some(&Data::Float(-3.7319)));
        assert_eq!(range.get_value((1, 2)), Some(&Data::String("060100".to_string())));
        assert_eq!(range.get_value((1, 3)), Some(&Data::String("B-50".to_string())));
        assert_eq!(range.get_value((2, 0)), Some(&Data::String("1,4".to_string())));
        assert_eq!(range.get_value((2, 2)), Some(&Data::Float(60160.0)));
    }

    #[test]
    fn test_export_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("a.XLSX")).unwrap(), ExportFormat::Xlsx);
        assert_eq!(ExportFormat::from_path(Path::new("a.csv")).unwrap(), ExportFormat::Csv);
        assert!(ExportFormat::from_path(Path::new("a.pdf")).is_err());
        assert!(ExportFormat::from_path(Path::new("sem_extensao")).is_err());
    }

    #[test]
    fn test_default_output_path() {
        let settings = ExportSettings {
            output_dir: "saida".to_string(),
            ..Default::default()
        };
        let now = Local.with_ymd_and_hms(2026, 1, 31, 6, 45, 0).unwrap();

        let path = default_output_path(&settings, "circuit", Some("B50"), now);
        assert_eq!(path, Path::new("saida").join("circuit_B50_20260131_0645.xlsx"));

        let path = default_output_path(&settings, "romaneio", None, now);
        assert_eq!(path, Path::new("saida").join("romaneio_20260131_0645.xlsx"));
    }

    #[test]
    fn test_export_csv_pads_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("b50.csv");

        export_manifest(&manifest(), &path, &ExportSettings::default()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Gaiola,Endereço\nB-50,\"Rua A, 1\"\nB-50,\n");
    }

    #[test]
    fn test_export_xlsx_roundtrip_through_calamine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b50.xlsx");
        let settings = ExportSettings {
            sheet_name: "Circuit".to_string(),
            ..Default::default()
        };

        export_manifest(&manifest(), &path, &settings).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Circuit".to_string()]);
        let range = workbook.worksheet_range("Circuit").unwrap();
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|r| r.iter().map(data_to_string).collect())
            .collect();
        assert_eq!(rows[0], vec!["Gaiola", "Endereço"]);
        assert_eq!(rows[1], vec!["B-50", "Rua A, 1"]);
        assert_eq!(rows[2][0], "B-50");
    }
}
