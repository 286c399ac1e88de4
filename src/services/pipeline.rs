//! Pipeline do romaneio: leitura → colunas → filtros → casadinhas → classificação → exportação

use std::path::{Path, PathBuf};

use casadinha::{merge_stops, MergeOptions};

use crate::config::Settings;
use crate::models::{CageSummary, Manifest, QuickAnswer, RouteReport};
use crate::services::classifier::{AddressClassifier, AddressKind};
use crate::services::column_detector::{detect_columns, ColumnMap};
use crate::services::exporter::{default_output_path, export_manifest};
use crate::services::filters::{distinct_cages, extract_cage_code, filter_by_cage, filter_by_neighborhoods};
use crate::services::manifest_reader::read_manifest;
use crate::services::stop_key::{stop_keys, stop_stats, StopStats};
use crate::utils::logging::{log_casadinhas, log_classification, log_validation_error};
use crate::utils::{AppError, AppResult};

pub const CLASSIFICATION_COLUMN: &str = "CLASSIFICACAO";
pub const STOP_KEY_COLUMN: &str = "CHAVE_STOP";

/// O que fazer com o romaneio
#[derive(Debug, Clone, Default)]
pub struct RouteRequest {
    pub input: PathBuf,
    pub cage: Option<String>,
    pub neighborhoods: Vec<String>,
    /// Junta casadinhas antes de exportar (saída para o Circuit)
    pub merge_casadinhas: bool,
    /// Exporta mesmo sem `output`, usando o nome padrão
    pub export: bool,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RouteResult {
    /// Romaneio final (filtrado, agrupado e com colunas extras)
    pub manifest: Manifest,
    /// Paradas calculadas sobre os pacotes filtrados, antes da junção
    pub stats: StopStats,
    pub report: RouteReport,
}

struct Selection {
    source: String,
    columns: ColumnMap,
    total_packages: usize,
    cage: Option<String>,
    manifest: Manifest,
}

fn load_and_filter(
    settings: &Settings,
    input: &Path,
    cage: Option<&str>,
    neighborhoods: &[String],
) -> AppResult<Selection> {
    let manifest = read_manifest(input, &settings.manifest)?;
    let mut columns = detect_columns(&manifest, &settings.columns)?;
    let total_packages = manifest.len();

    let (cage_code, mut selected) = match cage {
        Some(code) => {
            let selection = filter_by_cage(&manifest, columns.cage, code);
            if selection.manifest.is_empty() {
                log_validation_error("gaiola", &format!("{} sem pacotes", selection.code));
                return Err(AppError::ValidationError(format!(
                    "cage {} not found in {}",
                    selection.code, manifest.source
                )));
            }
            columns.cage = selection.column;
            (Some(selection.code), selection.manifest)
        }
        None => (None, manifest.clone()),
    };

    if !neighborhoods.is_empty() {
        let column = columns
            .neighborhood
            .ok_or_else(|| AppError::ColumnNotFound("neighborhood (bairro) column".to_string()))?;
        selected = filter_by_neighborhoods(
            &selected,
            column,
            neighborhoods,
            &settings.filters,
        );
    }

    Ok(Selection {
        source: manifest.source,
        columns,
        total_packages,
        cage: cage_code,
        manifest: selected,
    })
}

/// Executa o pipeline completo e, se pedido, exporta o resultado
pub fn run(settings: &Settings, request: &RouteRequest) -> AppResult<RouteResult> {
    let selection = load_and_filter(
        settings,
        &request.input,
        request.cage.as_deref(),
        &request.neighborhoods,
    )?;
    let columns = selection.columns;
    let stats = stop_stats(&selection.manifest, columns.address);

    let (mut output, merged_stops, casadinhas) = if request.merge_casadinhas {
        let options = MergeOptions {
            radius_m: settings.casadinha.radius_m,
        };
        let outcome = merge_stops(&selection.manifest.padded_rows(), &columns.stop_columns(), &options)?;
        log_casadinhas(selection.manifest.len(), outcome.rows.len());

        let casadinhas = outcome.casadinhas().count();
        let merged = selection.manifest.with_rows(outcome.rows);
        let stops = merged.len();
        (merged, Some(stops), casadinhas)
    } else {
        (selection.manifest, None, 0)
    };

    let classifier = AddressClassifier::from_settings(&settings.classifier)?;
    let classifications = classifier.classify_column(&output, columns.address);
    let commercial = classifications
        .iter()
        .filter(|c| c.kind == AddressKind::Commercial)
        .count();
    let residential = classifications.len() - commercial;
    log_classification(commercial, residential);

    if settings.export.include_classification {
        let labels = classifications.iter().map(|c| c.kind.label().to_string()).collect();
        output.push_column(CLASSIFICATION_COLUMN, labels);
    }
    if settings.export.include_stop_key {
        let keys = stop_keys(&output, columns.address);
        output.push_column(STOP_KEY_COLUMN, keys);
    }

    let output_path = match (&request.output, request.export) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => {
            let prefix = if request.merge_casadinhas { "circuit" } else { "romaneio" };
            Some(default_output_path(
                &settings.export,
                prefix,
                selection.cage.as_deref(),
                chrono::Local::now(),
            ))
        }
        (None, false) => None,
    };
    let written = match output_path {
        Some(path) => Some(export_manifest(&output, &path, &settings.export)?),
        None => None,
    };

    let report = RouteReport {
        source: selection.source,
        columns,
        total_packages: selection.total_packages,
        cage: selection.cage,
        filtered_packages: stats.packages,
        stops: stats.stops,
        commercial,
        residential,
        merged_stops,
        casadinhas,
        output: written.map(|p| p.display().to_string()),
        generated_at: chrono::Utc::now().to_rfc3339(),
    };

    Ok(RouteResult {
        manifest: output,
        stats,
        report,
    })
}

/// Pacotes e paradas de cada gaiola do romaneio
pub fn cage_overview(settings: &Settings, input: &Path) -> AppResult<Vec<CageSummary>> {
    let manifest = read_manifest(input, &settings.manifest)?;
    let columns = detect_columns(&manifest, &settings.columns)?;
    let cage_column = columns
        .cage
        .ok_or_else(|| AppError::ColumnNotFound("cage (gaiola) column".to_string()))?;

    let summaries = distinct_cages(&manifest, cage_column)
        .into_iter()
        .map(|cage| {
            let selection = filter_by_cage(&manifest, Some(cage_column), &cage.code);
            let stats = stop_stats(&selection.manifest, columns.address);
            CageSummary {
                code: cage.code,
                packages: cage.packages,
                stops: stats.stops,
            }
        })
        .collect();

    Ok(summaries)
}

/// Responde localmente perguntas do tipo "quantas paradas tem a gaiola B50?"
pub fn answer_question(settings: &Settings, input: &Path, question: &str) -> AppResult<QuickAnswer> {
    let code = extract_cage_code(question).ok_or_else(|| {
        log_validation_error("pergunta", "nenhuma gaiola mencionada");
        AppError::ValidationError(format!("no cage code found in question: {}", question))
    })?;

    let selection = load_and_filter(settings, input, Some(&code), &[])?;
    let stats = stop_stats(&selection.manifest, selection.columns.address);

    let classifier = AddressClassifier::from_settings(&settings.classifier)?;
    let commercial = classifier
        .classify_column(&selection.manifest, selection.columns.address)
        .iter()
        .filter(|c| c.kind == AddressKind::Commercial)
        .count();

    let answer = format!(
        "Gaiola {}: {} pacotes em {} paradas ({} comércio(s)).",
        code, stats.packages, stats.stops, commercial
    );

    Ok(QuickAnswer {
        question: question.to_string(),
        cage: code,
        packages: stats.packages,
        stops: stats.stops,
        commercial,
        answer,
    })
}
