use serde::Serialize;

use crate::services::column_detector::ColumnMap;

/// Resumo de uma execução do pipeline de rota
#[derive(Debug, Clone, Serialize)]
pub struct RouteReport {
    pub source: String,
    pub columns: ColumnMap,
    pub total_packages: usize,
    pub cage: Option<String>,
    pub filtered_packages: usize,
    pub stops: usize,
    pub commercial: usize,
    pub residential: usize,
    /// Linhas na saída após juntar casadinhas (None se não houve junção)
    pub merged_stops: Option<usize>,
    pub casadinhas: usize,
    pub output: Option<String>,
    pub generated_at: String,  // RFC 3339
}

/// Linha da visão geral de gaiolas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CageSummary {
    pub code: String,
    pub packages: usize,
    pub stops: usize,
}

/// Resposta local a uma pergunta sobre o romaneio
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickAnswer {
    pub question: String,
    pub cage: String,
    pub packages: usize,
    pub stops: usize,
    pub commercial: usize,
    pub answer: String,
}
