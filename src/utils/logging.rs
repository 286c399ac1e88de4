use tracing::{debug, error, info, warn};

pub fn log_config_loaded(env: &str) {
    info!("Configuration loaded successfully for environment: {}", env);
}

pub fn log_manifest_loaded(source: &str, rows: usize, header_row: Option<usize>) {
    match header_row {
        Some(idx) => info!("📂 Romaneio carregado: {} - {} linhas (cabeçalho na linha {})", source, rows, idx + 1),
        None => info!("📂 Romaneio carregado: {} - {} linhas (sem cabeçalho)", source, rows),
    }
}

pub fn log_column_detected(role: &str, index: usize, header: &str, method: &str) {
    debug!("🔎 Coluna {} = {} ('{}') via {}", role, index, header, method);
}

pub fn log_column_missing(role: &str) {
    debug!("🔎 Coluna {} não encontrada", role);
}

pub fn log_cage_filtered(cage: &str, packages: usize) {
    info!("🎯 Gaiola {}: {} pacotes", cage, packages);
}

pub fn log_neighborhood_filtered(requested: usize, packages: usize) {
    info!("🏘️ Filtro de {} bairro(s): {} pacotes", requested, packages);
}

pub fn log_classification(commercial: usize, residential: usize) {
    info!("🏪 Comércio: {} - 🏠 Residencial: {}", commercial, residential);
}

pub fn log_casadinhas(before: usize, after: usize) {
    info!("🧩 Casadinhas: {} pacotes → {} paradas ({} economizadas)", before, after, before.saturating_sub(after));
}

pub fn log_export_written(path: &str, rows: usize) {
    info!("💾 Exportado: {} ({} linhas)", path, rows);
}

pub fn log_validation_error(field: &str, message: &str) {
    warn!("Validation error: {} - {}", field, message);
}

pub fn log_info(message: &str) {
    info!("{}", message);
}

pub fn log_error(message: &str) {
    error!("{}", message);
}

pub fn log_warning(message: &str) {
    warn!("{}", message);
}
