//! Classificação de endereços: comércio ou residência
//!
//! Comércios fecham cedo e costumam receber antes na rota, por isso o
//! romaneio exportado traz a coluna CLASSIFICACAO. A regra é simples: qualquer
//! termo comercial no endereço (sem acentos, maiúsculo) vence.

use aho_corasick::{AhoCorasick, MatchKind};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ClassifierSettings;
use crate::models::Manifest;
use crate::utils::normalization::remove_accents;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AddressKind {
    Commercial,
    Residential,
}

impl AddressKind {
    pub fn label(&self) -> &'static str {
        match self {
            AddressKind::Commercial => "Comércio",
            AddressKind::Residential => "Residencial",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            AddressKind::Commercial => "🏪",
            AddressKind::Residential => "🏠",
        }
    }
}

impl std::fmt::Display for AddressKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.icon(), self.label())
    }
}

/// Resultado da classificação de um endereço
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub kind: AddressKind,
    /// Termo que decidiu a classificação, se houve algum
    pub matched_term: Option<String>,
}

/// Arquivo YAML de termos (`classifier.terms_file`)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TermsFile {
    commercial_terms: Vec<String>,
    residential_terms: Vec<String>,
}

struct TermMatcher {
    terms: Vec<String>,
    automaton: AhoCorasick,
}

impl TermMatcher {
    fn new(raw_terms: &[String]) -> AppResult<Self> {
        let mut terms: Vec<String> = raw_terms
            .iter()
            .map(|t| remove_accents(t.trim()))
            .filter(|t| !t.is_empty())
            .collect();
        terms.dedup();

        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&terms)
            .map_err(|e| AppError::ConfigError(format!("Invalid classifier terms: {}", e)))?;

        Ok(Self { terms, automaton })
    }

    fn first_match(&self, haystack: &str) -> Option<&str> {
        self.automaton
            .find(haystack)
            .map(|m| self.terms[m.pattern().as_usize()].as_str())
    }
}

/// Classificador por listas de termos
pub struct AddressClassifier {
    commercial: TermMatcher,
    residential: TermMatcher,
}

impl AddressClassifier {
    pub fn new(commercial_terms: &[String], residential_terms: &[String]) -> AppResult<Self> {
        Ok(Self {
            commercial: TermMatcher::new(commercial_terms)?,
            residential: TermMatcher::new(residential_terms)?,
        })
    }

    /// Usa o arquivo de termos se configurado; senão, as listas da configuração
    pub fn from_settings(settings: &ClassifierSettings) -> AppResult<Self> {
        match &settings.terms_file {
            Some(path) => {
                let terms = load_terms_from_yaml(path)?;
                info!(
                    "✅ Termos carregados de {}: {} comerciais, {} residenciais",
                    path,
                    terms.commercial_terms.len(),
                    terms.residential_terms.len()
                );
                let commercial = if terms.commercial_terms.is_empty() {
                    &settings.commercial_terms
                } else {
                    &terms.commercial_terms
                };
                let residential = if terms.residential_terms.is_empty() {
                    &settings.residential_terms
                } else {
                    &terms.residential_terms
                };
                Self::new(commercial, residential)
            }
            None => Self::new(&settings.commercial_terms, &settings.residential_terms),
        }
    }

    pub fn classify(&self, address: &str) -> Classification {
        let normalized = remove_accents(address);

        if let Some(term) = self.commercial.first_match(&normalized) {
            return Classification {
                kind: AddressKind::Commercial,
                matched_term: Some(term.to_string()),
            };
        }

        Classification {
            kind: AddressKind::Residential,
            matched_term: self.residential.first_match(&normalized).map(str::to_string),
        }
    }

    /// Classifica cada linha do romaneio pela coluna de endereço
    pub fn classify_column(&self, manifest: &Manifest, address_column: usize) -> Vec<Classification> {
        manifest
            .column(address_column)
            .map(|address| self.classify(address))
            .collect()
    }
}

fn load_terms_from_yaml(path: &str) -> AppResult<TermsFile> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::ConfigError(format!("Failed to read terms file {}: {}", path, e)))?;
    let terms: TermsFile = serde_yaml::from_str(&content)?;
    Ok(terms)
}

pub fn default_commercial_terms() -> Vec<String> {
    [
        "LOJA",
        "MERCADO",
        "MERCEARIA",
        "FARMACIA",
        "DROGARIA",
        "SUPERMERCADO",
        "PADARIA",
        "SALA",
        "COMERCIAL",
        "EMPRESA",
        "SHOPPING",
        "GALERIA",
        "LTDA",
        "CLINICA",
        "ESCRITORIO",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect()
}

pub fn default_residential_terms() -> Vec<String> {
    ["APTO", "APARTAMENTO", "CASA", "BLOCO", "CONDOMINIO", "RESIDENCIAL", "TORRE"]
        .iter()
        .map(|t| t.to_string())
        .collect()
}
