//! Funções de normalização de texto para romaneios
//!
//! Endereços, códigos de gaiola e cabeçalhos chegam da planilha com acentos,
//! hífens e espaços inconsistentes. Todas as comparações passam por aqui.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Remove acentos e converte para maiúsculas
///
/// # Exemplos
/// ```
/// use waze_humano::utils::normalization::remove_accents;
///
/// assert_eq!(remove_accents("Farmácia São João"), "FARMACIA SAO JOAO");
/// assert_eq!(remove_accents("açaí"), "ACAI");
/// ```
pub fn remove_accents(input: &str) -> String {
    input
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_uppercase()
}

/// Mantém apenas letras e dígitos, sem acentos, em maiúsculas
///
/// É a forma canônica de códigos de gaiola e chaves de parada.
///
/// # Exemplos
/// ```
/// use waze_humano::utils::normalization::clean_string;
///
/// assert_eq!(clean_string("b-50"), "B50");
/// assert_eq!(clean_string(" Rua José, 12 "), "RUAJOSE12");
/// ```
pub fn clean_string(input: &str) -> String {
    remove_accents(input)
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Remove acentos, converte para lowercase, remove pontuação e espaços extras
///
/// # Exemplos
/// ```
/// use waze_humano::utils::normalization::normalize_string;
///
/// assert_eq!(normalize_string("  Endereço   de Entrega "), "endereco de entrega");
/// assert_eq!(normalize_string("Edson Queiroz!"), "edson queiroz");
/// ```
pub fn normalize_string(input: &str) -> String {
    input
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Mesmo nome depois de `normalize_string` (acentos, caixa e pontuação ignorados)
///
/// # Exemplos
/// ```
/// use waze_humano::utils::normalization::same_name;
///
/// assert!(same_name("Conjunto Ceará I", "CONJUNTO CEARA I"));
/// assert!(!same_name("Conjunto Ceará I", "Conjunto Ceará II"));
/// ```
pub fn same_name(a: &str, b: &str) -> bool {
    let a = normalize_string(a);
    !a.is_empty() && a == normalize_string(b)
}

/// Nomes parecidos palavra a palavra (ex: bairros com erro de digitação)
///
/// Exige o mesmo número de palavras e similaridade Jaro-Winkler de cada par
/// acima do threshold. Um nome nunca "contém" outro: "Centro" não casa com
/// "Centro Industrial".
///
/// # Exemplos
/// ```
/// use waze_humano::utils::normalization::is_similar;
///
/// assert!(is_similar("Edson Queiroz", "EDSON QUEIRÓZ", 0.9));
/// assert!(is_similar("Meireles", "Meirelles", 0.9));
/// assert!(!is_similar("Conjunto Ceará I", "Conjunto Ceará II", 0.9));
/// assert!(!is_similar("Centro", "Centro Industrial", 0.9));
/// ```
pub fn is_similar(a: &str, b: &str, threshold: f64) -> bool {
    let a = normalize_string(a);
    let b = normalize_string(b);

    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }

    let words_a: Vec<&str> = a.split(' ').collect();
    let words_b: Vec<&str> = b.split(' ').collect();
    if words_a.len() != words_b.len() {
        return false;
    }

    words_a
        .iter()
        .zip(&words_b)
        .all(|(x, y)| x == y || strsim::jaro_winkler(x, y) >= threshold)
}
