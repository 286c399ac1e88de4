//! Extração de número da casa e nome da rua a partir de endereços livres

use std::cmp::Ordering;

use deunicode::deunicode;
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("regex de número válida"));

/// Normaliza um trecho de nome de rua
///
/// - Remove acentos (deunicode)
/// - Converte para maiúsculas
/// - Mantém apenas letras e dígitos
///
/// # Exemplos
///
/// ```
/// use casadinha::matching::normalize_street;
///
/// assert_eq!(normalize_street("Rua José de Alencar"), "RUAJOSEDEALENCAR");
/// assert_eq!(normalize_street("  Av. 13 de Maio "), "AV13DEMAIO");
/// ```
pub fn normalize_street(segment: &str) -> String {
    deunicode(segment)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Primeiro segmento (antes da primeira vírgula) normalizado
pub fn street_token(address: &str) -> String {
    let first = address.split(',').next().unwrap_or_default();
    normalize_street(first)
}

/// Número da casa de um endereço
///
/// Procura o primeiro grupo numérico no segundo segmento separado por vírgula;
/// se não houver, usa o primeiro grupo numérico do endereço inteiro.
/// Zeros à esquerda são descartados ("012" e "12" são o mesmo número).
///
/// # Exemplos
///
/// ```
/// use casadinha::matching::house_number;
///
/// assert_eq!(house_number("Rua 7 de Setembro, 1500, Centro").as_deref(), Some("1500"));
/// assert_eq!(house_number("Rua Sete 210").as_deref(), Some("210"));
/// assert_eq!(house_number("Travessa Sem Número"), None);
/// ```
pub fn house_number(address: &str) -> Option<String> {
    let from_second = address
        .split(',')
        .nth(1)
        .and_then(|segment| NUMBER_RE.find(segment));

    from_second
        .or_else(|| NUMBER_RE.find(address))
        .map(|m| strip_leading_zeros(m.as_str()))
}

fn strip_leading_zeros(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Chave de ordenação de uma parada: (número da casa, rua normalizada)
///
/// Números são comparados numericamente; endereços sem número vão para o fim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopKey {
    pub number: Option<String>,
    pub street: String,
}

impl StopKey {
    pub fn from_address(address: &str) -> Self {
        Self {
            number: house_number(address),
            street: street_token(address),
        }
    }

    /// Mesmo número de casa (endereços sem número nunca casam)
    pub fn same_number(&self, other: &StopKey) -> bool {
        matches!((&self.number, &other.number), (Some(a), Some(b)) if a == b)
    }

    /// Mesma rua normalizada (ruas vazias nunca casam)
    pub fn same_street(&self, other: &StopKey) -> bool {
        !self.street.is_empty() && self.street == other.street
    }
}

impl Ord for StopKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let number_order = match (&self.number, &other.number) {
            // Dígitos sem zeros à esquerda: mais curto é menor
            (Some(a), Some(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        number_order.then_with(|| self.street.cmp(&other.street))
    }
}

impl PartialOrd for StopKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_street() {
        assert_eq!(normalize_street("Rua Padre Cícero"), "RUAPADRECICERO");
        assert_eq!(normalize_street("Av. Santos Dumont"), "AVSANTOSDUMONT");
        assert_eq!(normalize_street("Rua São João - Bloco B"), "RUASAOJOAOBLOCOB");
        assert_eq!(normalize_street(""), "");
    }

    #[test]
    fn test_house_number_prefers_second_segment() {
        // "13" do nome da rua não pode vencer o número real
        assert_eq!(house_number("Av. 13 de Maio, 2081").as_deref(), Some("2081"));
        assert_eq!(house_number("Rua 25 de Março, apto 4").as_deref(), Some("4"));
    }

    #[test]
    fn test_house_number_fallbacks() {
        assert_eq!(house_number("Rua Tibúrcio Cavalcante 1200").as_deref(), Some("1200"));
        assert_eq!(house_number("Rua Sem Saída, S/N").as_deref(), None);
        assert_eq!(house_number("Rua X, 007").as_deref(), Some("7"));
        assert_eq!(house_number("Rua X, 000").as_deref(), Some("0"));
    }

    #[test]
    fn test_street_token() {
        assert_eq!(street_token("Rua Barão de Aracati, 900, Aldeota"), "RUABARAODEARACATI");
        assert_eq!(street_token("Sem vírgula 12"), "SEMVIRGULA12");
    }

    #[test]
    fn test_stop_key_numeric_ordering() {
        let nine = StopKey::from_address("Rua A, 9");
        let ten = StopKey::from_address("Rua A, 10");
        let no_number = StopKey::from_address("Rua A, S/N");

        assert!(nine < ten);
        assert!(ten < no_number);
    }

    #[test]
    fn test_stop_key_same_number() {
        let a = StopKey::from_address("Rua A, S/N");
        let b = StopKey::from_address("Rua A, S/N");
        assert!(!a.same_number(&b));
        assert!(a.same_street(&b));

        let c = StopKey::from_address("Rua A, 10");
        let d = StopKey::from_address("Rua B, 010");
        assert!(c.same_number(&d));
        assert!(!c.same_street(&d));
    }
}
