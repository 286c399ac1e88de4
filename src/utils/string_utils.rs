/// Utilitários de texto para a saída tabular do terminal

/// Trunca por caracteres (não bytes), adicionando "…" quando corta
///
/// # Exemplo
/// ```
/// use waze_humano::utils::string_utils::truncate_chars;
///
/// assert_eq!(truncate_chars("Rua Barão de Studart, 1200", 12), "Rua Barão d…");
/// assert_eq!(truncate_chars("Rua A", 12), "Rua A");
/// ```
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// Completa com espaços à direita até `width` caracteres
pub fn pad_right(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - len))
    }
}

/// Célula pronta para uma coluna de largura fixa
pub fn fit_cell(s: &str, width: usize) -> String {
    pad_right(&truncate_chars(s, width), width)
}
