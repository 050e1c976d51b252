//! Price formatting for the public menu (Brazilian real).

/// Round a price to whole cents
pub fn to_cents(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

/// Format a price as `R$ 1.234,56`.
///
/// Negative values get a leading minus: `-R$ 5,00`.
pub fn format_brl(value: f64) -> String {
    if !value.is_finite() {
        return "R$ --".to_string();
    }
    let cents = to_cents(value);
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let reais = cents / 100;
    let frac = cents % 100;

    let digits = reais.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}R$ {grouped},{frac:02}")
}
