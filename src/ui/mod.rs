pub mod interactive;
pub mod panels;
pub mod plot;
pub mod tables;

/// Compact dollar amount for cards and labels: `$1.23B`, `$45.6M`, `$980K`.
pub fn fmt_money(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let a = amount.abs();
    if a >= 1e9 {
        format!("{sign}${:.2}B", a / 1e9)
    } else if a >= 1e6 {
        format!("{sign}${:.1}M", a / 1e6)
    } else if a >= 1e3 {
        format!("{sign}${:.0}K", a / 1e3)
    } else {
        format!("{sign}${a:.0}")
    }
}

pub fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "–".to_string(),
    }
}
