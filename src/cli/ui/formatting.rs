use chrono::NaiveDate;
use rust_decimal::Decimal;

const MONTHS_ES: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];
const MONTHS_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Short month names for the configured locale, January first.
pub fn month_labels(locale: &str) -> [&'static str; 12] {
    if locale.to_ascii_lowercase().starts_with("es") {
        MONTHS_ES
    } else {
        MONTHS_EN
    }
}

pub fn format_amount(amount: Decimal, currency: &str) -> String {
    format!("{} {:.2}", currency, amount)
}

/// Day-first dates for Spanish locales, ISO otherwise.
pub fn format_date(date: NaiveDate, locale: &str) -> String {
    if locale.to_ascii_lowercase().starts_with("es") {
        date.format("%d/%m/%Y").to_string()
    } else {
        date.format("%Y-%m-%d").to_string()
    }
}
