//! Utility functions and helpers

/// Format a token amount for display
pub fn format_amount(value: f64) -> String {
    format!("{:.6}", value)
}

/// Format a percentage for display
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
