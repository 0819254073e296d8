pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

pub fn std_dev(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;
    Some(variance.sqrt())
}

/// Seconds for display, two decimal places: "9.87s"
pub fn format_secs(secs: f64) -> String {
    format!("{:.2}s", secs)
}

/// Signed seconds for display: "+1.50s" / "-0.42s"
pub fn format_signed_secs(secs: f64) -> String {
    format!("{:+.2}s", secs)
}
