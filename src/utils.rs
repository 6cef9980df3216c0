/// Formats an optional f64 to 4 decimal places, or returns "—" if None or non-finite.
pub fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.4}"),
        _ => "—".to_owned(),
    }
}

/// Same as [`fmt_opt`] for statistics that use NaN as "undefined".
pub fn fmt_stat(v: f64) -> String {
    fmt_opt(Some(v))
}

/// Pads `cells` into left-aligned columns separated by two spaces.
pub fn align_columns(rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = rows.iter().fold(Vec::new(), |mut widths, row| {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) if *w < len => *w = len,
                Some(_) => {}
                None => widths.push(len),
            }
        }
        widths
    });

    rows.iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(i, cell)| format!("{cell:<width$}", width = widths[i]))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
