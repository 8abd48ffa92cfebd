use super::signal::Signal;
use crate::error::{EqError, Result};

/// Parse a two-column `time,amplitude` table.
///
/// The first line is a header and is skipped whatever it says; columns are
/// bound positionally and may be double-quoted. The sample rate is inferred from the row count and
/// the time span, never read from the table.
pub fn parse_table(text: &str) -> Result<Signal> {
    let mut time = Vec::new();
    let mut amp = Vec::new();

    for (idx, line) in text.lines().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = idx + 1;

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 2 {
            return Err(EqError::Table {
                line: line_no,
                message: format!("expected 2 columns, found {}", fields.len()),
            });
        }

        time.push(parse_field(fields[0], line_no)?);
        amp.push(parse_field(fields[1], line_no)?);
    }

    let sample_rate = infer_sample_rate(&time)?;

    log::info!(
        "Parsed table: {} rows, inferred {}Hz",
        time.len(),
        sample_rate
    );

    Ok(Signal {
        time,
        samples: amp,
        sample_rate,
    })
}

/// `round(rows / (time[last] - time[0]))`.
pub fn infer_sample_rate(time: &[f64]) -> Result<u32> {
    let rows = time.len();
    if rows < 2 {
        return Err(EqError::DegenerateTimeSpan { rows, span: 0.0 });
    }

    let span = time[rows - 1] - time[0];
    if !span.is_finite() || span <= 0.0 {
        return Err(EqError::DegenerateTimeSpan { rows, span });
    }

    let rate = (rows as f64 / span).round();
    if rate < 1.0 || rate > u32::MAX as f64 {
        return Err(EqError::DegenerateTimeSpan { rows, span });
    }
    Ok(rate as u32)
}

/// Numeric cell, optionally wrapped in double quotes. NaN and infinities
/// are rejected since one of them poisons every bin of the transform.
fn parse_field(field: &str, line: usize) -> Result<f64> {
    let unquoted = field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .map_or(field, str::trim);
    let value = unquoted.parse::<f64>().map_err(|_| EqError::Table {
        line,
        message: format!("'{}' is not a number", field),
    })?;
    if !value.is_finite() {
        return Err(EqError::Table {
            line,
            message: format!("'{}' is not a finite number", field),
        });
    }
    Ok(value)
}
