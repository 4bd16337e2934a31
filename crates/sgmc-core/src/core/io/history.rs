use super::IoError;
use std::collections::BTreeMap;
use std::io::Write;

/// Writes the per-sweep run histories as one CSV table.
///
/// Columns: `sweep`, `energy`, `acceptance`, then one `occ_<class>` column per
/// connectivity class in ascending class order. All histories must share the
/// same length (one row per sweep).
pub fn write_history<W: Write>(
    writer: W,
    energies: &[f64],
    acceptance: &[f64],
    coverage: &BTreeMap<u32, Vec<usize>>,
) -> Result<(), IoError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["sweep".to_string(), "energy".to_string(), "acceptance".to_string()];
    header.extend(coverage.keys().map(|class| format!("occ_{class}")));
    csv_writer.write_record(&header)?;

    for sweep in 0..energies.len() {
        let mut record = vec![
            sweep.to_string(),
            format!("{:.10}", energies[sweep]),
            format!("{:.6}", acceptance[sweep]),
        ];
        for counts in coverage.values() {
            record.push(counts.get(sweep).copied().unwrap_or(0).to_string());
        }
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_row_per_sweep_with_class_columns() {
        let mut coverage = BTreeMap::new();
        coverage.insert(1, vec![2, 3]);
        coverage.insert(4, vec![0, 1]);

        let mut buffer = Vec::new();
        write_history(&mut buffer, &[-1.0, -2.5], &[0.5, 0.25], &coverage).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "sweep,energy,acceptance,occ_1,occ_4");
        assert!(lines[1].starts_with("0,-1.0000000000,0.500000,2,0"));
        assert!(lines[2].starts_with("1,-2.5000000000,0.250000,3,1"));
    }
}
