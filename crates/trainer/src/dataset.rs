//! Training CSV loading and preprocessing
//!
//! Reads a headered CSV, restricts it to the 14 canonical feature columns
//! plus the sale price, drops rows with missing values among them, and
//! encodes the categorical columns exactly the way the server does at
//! request time. Any structural problem is fatal with a line-numbered
//! diagnostic; there is no partial or recoverable state.

use std::path::Path;

use ames_model::encode::{encode_ordinal, NeighborhoodVocab};
use ames_model::schema::{FeatureKind, FEATURE_SLOTS, TARGET_COLUMN};
use anyhow::{anyhow, bail, Context, Result};

/// Encoded training dataset
#[derive(Clone, Debug)]
pub struct Dataset {
    /// Rows in canonical 14-slot order
    pub features: Vec<Vec<f64>>,
    /// Sale prices
    pub targets: Vec<f64>,
    /// Neighborhood vocabulary observed in this dataset
    pub vocab: NeighborhoodVocab,
}

impl Dataset {
    /// Load and encode a dataset from a CSV file.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("failed to read {}", path.as_ref().display()))?;
        Self::from_csv_str(&content)
    }

    /// Parse CSV content; split out for testing.
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (_, header) = lines.next().ok_or_else(|| anyhow!("dataset is empty"))?;
        let columns: Vec<&str> = header.split(',').map(str::trim).collect();

        let column_index = |label: &str| -> Result<usize> {
            columns
                .iter()
                .position(|&column| column == label)
                .ok_or_else(|| anyhow!("column {:?} not found in header", label))
        };

        let slot_indices: Vec<usize> = FEATURE_SLOTS
            .iter()
            .map(|slot| column_index(slot.column_label))
            .collect::<Result<_>>()?;
        let target_index = column_index(TARGET_COLUMN)?;

        // First pass: keep complete rows as raw cells so the neighborhood
        // vocabulary can be built before anything is encoded.
        let mut kept: Vec<(usize, Vec<String>)> = Vec::new();

        for (line_no, line) in lines {
            let cells: Vec<&str> = line.split(',').map(str::trim).collect();
            if cells.len() != columns.len() {
                bail!(
                    "line {line_no}: expected {} columns, got {}",
                    columns.len(),
                    cells.len()
                );
            }

            let selected: Vec<String> = slot_indices
                .iter()
                .chain(std::iter::once(&target_index))
                .map(|&idx| cells[idx].to_string())
                .collect();

            if selected.iter().any(|cell| cell.is_empty() || cell == "NA") {
                continue;
            }

            kept.push((line_no, selected));
        }

        if kept.is_empty() {
            bail!("dataset has no complete rows");
        }

        let neighborhood_slot = FEATURE_SLOTS
            .iter()
            .position(|slot| slot.kind == FeatureKind::Neighborhood)
            .ok_or_else(|| anyhow!("schema has no neighborhood slot"))?;

        let vocab = NeighborhoodVocab::from_labels(
            kept.iter().map(|(_, cells)| cells[neighborhood_slot].clone()),
        );

        // Second pass: encode into the canonical vector layout.
        let mut features = Vec::with_capacity(kept.len());
        let mut targets = Vec::with_capacity(kept.len());

        for (line_no, cells) in &kept {
            let mut row = Vec::with_capacity(FEATURE_SLOTS.len());

            for (slot, cell) in FEATURE_SLOTS.iter().zip(cells) {
                let encoded = match slot.kind {
                    FeatureKind::Quality => encode_ordinal(slot.column_label, cell)
                        .map_err(|err| anyhow!("line {line_no}: {err}"))?,
                    FeatureKind::Neighborhood => vocab.encode(cell) as f64,
                    FeatureKind::Numeric => cell.parse::<f64>().with_context(|| {
                        format!(
                            "line {line_no}, column {:?}: invalid number {cell:?}",
                            slot.column_label
                        )
                    })?,
                };
                row.push(encoded);
            }

            let target = cells[FEATURE_SLOTS.len()].parse::<f64>().with_context(|| {
                format!("line {line_no}, column {TARGET_COLUMN:?}: invalid number")
            })?;

            features.push(row);
            targets.push(target);
        }

        Ok(Self {
            features,
            targets,
            vocab,
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Order,Overall Qual,Gr Liv Area,Garage Cars,Total Bsmt SF,Full Bath,\
Year Built,Year Remod/Add,Lot Area,Neighborhood,Exter Qual,Bsmt Qual,Kitchen Qual,\
Fireplaces,Garage Area,SalePrice";

    fn sample_csv() -> String {
        format!(
            "{HEADER}\n\
             1,7,1500,2,900,2,2005,2006,8500,CollgCr,Gd,TA,Gd,1,400,210000\n\
             2,5,1000,1,600,1,1960,1960,7000,NAmes,TA,TA,TA,0,250,120000\n\
             3,8,2100,3,1200,2,2010,2010,9500,StoneBr,Ex,Gd,Ex,2,720,340000\n"
        )
    }

    #[test]
    fn test_load_and_encode() {
        let dataset = Dataset::from_csv_str(&sample_csv()).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.targets, vec![210_000.0, 120_000.0, 340_000.0]);

        // Sorted labels: CollgCr=0, NAmes=1, StoneBr=2
        assert_eq!(dataset.vocab.encode("CollgCr"), 0);
        assert_eq!(dataset.vocab.encode("NAmes"), 1);
        assert_eq!(dataset.vocab.encode("StoneBr"), 2);

        // First row, canonical order
        assert_eq!(
            dataset.features[0],
            vec![7.0, 1500.0, 2.0, 900.0, 2.0, 2005.0, 2006.0, 8500.0, 0.0, 4.0, 3.0, 4.0, 1.0, 400.0]
        );
    }

    #[test]
    fn test_rows_with_missing_values_are_dropped() {
        let csv = format!(
            "{HEADER}\n\
             1,7,1500,2,900,2,2005,2006,8500,CollgCr,Gd,TA,Gd,1,400,210000\n\
             2,5,1000,1,NA,1,1960,1960,7000,NAmes,TA,TA,TA,0,250,120000\n\
             3,8,2100,3,1200,2,2010,2010,9500,StoneBr,Ex,,Ex,2,720,340000\n"
        );

        let dataset = Dataset::from_csv_str(&csv).unwrap();
        assert_eq!(dataset.len(), 1);
        // Dropped rows do not contribute to the vocabulary either.
        assert_eq!(dataset.vocab.len(), 1);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let csv = "Order,Overall Qual,SalePrice\n1,7,210000\n";
        let err = Dataset::from_csv_str(csv).unwrap_err();
        assert!(err.to_string().contains("Gr Liv Area"));
    }

    #[test]
    fn test_bad_quality_symbol_is_fatal() {
        let csv = format!(
            "{HEADER}\n\
             1,7,1500,2,900,2,2005,2006,8500,CollgCr,Great,TA,Gd,1,400,210000\n"
        );

        let err = Dataset::from_csv_str(&csv).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 2"));
        assert!(message.contains("Great"));
    }

    #[test]
    fn test_bad_number_is_fatal() {
        let csv = format!(
            "{HEADER}\n\
             1,7,wide,2,900,2,2005,2006,8500,CollgCr,Gd,TA,Gd,1,400,210000\n"
        );

        let err = Dataset::from_csv_str(&csv).unwrap_err();
        assert!(format!("{err:?}").contains("Gr Liv Area"));
    }

    #[test]
    fn test_ragged_row_is_fatal() {
        let csv = format!("{HEADER}\n1,7,1500\n");
        let err = Dataset::from_csv_str(&csv).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_empty_dataset_is_fatal() {
        assert!(Dataset::from_csv_str("").is_err());
        assert!(Dataset::from_csv_str(HEADER).is_err());
    }
}
