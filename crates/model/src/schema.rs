//! Canonical feature schema
//!
//! The model consumes exactly 14 features in a fixed order. The order here
//! is the order of the training CSV columns selected by the trainer, the
//! order of the `feature_names` list embedded in the artifact, and the slot
//! order of every encoded vector. Changing it invalidates every persisted
//! artifact.

/// Semantic type of a feature slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Plain numeric input, passed through unchanged
    Numeric,
    /// Ordinal quality grade on the closed Ex/Gd/TA/Fa/Po alphabet
    Quality,
    /// Nominal neighborhood label, encoded through the trained vocabulary
    Neighborhood,
}

/// One slot of the canonical feature vector
#[derive(Debug, Clone, Copy)]
pub struct FeatureSlot {
    /// Key used in prediction request bodies (camelCase)
    pub request_key: &'static str,
    /// Column label in the training CSV and the artifact feature list
    pub column_label: &'static str,
    pub kind: FeatureKind,
}

/// Number of features the model consumes
pub const FEATURE_COUNT: usize = 14;

/// Target column label in the training CSV
pub const TARGET_COLUMN: &str = "SalePrice";

/// The canonical ordered feature schema
pub const FEATURE_SLOTS: [FeatureSlot; FEATURE_COUNT] = [
    FeatureSlot {
        request_key: "overallQual",
        column_label: "Overall Qual",
        kind: FeatureKind::Numeric,
    },
    FeatureSlot {
        request_key: "grLivArea",
        column_label: "Gr Liv Area",
        kind: FeatureKind::Numeric,
    },
    FeatureSlot {
        request_key: "garageCars",
        column_label: "Garage Cars",
        kind: FeatureKind::Numeric,
    },
    FeatureSlot {
        request_key: "totalBsmtSF",
        column_label: "Total Bsmt SF",
        kind: FeatureKind::Numeric,
    },
    FeatureSlot {
        request_key: "fullBath",
        column_label: "Full Bath",
        kind: FeatureKind::Numeric,
    },
    FeatureSlot {
        request_key: "yearBuilt",
        column_label: "Year Built",
        kind: FeatureKind::Numeric,
    },
    FeatureSlot {
        request_key: "yearRemodAdd",
        column_label: "Year Remod/Add",
        kind: FeatureKind::Numeric,
    },
    FeatureSlot {
        request_key: "lotArea",
        column_label: "Lot Area",
        kind: FeatureKind::Numeric,
    },
    FeatureSlot {
        request_key: "neighborhood",
        column_label: "Neighborhood",
        kind: FeatureKind::Neighborhood,
    },
    FeatureSlot {
        request_key: "exterQual",
        column_label: "Exter Qual",
        kind: FeatureKind::Quality,
    },
    FeatureSlot {
        request_key: "bsmtQual",
        column_label: "Bsmt Qual",
        kind: FeatureKind::Quality,
    },
    FeatureSlot {
        request_key: "kitchenQual",
        column_label: "Kitchen Qual",
        kind: FeatureKind::Quality,
    },
    FeatureSlot {
        request_key: "fireplaces",
        column_label: "Fireplaces",
        kind: FeatureKind::Numeric,
    },
    FeatureSlot {
        request_key: "garageArea",
        column_label: "Garage Area",
        kind: FeatureKind::Numeric,
    },
];

/// Canonical column labels in slot order
pub fn feature_labels() -> Vec<String> {
    FEATURE_SLOTS
        .iter()
        .map(|slot| slot.column_label.to_string())
        .collect()
}
