//! Static report catalog: report type to decode strategy mapping
//!
//! Each report type resolves to a [`ReportSpec`] carrying the document format
//! and schema hints. The mapping is static data, not runtime type inspection;
//! custom report types can be registered alongside the built-ins.

use crate::decode::DocumentFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default cursor field stamped onto records in incremental mode
pub const DEFAULT_CURSOR_FIELD: &str = "dataEndTime";

/// Decode strategy and schema hints for one report type
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportSpec {
    /// Platform report type identifier
    pub report_type: String,

    /// Document wire format
    pub format: DocumentFormat,

    /// Record attribute used to track incremental progress
    pub cursor_field: String,

    /// Record fields holding dates that may arrive in non-ISO formats and
    /// must be normalized before emission
    #[serde(default)]
    pub date_fields: Vec<String>,
}

impl ReportSpec {
    /// Create a spec with the default cursor field and no date fields
    pub fn new(report_type: impl Into<String>, format: DocumentFormat) -> Self {
        Self {
            report_type: report_type.into(),
            format,
            cursor_field: DEFAULT_CURSOR_FIELD.to_string(),
            date_fields: Vec::new(),
        }
    }

    /// Override the date fields to normalize
    pub fn with_date_fields(mut self, fields: &[&str]) -> Self {
        self.date_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Override the cursor field
    pub fn with_cursor_field(mut self, field: impl Into<String>) -> Self {
        self.cursor_field = field.into();
        self
    }
}

/// Registry of known report types
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    specs: BTreeMap<String, ReportSpec>,
}

impl Catalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-populated with representative built-in report types
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for spec in [
            ReportSpec::new("GET_FLAT_FILE_ACTIONABLE_ORDER_DATA_SHIPPING", DocumentFormat::tsv()),
            ReportSpec::new(
                "GET_ORDER_REPORT_DATA_SHIPPING",
                DocumentFormat::Xml {
                    record_element: "Message".into(),
                },
            ),
            ReportSpec::new("GET_AMAZON_FULFILLED_SHIPMENTS_DATA_GENERAL", DocumentFormat::tsv()),
            ReportSpec::new("GET_SELLER_FEEDBACK_DATA", DocumentFormat::tsv())
                .with_date_fields(&["date"]),
            ReportSpec::new("GET_LEDGER_DETAIL_VIEW_DATA", DocumentFormat::tsv())
                .with_date_fields(&["Date"]),
            ReportSpec::new("GET_LEDGER_SUMMARY_VIEW_DATA", DocumentFormat::tsv())
                .with_date_fields(&["Date"]),
            ReportSpec::new("GET_FBA_FULFILLMENT_CUSTOMER_RETURNS_DATA", DocumentFormat::tsv()),
            ReportSpec::new("GET_FLAT_FILE_RETURNS_DATA_BY_RETURN_DATE", DocumentFormat::tsv()),
            ReportSpec::new("GET_MERCHANT_CANCELLED_LISTINGS_DATA", DocumentFormat::tsv()),
            ReportSpec::new("GET_STRANDED_INVENTORY_UI_DATA", DocumentFormat::tsv()),
            ReportSpec::new("GET_VENDOR_FORECASTING_REPORT", DocumentFormat::Json),
        ] {
            catalog.register(spec);
        }
        catalog
    }

    /// Register (or replace) a report spec
    pub fn register(&mut self, spec: ReportSpec) {
        self.specs.insert(spec.report_type.clone(), spec);
    }

    /// Look up the spec for a report type
    pub fn get(&self, report_type: &str) -> Option<&ReportSpec> {
        self.specs.get(report_type)
    }

    /// Iterate over all registered report types
    pub fn report_types(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }
}
