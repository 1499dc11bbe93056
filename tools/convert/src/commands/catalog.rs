//! `dpacct catalog`: list the registered variants.

use anyhow::Result;
use clap::Args;
use dpacct_event::{Registry, RegistryEntry};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_output, OutputFormat};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct CatalogCommand {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl CatalogCommand {
    pub fn run(self, ctx: &CommandContext) -> Result<()> {
        print_output(&catalog_rows(ctx.codec.registry()), self.format);
        Ok(())
    }
}

/// One registered variant.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct CatalogRow {
    #[tabled(rename = "Type tag")]
    type_tag: &'static str,

    #[tabled(rename = "Namespace")]
    namespace: &'static str,

    #[tabled(rename = "Fields", display = "display_fields")]
    fields: Vec<String>,
}

impl From<&RegistryEntry> for CatalogRow {
    fn from(entry: &RegistryEntry) -> Self {
        Self {
            type_tag: entry.type_tag(),
            namespace: entry.namespace(),
            fields: entry
                .fields()
                .iter()
                .map(|field| format!("{}: {}", field.name, field.kind))
                .collect(),
        }
    }
}

fn display_fields(fields: &[String]) -> String {
    if fields.is_empty() {
        "-".to_string()
    } else {
        fields.join(", ")
    }
}

pub fn catalog_rows(registry: &Registry) -> Vec<CatalogRow> {
    registry.entries().into_iter().map(CatalogRow::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_cover_catalog() {
        let rows = catalog_rows(&Registry::catalog());
        assert_eq!(rows.len(), 12);
        assert!(rows.iter().all(|row| row.namespace == "dp_accounting.dp_event"));
    }

    #[test]
    fn test_field_signature() {
        let rows = catalog_rows(&Registry::catalog());
        let sampled = rows
            .iter()
            .find(|row| row.type_tag == "SampledWithReplacementDpEvent")
            .unwrap();
        assert_eq!(
            display_fields(&sampled.fields),
            "source_dataset_size: int, sample_size: int, event: event"
        );

        let tree = rows
            .iter()
            .find(|row| row.type_tag == "SingleEpochTreeAggregationDpEvent")
            .unwrap();
        assert_eq!(
            tree.fields,
            vec!["noise_multiplier: float", "step_counts: int or int list"]
        );
    }

    #[test]
    fn test_no_fields_display_as_dash() {
        let rows = catalog_rows(&Registry::catalog());
        let no_op = rows.iter().find(|row| row.type_tag == "NoOpDpEvent").unwrap();
        assert_eq!(display_fields(&no_op.fields), "-");
    }

    #[test]
    fn test_json_rows() {
        let rows = catalog_rows(&Registry::catalog());
        let gaussian = rows.iter().find(|row| row.type_tag == "GaussianDpEvent").unwrap();
        assert_eq!(
            serde_json::to_value(gaussian).unwrap(),
            serde_json::json!({
                "type_tag": "GaussianDpEvent",
                "namespace": "dp_accounting.dp_event",
                "fields": ["noise_multiplier: float"],
            })
        );
    }
}
