//! Fault code listing.

use serde::Serialize;
use sts_core::FaultTable;
use tabled::Tabled;

use crate::config::OutputFormat;
use crate::output::output;

/// One row of the fault table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct FaultRow {
    /// Fault key.
    #[tabled(rename = "Key")]
    pub key: String,
    /// Prefixed fault code.
    #[tabled(rename = "Code")]
    pub code: String,
    /// Namespace URI of the code.
    #[tabled(rename = "Namespace")]
    pub namespace: String,
    /// Canned description.
    #[tabled(rename = "Description")]
    pub description: String,
}

/// Rows for every fault key, in table order.
#[must_use]
pub fn fault_rows(table: &FaultTable) -> Vec<FaultRow> {
    table
        .iter()
        .map(|(key, code)| FaultRow {
            key: format!("{key:?}"),
            code: code.prefixed_name(),
            namespace: code.namespace.uri().to_string(),
            description: code.description.to_string(),
        })
        .collect()
}

/// Runs `faults`.
pub fn run_faults(format: OutputFormat) -> crate::CliResult<()> {
    output(&fault_rows(FaultTable::standard()), format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::render_table;
    use sts_core::FaultKey;

    #[test]
    fn one_row_per_key() {
        let rows = fault_rows(FaultTable::standard());
        assert_eq!(rows.len(), FaultKey::ALL.len());
        assert_eq!(rows[0].key, "WsseFailedAuthentication");

        let renew = rows.iter().find(|row| row.key == "WstUnableToRenew").unwrap();
        assert_eq!(renew.code, "wst:UnableToRenew");
        assert_eq!(
            renew.namespace,
            "http://docs.oasis-open.org/ws-sx/ws-trust/200512"
        );
    }

    #[test]
    fn renders_table_and_json() {
        let rows = fault_rows(FaultTable::standard());
        let table = render_table(&rows);
        assert!(table.contains("wsse:FailedCheck"));
        assert!(table.contains("Description"));

        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json[0]["code"], "wsse:FailedAuthentication");
    }
}
