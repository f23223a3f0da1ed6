//! PUG request builders.
//!
//! This module renders typed parameters into the XML documents accepted by the
//! PubChem Power User Gateway. Rendering is pure: the same inputs always yield
//! byte-identical XML, and every parameter is validated before any document is
//! produced.
//!
//! # Example
//!
//! ```
//! use pubchem_pug::query::{Compression, DownloadFormat, RecordsQuery};
//!
//! let query = RecordsQuery::new([2244])
//!     .format(DownloadFormat::Smiles)
//!     .compression(Compression::Gzip);
//! let xml = query.to_xml().unwrap();
//! assert!(xml.contains(r#"<PCT-Download_format value="smiles"/>"#));
//! ```

mod assay;
mod error;
mod id_exchange;
mod params;
mod records;

pub use assay::{AssayDataQuery, assay_ids_path};
pub use error::QueryError;
pub use id_exchange::IdExchangeQuery;
pub use params::{
    AssayDataset, Compression, DownloadFormat, ExchangeOperation, ExchangeOutput, GroupBy,
    IdDatabase, StructureFormat,
};
pub use records::RecordsQuery;

/// Identifier prefixes that imply a registry source, checked in order.
const SOURCE_PREFIXES: &[(&str, &str)] = &[("CHEMBL", "ChEMBL"), ("ZINC", "ZINC")];

/// Guesses the registry source of an identifier from its prefix.
///
/// Returns `None` when the prefix is not recognized.
#[must_use]
pub fn guess_source(identifier: &str) -> Option<&'static str> {
    SOURCE_PREFIXES
        .iter()
        .find(|(prefix, _)| identifier.starts_with(prefix))
        .map(|(_, source)| *source)
}

/// Renders the status-check request for a submitted job.
#[must_use]
pub fn status_request(ticket: &str) -> String {
    request_document(ticket, "status")
}

/// Renders the cancel request for a submitted job.
#[must_use]
pub fn cancel_request(ticket: &str) -> String {
    request_document(ticket, "cancel")
}

fn request_document(ticket: &str, request_type: &str) -> String {
    let ticket = escape_xml(ticket);
    format!(
        r#"<PCT-Data>
 <PCT-Data_input>
  <PCT-InputData>
   <PCT-InputData_request>
    <PCT-Request>
     <PCT-Request_reqid>{ticket}</PCT-Request_reqid>
     <PCT-Request_type value="{request_type}"/>
    </PCT-Request>
   </PCT-InputData_request>
  </PCT-InputData>
 </PCT-Data_input>
</PCT-Data>
"#
    )
}

/// Escapes the characters that would break element text.
pub(crate) fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Renders one `<{element}>id</{element}>` line per identifier.
pub(crate) fn id_elements<I, T>(element: &str, ids: I, indent: &str) -> String
where
    I: IntoIterator<Item = T>,
    T: std::fmt::Display,
{
    ids.into_iter()
        .map(|id| {
            let id = escape_xml(&id.to_string());
            format!("{indent}<{element}>{id}</{element}>\n")
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_source_chembl() {
        assert_eq!(guess_source("CHEMBL25"), Some("ChEMBL"));
    }

    #[test]
    fn test_guess_source_zinc() {
        assert_eq!(guess_source("ZINC000000000053"), Some("ZINC"));
    }

    #[test]
    fn test_guess_source_unknown_prefix() {
        assert_eq!(guess_source("DB00945"), None);
        assert_eq!(guess_source("chembl25"), None);
        assert_eq!(guess_source(""), None);
    }

    #[test]
    fn test_status_request_carries_ticket_and_type() {
        let xml = status_request("402936103567975582");
        assert!(xml.contains("<PCT-Request_reqid>402936103567975582</PCT-Request_reqid>"));
        assert!(xml.contains(r#"<PCT-Request_type value="status"/>"#));
        assert!(!xml.contains("cancel"));
    }

    #[test]
    fn test_cancel_request_carries_ticket_and_type() {
        let xml = cancel_request("42");
        assert!(xml.contains("<PCT-Request_reqid>42</PCT-Request_reqid>"));
        assert!(xml.contains(r#"<PCT-Request_type value="cancel"/>"#));
    }

    #[test]
    fn test_escape_xml_special_characters() {
        assert_eq!(escape_xml("a&b<c>\"d"), "a&amp;b&lt;c&gt;&quot;d");
        assert_eq!(escape_xml("CHEMBL25"), "CHEMBL25");
    }

    #[test]
    fn test_id_elements_one_line_per_id() {
        let rendered = id_elements("X", [1, 2], "  ");
        assert_eq!(rendered, "  <X>1</X>\n  <X>2</X>\n");
    }
}
