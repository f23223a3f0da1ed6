//! Bioassay requests: ID listing paths and data-table export queries.

use super::{AssayDataset, Compression, GroupBy, IdDatabase, QueryError, id_elements};

/// Builds the REST path listing the records tested in an assay.
///
/// The path is relative to the REST base URL. When `activity_outcome` is given
/// (e.g. `"active"`), it is lowercased and appended as a `{cids|sids}_type`
/// modifier.
#[must_use]
pub fn assay_ids_path(aid: u64, database: IdDatabase, activity_outcome: Option<&str>) -> String {
    let list = format!("{}s", database.id_name());
    let mut path = format!("assay/aid/{aid}/{list}/txt");
    if let Some(outcome) = activity_outcome {
        let outcome = urlencoding::encode(&outcome.trim().to_ascii_lowercase()).into_owned();
        path.push_str(&format!("?{list}_type={outcome}"));
    }
    path
}

/// Parameters of a bioassay data-table export (CSV).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssayDataQuery {
    aids: Vec<u64>,
    group_by: GroupBy,
    dataset: AssayDataset,
    compression: Compression,
}

impl AssayDataQuery {
    /// Creates an export query for one or more assays.
    pub fn new(aids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            aids: aids.into_iter().collect(),
            group_by: GroupBy::default(),
            dataset: AssayDataset::default(),
            compression: Compression::default(),
        }
    }

    /// Sets how result rows are grouped.
    #[must_use]
    pub fn group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }

    /// Selects the concise or complete data table.
    #[must_use]
    pub fn dataset(mut self, dataset: AssayDataset) -> Self {
        self.dataset = dataset;
        self
    }

    /// Sets the payload compression.
    #[must_use]
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Returns the payload compression requested from the service.
    #[must_use]
    pub fn compression_mode(&self) -> Compression {
        self.compression
    }

    /// Renders the `PCT-QueryAssayData` request document.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::EmptyIds`] when no assay ID was given.
    pub fn to_xml(&self) -> Result<String, QueryError> {
        if self.aids.is_empty() {
            return Err(QueryError::EmptyIds { kind: "assay ID" });
        }

        let aids = id_elements("PCT-ID-List_uids_E", &self.aids, "                    ");
        let dataset = self.dataset.as_str();
        let dataset_value = self.dataset.schema_value();
        let group_by = self.group_by.as_str();
        let group_by_value = self.group_by.schema_value();
        let compression = self.compression.as_str();

        Ok(format!(
            r#"<PCT-Data>
  <PCT-Data_input>
    <PCT-InputData>
      <PCT-InputData_query>
        <PCT-Query>
          <PCT-Query_type>
            <PCT-QueryType>
              <PCT-QueryType_bas>
                <PCT-QueryAssayData>
                  <PCT-QueryAssayData_output value="csv">4</PCT-QueryAssayData_output>
                  <PCT-QueryAssayData_aids>
                    <PCT-QueryUids>
                      <PCT-QueryUids_ids>
                        <PCT-ID-List>
                          <PCT-ID-List_db>pcassay</PCT-ID-List_db>
                          <PCT-ID-List_uids>
{aids}                          </PCT-ID-List_uids>
                        </PCT-ID-List>
                      </PCT-QueryUids_ids>
                    </PCT-QueryUids>
                  </PCT-QueryAssayData_aids>
                  <PCT-QueryAssayData_dataset value="{dataset}">{dataset_value}</PCT-QueryAssayData_dataset>
                  <PCT-QueryAssayData_focus>
                    <PCT-Assay-FocusOption>
                      <PCT-Assay-FocusOption_group-results-by value="{group_by}">{group_by_value}</PCT-Assay-FocusOption_group-results-by>
                    </PCT-Assay-FocusOption>
                  </PCT-QueryAssayData_focus>
                  <PCT-QueryAssayData_compression value="{compression}"/>
                </PCT-QueryAssayData>
              </PCT-QueryType_bas>
            </PCT-QueryType>
          </PCT-Query_type>
        </PCT-Query>
      </PCT-InputData_query>
    </PCT-InputData>
  </PCT-Data_input>
</PCT-Data>
"#
        ))
    }
}
