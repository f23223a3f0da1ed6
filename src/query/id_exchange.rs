//! Identifier exchange requests.

use std::collections::HashSet;

use super::{
    ExchangeOperation, ExchangeOutput, QueryError, escape_xml, guess_source, id_elements,
};

/// A validated identifier exchange query.
///
/// Construction checks that the source IDs are non-empty and unique and
/// resolves the source registry, so a value of this type always renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdExchangeQuery {
    ids: Vec<String>,
    source: String,
    operation: ExchangeOperation,
    output: ExchangeOutput,
}

impl IdExchangeQuery {
    /// Creates an exchange query.
    ///
    /// When `source` is `None` it is inferred from the first identifier via
    /// [`guess_source`].
    ///
    /// # Errors
    ///
    /// - [`QueryError::EmptyIds`] when `ids` is empty
    /// - [`QueryError::DuplicateSourceId`] when an identifier repeats
    /// - [`QueryError::UnknownSource`] when the source cannot be inferred
    pub fn new<I, S>(
        ids: I,
        source: Option<&str>,
        operation: ExchangeOperation,
        output: ExchangeOutput,
    ) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let Some(first) = ids.first() else {
            return Err(QueryError::EmptyIds { kind: "source ID" });
        };

        let mut seen = HashSet::with_capacity(ids.len());
        for id in &ids {
            if !seen.insert(id.as_str()) {
                return Err(QueryError::DuplicateSourceId { id: id.clone() });
            }
        }

        let source = match source {
            Some(source) => source.to_string(),
            None => guess_source(first)
                .ok_or_else(|| QueryError::UnknownSource { id: first.clone() })?
                .to_string(),
        };

        Ok(Self {
            ids,
            source,
            operation,
            output,
        })
    }

    /// Returns the source identifiers in input order.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Returns the resolved source registry name.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the requested output identifier type.
    #[must_use]
    pub fn output(&self) -> ExchangeOutput {
        self.output
    }

    /// Renders the `PCT-QueryIDExchange` request document.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let source = escape_xml(&self.source);
        let source_ids = id_elements(
            "PCT-RegistryIDs_source-ids_E",
            &self.ids,
            "                            ",
        );
        let operation = self.operation.as_str();
        let output = self.output.as_str();

        format!(
            r#"<PCT-Data>
  <PCT-Data_input>
    <PCT-InputData>
      <PCT-InputData_query>
        <PCT-Query>
          <PCT-Query_type>
            <PCT-QueryType>
              <PCT-QueryType_id-exchange>
                <PCT-QueryIDExchange>
                  <PCT-QueryIDExchange_input>
                    <PCT-QueryUids>
                      <PCT-QueryUids_source-ids>
                        <PCT-RegistryIDs>
                          <PCT-RegistryIDs_source-name>{source}</PCT-RegistryIDs_source-name>
                          <PCT-RegistryIDs_source-ids>
{source_ids}                          </PCT-RegistryIDs_source-ids>
                        </PCT-RegistryIDs>
                      </PCT-QueryUids_source-ids>
                    </PCT-QueryUids>
                  </PCT-QueryIDExchange_input>
                  <PCT-QueryIDExchange_operation-type value="{operation}"/>
                  <PCT-QueryIDExchange_output-type value="{output}"/>
                  <PCT-QueryIDExchange_output-method value="file-pair"/>
                  <PCT-QueryIDExchange_compression value="gzip"/>
                </PCT-QueryIDExchange>
              </PCT-QueryType_id-exchange>
            </PCT-QueryType>
          </PCT-Query_type>
        </PCT-Query>
      </PCT-InputData_query>
    </PCT-InputData>
  </PCT-Data_input>
</PCT-Data>
"#
        )
    }
}
