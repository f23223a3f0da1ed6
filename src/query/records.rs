//! Bulk structure download requests.

use super::{Compression, DownloadFormat, IdDatabase, QueryError, id_elements};

/// Parameters of a bulk structure download.
///
/// Defaults follow the service: compound IDs, SDF, gzip, 2-D, one conformer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordsQuery {
    ids: Vec<u64>,
    database: IdDatabase,
    format: DownloadFormat,
    compression: Compression,
    use_3d: bool,
    n_conformers: u32,
}

impl RecordsQuery {
    /// Creates a download query for the given record identifiers.
    pub fn new(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
            database: IdDatabase::default(),
            format: DownloadFormat::default(),
            compression: Compression::default(),
            use_3d: false,
            n_conformers: 1,
        }
    }

    /// Sets whether the identifiers are CIDs or SIDs.
    #[must_use]
    pub fn database(mut self, database: IdDatabase) -> Self {
        self.database = database;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn format(mut self, format: DownloadFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the payload compression.
    #[must_use]
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Requests 3-D structures instead of 2-D.
    #[must_use]
    pub fn use_3d(mut self, use_3d: bool) -> Self {
        self.use_3d = use_3d;
        self
    }

    /// Sets the number of conformers per record (only used for 3-D).
    #[must_use]
    pub fn n_conformers(mut self, n_conformers: u32) -> Self {
        self.n_conformers = n_conformers;
        self
    }

    /// Returns the payload compression requested from the service.
    #[must_use]
    pub fn compression_mode(&self) -> Compression {
        self.compression
    }

    /// Returns the record identifiers.
    #[must_use]
    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    /// Checks the parameters without rendering.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::EmptyIds`] for an empty ID list and
    /// [`QueryError::InvalidConformers`] for a zero conformer count.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.ids.is_empty() {
            return Err(QueryError::EmptyIds { kind: "record ID" });
        }
        if self.n_conformers == 0 {
            return Err(QueryError::InvalidConformers);
        }
        Ok(())
    }

    /// Renders the `PCT-Download` request document.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`validate`](Self::validate).
    pub fn to_xml(&self) -> Result<String, QueryError> {
        self.validate()?;

        let database = self.database.pug_name();
        let uids = id_elements("PCT-ID-List_uids_E", &self.ids, "          ");
        let format = self.format.as_str();
        let compression = self.compression.as_str();
        let use_3d = if self.use_3d { "true" } else { "false" };
        let n_conformers = self.n_conformers;

        Ok(format!(
            r#"<PCT-Data>
 <PCT-Data_input>
  <PCT-InputData>
   <PCT-InputData_download>
    <PCT-Download>
     <PCT-Download_uids>
      <PCT-QueryUids>
       <PCT-QueryUids_ids>
        <PCT-ID-List>
         <PCT-ID-List_db>{database}</PCT-ID-List_db>
         <PCT-ID-List_uids>
{uids}         </PCT-ID-List_uids>
        </PCT-ID-List>
       </PCT-QueryUids_ids>
      </PCT-QueryUids>
     </PCT-Download_uids>
     <PCT-Download_format value="{format}"/>
     <PCT-Download_compression value="{compression}"/>
     <PCT-Download_use-3d value="{use_3d}"/>
     <PCT-Download_n-3d-conformers>{n_conformers}</PCT-Download_n-3d-conformers>
    </PCT-Download>
   </PCT-InputData_download>
  </PCT-InputData>
 </PCT-Data_input>
</PCT-Data>
"#
        ))
    }
}
