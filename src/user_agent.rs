//! User-Agent string sent with every PUG and REST request.
//!
//! PubChem asks automated clients to identify themselves; one shared string
//! keeps PUG and REST traffic consistent.

/// Default User-Agent for PubChem requests (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("pubchem-pug/{version} (chemistry-data-tool)")
}
