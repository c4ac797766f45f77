//! Code Component Model
//!
//! Wire-faithful representation of the backend's analysis output: every
//! discovered unit of source code (class, function, method) with its
//! metadata and, once generation finishes, the structured documentation
//! payload. Field names follow the backend's snake_case JSON contract.

use serde::{Deserialize, Serialize};

/// One discovered unit of source code.
///
/// Components are immutable once received; if the backend resends an id the
/// stored component is updated field-by-field (see
/// [`JobStatusSnapshot::apply`](crate::types::snapshot::JobStatusSnapshot::apply)).
/// Classes carry their methods in `method_components`; nesting depth is
/// bounded by source nesting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeComponent {
    /// Fully-qualified dotted name, globally unique within a task's result set
    pub id: String,
    pub component_type: ComponentType,
    /// Source file path relative to the analyzed repository root
    pub relative_path: String,
    /// 1-based inclusive line bounds, `start_line <= end_line`
    pub start_line: u32,
    pub end_line: u32,
    #[serde(default)]
    pub has_docstring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    /// Ids of components this one references. May name ids absent from the
    /// current result set when cross-file resolution is partial.
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub used_by: Vec<String>,
    /// Child components; populated for classes only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub method_components: Vec<CodeComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_code: Option<String>,
    /// Relative reference to a rendered image of this component's
    /// dependency subgraph
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_graph_url: Option<String>,
    /// Generation result, attached asynchronously once documentation for
    /// this component completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docgen_final_state: Option<DocgenFinalState>,
}

impl CodeComponent {
    /// Last segment of the dotted id, as shown in navigation entries
    pub fn short_name(&self) -> &str {
        self.id.rsplit('.').next().unwrap_or(&self.id)
    }

    /// The structured documentation payload, if generation has completed
    pub fn documentation(&self) -> Option<&DocumentationJson> {
        self.docgen_final_state
            .as_ref()?
            .final_state
            .as_ref()?
            .documentation_json
            .as_ref()
    }

    pub fn is_class(&self) -> bool {
        self.component_type == ComponentType::Class
    }
}

/// Kind of source unit the backend extracted. `constructor` shows up in
/// older result sets and is counted with functions/methods.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Class,
    Function,
    Method,
    Constructor,
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Class => write!(f, "class"),
            Self::Function => write!(f, "function"),
            Self::Method => write!(f, "method"),
            Self::Constructor => write!(f, "constructor"),
        }
    }
}

/// Envelope the backend wraps generation results in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocgenFinalState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_state: Option<FinalState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_json: Option<DocumentationJson>,
}

/// Structured documentation for one component
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentationJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<DocRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub returns: Vec<DocRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub raises: Vec<DocRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub see_also: Vec<DocRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<String>,
}

/// One row of a parameters/returns/raises/see-also table. The generator
/// occasionally emits an `error` field instead of `name` for rows it could
/// not resolve; both are displayed through [`DocRow::display_name`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub row_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocRow {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or("N/A")
    }
}
