//! Dashboard documents

use serde::{Deserialize, Serialize};

use crate::de::null_as_default;
use crate::document::{Document, DocumentKind};
use crate::widget::Widget;
use crate::RawObject;

/// Visualization document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    /// Top-level widgets, in display order
    #[serde(default, deserialize_with = "null_as_default")]
    pub widgets: Vec<Widget>,

    /// Template variables, in declaration order
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub template_variables: Vec<TemplateVariable>,

    /// Unmodelled fields (`title`, `layout_type`, ...)
    #[serde(flatten)]
    pub extra: RawObject,
}

impl Dashboard {
    /// Dashboard holding `widgets` and no template variables
    #[inline]
    #[must_use]
    pub fn new(widgets: Vec<Widget>) -> Self {
        Self {
            widgets,
            template_variables: Vec::new(),
            extra: RawObject::new(),
        }
    }

    /// Append a template variable
    #[inline]
    #[must_use]
    pub fn with_variable(mut self, variable: TemplateVariable) -> Self {
        self.template_variables.push(variable);
        self
    }
}

impl Document for Dashboard {
    const KIND: DocumentKind = DocumentKind::Dashboard;
}

/// Dashboard-scoped placeholder referenced from queries as `$name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateVariable {
    /// Name, without the `$` sigil
    pub name: String,

    /// Tag the variable filters on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Unmodelled fields (`default`, `available_values`, ...)
    #[serde(flatten)]
    pub extra: RawObject,
}

impl TemplateVariable {
    /// Variable `name` filtering on `prefix`
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, prefix: Option<&str>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.map(str::to_string),
            extra: RawObject::new(),
        }
    }
}
