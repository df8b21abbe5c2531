use std::collections::BTreeMap;

use crate::error::{AerofnError, AerofnResult};

/// One node of a parsed model-configuration tree: a tag, named string
/// attributes, ordered children, and accumulated text content.
///
/// The text-to-tree parser itself lives with the host simulation; this crate
/// consumes nodes (and can load them from JSON for tooling and tests).
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ConfigNode {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ConfigNode>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
}

impl ConfigNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, child: ConfigNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Shorthand for a `<value>` node wrapping a numeric literal.
    pub fn value(v: f64) -> Self {
        Self::new("value").text(v.to_string())
    }

    /// Shorthand for a `<property>` node wrapping a slash-delimited path.
    pub fn property(path: impl Into<String>) -> Self {
        Self::new("property").text(path.into())
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The node's accumulated text parsed as a numeric literal.
    pub fn numeric_text(&self) -> AerofnResult<f64> {
        let raw = self.text.trim();
        raw.parse::<f64>().map_err(|_| {
            AerofnError::config(format!(
                "malformed numeric literal '{raw}' in <{}> element",
                self.tag
            ))
        })
    }

    /// The node's accumulated text as a trimmed path string.
    pub fn path_text(&self) -> AerofnResult<&str> {
        let raw = self.text.trim();
        if raw.is_empty() {
            return Err(AerofnError::config(format!(
                "<{}> element has no path content",
                self.tag
            )));
        }
        Ok(raw)
    }

    // The grammar accepts long-form tags and one-character shortcuts
    // interchangeably.
    pub fn is_value(&self) -> bool {
        self.tag == "value" || self.tag == "v"
    }

    pub fn is_property(&self) -> bool {
        self.tag == "property" || self.tag == "p"
    }

    pub fn is_table(&self) -> bool {
        self.tag == "table" || self.tag == "t"
    }

    /// Documentation children carry no value and are skipped by the builder.
    pub fn is_documentation(&self) -> bool {
        self.tag == "description" || self.tag == "documentation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_text_parses_trimmed_literal() {
        let n = ConfigNode::new("value").text("  3.14159 ");
        assert_eq!(n.numeric_text().unwrap(), 3.14159);
    }

    #[test]
    fn numeric_text_rejects_garbage() {
        let n = ConfigNode::new("value").text("fast");
        let err = n.numeric_text().unwrap_err();
        assert!(err.to_string().contains("malformed numeric literal"));
    }

    #[test]
    fn shortcut_tags_match_long_forms() {
        assert!(ConfigNode::new("p").is_property());
        assert!(ConfigNode::new("property").is_property());
        assert!(ConfigNode::new("v").is_value());
        assert!(ConfigNode::new("t").is_table());
        assert!(!ConfigNode::new("pow").is_property());
    }

    #[test]
    fn loads_from_json() {
        let n: ConfigNode = serde_json::from_str(
            r#"{
                "tag": "sum",
                "children": [
                    { "tag": "v", "text": "1.5" },
                    { "tag": "p", "text": "velocities/mach" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(n.tag, "sum");
        assert_eq!(n.children.len(), 2);
        assert_eq!(n.children[0].numeric_text().unwrap(), 1.5);
        assert_eq!(n.children[1].path_text().unwrap(), "velocities/mach");
    }
}
