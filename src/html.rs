//! Minimal HTML construction for comment bodies. GitHub renders a small
//! HTML subset inside comments, so these build plain tag strings; no
//! escaping is applied.

/// Build `<name attrs...>children...</name>`. Attributes render
/// single-quoted.
#[must_use]
pub fn element(name: &str, attrs: &[(&str, &str)], children: &[String]) -> String {
    let attrs: String = attrs
        .iter()
        .map(|(key, value)| format!(" {key}='{value}'"))
        .collect();
    format!("<{name}{attrs}>{}</{name}>", children.concat())
}

/// Build an attribute-less `<name>children...</name>`.
#[must_use]
pub fn element_text(name: &str, children: &[String]) -> String {
    element(name, &[], children)
}

/// Concatenate sibling fragments.
#[must_use]
pub fn fragment(children: &[String]) -> String {
    children.concat()
}
