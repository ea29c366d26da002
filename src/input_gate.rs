//! Decides whether a key press may trigger shortcuts given the focused element.

use crate::search_engine;

/// What the page reports about its focused element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusedElement {
    /// Upper- or lower-case tag name, e.g. `INPUT`.
    pub tag_name: String,
    pub is_content_editable: bool,
    /// The `name` attribute.
    pub name: Option<String>,
    /// The `aria-label` attribute.
    pub aria_label: Option<String>,
}

impl FocusedElement {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    pub fn content_editable(mut self) -> Self {
        self.is_content_editable = true;
        self
    }

    /// Text input, text area, or anything editable in place
    pub fn is_text_entry(&self) -> bool {
        self.tag_name.eq_ignore_ascii_case("input")
            || self.tag_name.eq_ignore_ascii_case("textarea")
            || self.is_content_editable
    }

    /// Heuristic for the site's own search box
    pub fn is_search_box(&self) -> bool {
        let named_like_query = self
            .name
            .as_deref()
            .is_some_and(search_engine::is_query_param);

        let labelled_search = self
            .aria_label
            .as_deref()
            .is_some_and(|label| label.to_lowercase().contains("search"));

        named_like_query || labelled_search
    }
}

/// Whether shortcuts should be considered for a key press.
///
/// Typing into an unrelated text field is never hijacked. The search box
/// itself and non-input elements are fair game.
pub fn is_eligible_target(focused: Option<&FocusedElement>) -> bool {
    match focused {
        None => true,
        Some(element) => !element.is_text_entry() || element.is_search_box(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_focused() {
        assert!(is_eligible_target(None));
    }

    #[test]
    fn test_unrelated_text_field() {
        let field = FocusedElement::new("INPUT").with_name("email");
        assert!(!is_eligible_target(Some(&field)));

        let area = FocusedElement::new("textarea");
        assert!(!is_eligible_target(Some(&area)));

        let editor = FocusedElement::new("DIV").content_editable();
        assert!(!is_eligible_target(Some(&editor)));
    }

    #[test]
    fn test_search_box_by_name() {
        let q = FocusedElement::new("INPUT").with_name("q");
        assert!(is_eligible_target(Some(&q)));

        let p = FocusedElement::new("TEXTAREA").with_name("p");
        assert!(is_eligible_target(Some(&p)));
    }

    #[test]
    fn test_search_box_by_label() {
        let field = FocusedElement::new("INPUT").with_aria_label("Search the web");
        assert!(is_eligible_target(Some(&field)));

        let field = FocusedElement::new("INPUT").with_aria_label("Username");
        assert!(!is_eligible_target(Some(&field)));
    }

    #[test]
    fn test_non_input_element() {
        let link = FocusedElement::new("A");
        assert!(is_eligible_target(Some(&link)));

        let body = FocusedElement::new("BODY").with_name("other");
        assert!(is_eligible_target(Some(&body)));
    }
}
