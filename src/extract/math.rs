//! Recursive, math-aware text extraction

use crate::config::ExtractConfig;
use crate::extract::markup::{MarkupChild, MarkupElement};

/// Names identifying math markup in a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathMarkup {
    /// Tag of a dedicated math element (MathML `<math>`)
    pub element: String,
    /// Attribute on that element holding the underlying notation
    pub notation_attribute: String,
    /// Class flagging an inline element whose text is already rendered math
    pub rendered_class: String,
}

impl Default for MathMarkup {
    fn default() -> Self {
        Self::from(&ExtractConfig::default())
    }
}

impl From<&ExtractConfig> for MathMarkup {
    fn from(config: &ExtractConfig) -> Self {
        Self {
            element: config.math_element.clone(),
            notation_attribute: config.notation_attribute.clone(),
            rendered_class: config.math_class.clone(),
        }
    }
}

/// Converts a markup subtree into plain text with math wrapped in `$...$`
///
/// # Rules
///
/// Evaluated in order for every node:
///
/// 1. Text node: returned verbatim.
/// 2. Math element: `$notation$`, or nothing when the notation is empty or missing.
/// 3. Element carrying the rendered-math class: `$text$`.
/// 4. Element with no math anywhere below it: its text content, trimmed.
/// 5. Anything else: the concatenation of its children, in document order.
///
/// Rule 4 only short-circuits rule 5 on math-free subtrees; both produce the
/// same text for them apart from trimming.
#[derive(Debug, Clone, Default)]
pub struct MathTextExtractor {
    markup: MathMarkup,
}

impl MathTextExtractor {
    pub fn new(markup: MathMarkup) -> Self {
        Self { markup }
    }

    /// Extracts the text of `element` and its subtree
    pub fn extract<E: MarkupElement>(&self, element: E) -> String {
        let mut out = String::new();
        self.extract_into(element, &mut out);
        out
    }

    fn extract_into<E: MarkupElement>(&self, element: E, out: &mut String) {
        if self.is_math(&element) {
            if let Some(notation) = self.notation(&element) {
                push_math(out, notation);
            }
            return;
        }

        if self.is_rendered_math(&element) {
            push_math(out, &element.text_content());
            return;
        }

        if !element.any_descendant(&mut |d| self.is_math(d) || self.is_rendered_math(d)) {
            out.push_str(element.text_content().trim());
            return;
        }

        for child in element.children() {
            match child {
                MarkupChild::Text(text) => out.push_str(&text),
                MarkupChild::Element(child) => self.extract_into(child, out),
                MarkupChild::Other => {}
            }
        }
    }

    pub fn is_math<E: MarkupElement>(&self, element: &E) -> bool {
        element.tag_name().eq_ignore_ascii_case(&self.markup.element)
    }

    pub fn is_rendered_math<E: MarkupElement>(&self, element: &E) -> bool {
        element.has_class(&self.markup.rendered_class)
    }

    /// The untrimmed notation of a math element, if present and non-empty
    pub fn notation<'e, E: MarkupElement>(&self, element: &'e E) -> Option<&'e str> {
        element
            .attr(&self.markup.notation_attribute)
            .filter(|notation| !notation.is_empty())
    }
}

fn push_math(out: &mut String, notation: &str) {
    out.push('$');
    out.push_str(notation);
    out.push('$');
}
