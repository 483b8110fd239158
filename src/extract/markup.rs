//! The node capabilities the extractor needs from a parsed markup tree

use scraper::ElementRef;
use std::ops::Deref;

/// A child of an element, as seen by the extractor
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupChild<E> {
    /// A text node, verbatim
    Text(String),
    /// A nested element
    Element(E),
    /// Comments, doctypes and processing instructions
    Other,
}

/// Read-only view of an element in a markup tree
///
/// Equality is node identity: two values compare equal only when they point
/// at the same node of the same tree.
pub trait MarkupElement: Copy + PartialEq {
    fn tag_name(&self) -> &str;

    fn attr(&self, name: &str) -> Option<&str>;

    fn has_class(&self, class: &str) -> bool;

    /// Concatenation of every descendant text node
    fn text_content(&self) -> String;

    /// Direct children in document order
    fn children(&self) -> Vec<MarkupChild<Self>>;

    /// Whether any element strictly below this one satisfies `predicate`
    fn any_descendant(&self, predicate: &mut dyn FnMut(&Self) -> bool) -> bool;

    /// Every element strictly below this one, in document order
    fn descendant_elements(&self) -> Vec<Self>;
}

impl<'a> MarkupElement for ElementRef<'a> {
    fn tag_name(&self) -> &str {
        self.value().name()
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn has_class(&self, class: &str) -> bool {
        self.value().classes().any(|c| c == class)
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }

    fn children(&self) -> Vec<MarkupChild<Self>> {
        Deref::deref(self)
            .children()
            .map(|node| {
                if let Some(element) = ElementRef::wrap(node) {
                    MarkupChild::Element(element)
                } else if let Some(text) = node.value().as_text() {
                    MarkupChild::Text(String::from(&**text))
                } else {
                    MarkupChild::Other
                }
            })
            .collect()
    }

    fn any_descendant(&self, predicate: &mut dyn FnMut(&Self) -> bool) -> bool {
        Deref::deref(self)
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .any(|element| predicate(&element))
    }

    fn descendant_elements(&self) -> Vec<Self> {
        Deref::deref(self)
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .collect()
    }
}
