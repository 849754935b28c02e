//! Single forward pass that turns a content root into ordered text blocks
//!
//! Every `h2` opens a new section. Paragraphs, list items, preformatted
//! blocks, blockquotes and bare text directly under wrapper elements are
//! emitted with the heading path of the open section. Nothing is emitted
//! before the first `h2`.

use crate::extract::boilerplate::is_boilerplate;
use crate::extract::{collapse_whitespace, BlockKind, TextBlock};
use scraper::node::Node;
use scraper::ElementRef;

/// Elements whose direct text children become bare-text blocks
const WRAPPER_TAGS: &[&str] = &["section", "article", "main", "div", "body"];

/// Class prefixes that carry a code block's language
const LANGUAGE_CLASS_PREFIXES: &[&str] = &["language-", "lang-"];

/// Walks `root` and returns its blocks in document order
pub fn collect_blocks(root: ElementRef) -> Vec<TextBlock> {
    let mut walker = SectionWalker::default();
    walker.visit_children(root);
    walker.blocks
}

#[derive(Default)]
struct SectionWalker {
    blocks: Vec<TextBlock>,
    heading_path: Option<Vec<String>>,
    sections_opened: usize,
}

impl SectionWalker {
    fn visit_children(&mut self, element: ElementRef) {
        let is_wrapper = WRAPPER_TAGS.contains(&element.value().name());

        for child in element.children() {
            match child.value() {
                Node::Text(text) if is_wrapper => {
                    let text = collapse_whitespace(text);
                    self.emit(BlockKind::BareText, text);
                }
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.visit_element(child);
                    }
                }
                _ => {}
            }
        }
    }

    fn visit_element(&mut self, element: ElementRef) {
        if is_boilerplate(&element) {
            return;
        }

        match element.value().name() {
            "h2" => {
                let heading = collapse_whitespace(&element.text().collect::<String>());
                self.heading_path = Some(vec![heading]);
                self.sections_opened += 1;
            }
            "p" => self.emit_collapsed(element, BlockKind::Paragraph),
            "li" => self.emit_collapsed(element, BlockKind::ListItem),
            "blockquote" => self.emit_collapsed(element, BlockKind::Blockquote),
            "pre" => {
                let text = element.text().collect::<String>();
                let text = text.trim_start_matches(['\n', '\r']).trim_end().to_string();
                let language = code_language(element);
                self.emit(BlockKind::Preformatted { language }, text);
            }
            _ => self.visit_children(element),
        }
    }

    fn emit_collapsed(&mut self, element: ElementRef, kind: BlockKind) {
        let text = collapse_whitespace(&element.text().collect::<String>());
        self.emit(kind, text);
    }

    fn emit(&mut self, kind: BlockKind, text: String) {
        let Some(heading_path) = &self.heading_path else {
            return;
        };
        if text.trim().is_empty() {
            return;
        }

        self.blocks.push(TextBlock {
            heading_path: heading_path.clone(),
            section_index: self.sections_opened - 1,
            kind,
            order_index: self.blocks.len(),
            text,
        });
    }
}

/// Reads a `language-*` / `lang-*` class from a `pre` or its `code` child
fn code_language(pre: ElementRef) -> Option<String> {
    let code_classes = pre
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "code")
        .map(|code| code.value().classes().collect::<Vec<_>>())
        .unwrap_or_default();

    pre.value()
        .classes()
        .chain(code_classes)
        .find_map(language_from_class)
}

fn language_from_class(class: &str) -> Option<String> {
    LANGUAGE_CLASS_PREFIXES.iter().find_map(|prefix| {
        let name: String = class
            .strip_prefix(prefix)?
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'))
            .collect();
        (!name.is_empty()).then_some(name)
    })
}
