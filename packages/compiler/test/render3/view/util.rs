//! Render3 Template Utilities for Tests
//!
//! Builders for hand-assembled templates. Spans are located by searching the template text,
//! so the nodes carry the offsets a parser would have produced.

#![allow(dead_code)]

use ngtcb_compiler::expression_parser::ast::*;
use ngtcb_compiler::parse_util::{ParseSourceFile, ParseSourceSpan};
use ngtcb_compiler::render3::r3_ast as t;

pub struct TemplateText {
    pub file: ParseSourceFile,
}

impl TemplateText {
    pub fn new(text: &str) -> Self {
        TemplateText {
            file: ParseSourceFile::new(text, "test.html"),
        }
    }

    /// Offset of the `nth` (0-based) occurrence of `needle`.
    pub fn offset(&self, needle: &str, nth: usize) -> usize {
        self.file
            .content
            .match_indices(needle)
            .nth(nth)
            .map(|(idx, _)| idx)
            .unwrap_or_else(|| panic!("{:?} not found in template", needle))
    }

    pub fn span(&self, needle: &str, nth: usize) -> ParseSourceSpan {
        let start = self.offset(needle, nth);
        self.file.span(start, start + needle.len())
    }

    pub fn whole(&self) -> ParseSourceSpan {
        self.file.span(0, self.file.content.len())
    }

    /// A read of `name` through the implicit receiver, at the `nth` occurrence of `name`.
    pub fn read(&self, name: &str, nth: usize) -> AST {
        let start = self.offset(name, nth);
        let span = AbsoluteSourceSpan::new(start, start + name.len());
        AST::PropertyRead(PropertyRead {
            span: ParseSpan::new(0, name.len()),
            source_span: span,
            name_span: span,
            receiver: Box::new(AST::ImplicitReceiver(ImplicitReceiver {
                span: ParseSpan::new(0, 0),
                source_span: AbsoluteSourceSpan::new(start, start),
            })),
            name: name.to_string(),
        })
    }

    /// `this.name`, where `this.name` is the `nth` occurrence in the text.
    pub fn this_read(&self, name: &str, nth: usize) -> AST {
        let text = format!("this.{}", name);
        let start = self.offset(&text, nth);
        AST::PropertyRead(PropertyRead {
            span: ParseSpan::new(0, text.len()),
            source_span: AbsoluteSourceSpan::new(start, start + text.len()),
            name_span: AbsoluteSourceSpan::new(start + 5, start + text.len()),
            receiver: Box::new(AST::ThisReceiver(ThisReceiver {
                span: ParseSpan::new(0, 4),
                source_span: AbsoluteSourceSpan::new(start, start + 4),
            })),
            name: name.to_string(),
        })
    }

    pub fn pipe(&self, exp: AST, name: &str) -> AST {
        let start = exp.source_span().start;
        let name_start = self.offset(name, 0);
        AST::BindingPipe(BindingPipe {
            span: ParseSpan::new(0, name_start + name.len() - start),
            source_span: AbsoluteSourceSpan::new(start, name_start + name.len()),
            name_span: AbsoluteSourceSpan::new(name_start, name_start + name.len()),
            exp: Box::new(exp),
            name: name.to_string(),
            args: vec![],
        })
    }

    pub fn text_attr(&self, name: &str, value: &str) -> t::TextAttribute {
        t::TextAttribute {
            name: name.to_string(),
            value: value.to_string(),
            source_span: self.span(name, 0),
            key_span: Some(self.span(name, 0)),
            value_span: None,
        }
    }

    pub fn input(&self, name: &str, value: AST) -> t::BoundAttribute {
        let key = format!("[{}]", name);
        t::BoundAttribute {
            name: name.to_string(),
            type_: BindingType::Property,
            value,
            unit: None,
            source_span: self.span(&key, 0),
            key_span: self.span(name, 0),
            value_span: None,
        }
    }

    pub fn reference(&self, name: &str, value: &str) -> t::Reference {
        let text = format!("#{}", name);
        let span = self.span(&text, 0);
        let start = span.start.offset + 1;
        t::Reference {
            name: name.to_string(),
            value: value.to_string(),
            source_span: span,
            key_span: self.file.span(start, start + name.len()),
            value_span: None,
        }
    }

    pub fn variable(&self, name: &str, value: &str) -> t::Variable {
        let text = format!("let-{}", name);
        let span = self.span(&text, 0);
        let start = span.start.offset + 4;
        t::Variable {
            name: name.to_string(),
            value: value.to_string(),
            source_span: span,
            key_span: self.file.span(start, start + name.len()),
            value_span: None,
        }
    }

    pub fn bound_text(&self, value: AST) -> t::R3Node {
        let span = value.source_span();
        t::R3Node::BoundText(t::BoundText {
            value,
            source_span: self.file.span(span.start, span.end),
        })
    }

    /// An element spanning from its `nth` opening tag to the matching `</name>`.
    pub fn element(&self, name: &str, nth: usize) -> t::Element {
        let open = format!("<{}", name);
        let close = format!("</{}>", name);
        let start = self.offset(&open, nth);
        let end = self.file.content[start..]
            .find(&close)
            .map(|idx| start + idx + close.len())
            .unwrap_or(self.file.content.len());
        let start_end = self.file.content[start..]
            .find('>')
            .map(|idx| start + idx + 1)
            .unwrap_or(end);
        t::Element {
            name: name.to_string(),
            attributes: vec![],
            inputs: vec![],
            outputs: vec![],
            children: vec![],
            references: vec![],
            source_span: self.file.span(start, end),
            start_source_span: self.file.span(start, start_end),
            end_source_span: None,
        }
    }

    /// An explicit `<ng-template>` element.
    pub fn template(&self, nth: usize) -> t::Template {
        let el = self.element("ng-template", nth);
        t::Template {
            tag_name: Some("ng-template".to_string()),
            attributes: vec![],
            inputs: vec![],
            outputs: vec![],
            template_attrs: vec![],
            children: vec![],
            references: vec![],
            variables: vec![],
            source_span: el.source_span,
            start_source_span: el.start_source_span,
            end_source_span: None,
        }
    }
}
