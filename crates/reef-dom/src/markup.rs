//! Markup serialization
//!
//! Minimal HTML-shaped serializer. Used to key once-templates by their
//! content and to assert on tree shapes in tests. Shadow content is
//! not serialized; template elements serialize their parked content as
//! their inner markup.

use std::fmt::Write;

use crate::node::NodeData;
use crate::tree::Tree;
use crate::NodeId;

/// Serialize a node including its own tag
pub fn serialize(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, &mut out);
    out
}

/// Serialize a node's children only (inner markup)
pub fn serialize_children(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    write_children(tree, id, &mut out);
    out
}

fn write_children(tree: &Tree, id: NodeId, out: &mut String) {
    for child in tree.children(id) {
        write_node(tree, child, out);
    }
}

fn write_node(tree: &Tree, id: NodeId, out: &mut String) {
    match &tree.get(id).data {
        NodeData::Document | NodeData::Fragment => write_children(tree, id, out),
        NodeData::Element(el) => {
            let _ = write!(out, "<{}", el.tag);
            for attr in &el.attrs {
                if attr.value.is_empty() {
                    let _ = write!(out, " {}", attr.name);
                } else {
                    let _ = write!(out, " {}=\"{}\"", attr.name, escape(&attr.value));
                }
            }
            out.push('>');
            if el.is_template() && el.template_content.is_some() {
                write_children(tree, el.template_content, out);
            } else {
                write_children(tree, id, out);
            }
            let _ = write!(out, "</{}>", el.tag);
        }
        NodeData::Text(t) => out.push_str(&escape(&t.content)),
        NodeData::Comment(c) => {
            let _ = write!(out, "<!--{c}-->");
        }
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ElementData, TextData};

    #[test]
    fn test_serialize_element() {
        let mut tree = Tree::new();
        let root = tree.alloc(NodeData::Document);
        let div = tree.alloc(NodeData::Element({
            let mut el = ElementData::new("div");
            el.set_attr("class", "box");
            el.set_attr("hidden", "");
            el
        }));
        let text = tree.alloc(NodeData::Text(TextData {
            content: "a < b".into(),
        }));
        tree.append_child(root, div);
        tree.append_child(div, text);

        assert_eq!(
            serialize(&tree, div),
            "<div class=\"box\" hidden>a &lt; b</div>"
        );
        assert_eq!(serialize_children(&tree, root), serialize(&tree, div));
    }
}
