//! Graphviz rendering of mappings and their component trees.

use std::fmt::Write;

use crate::component::Component;
use crate::mapping::Mapping;
use crate::property::Property;

/// Accumulates nodes and edges of one `digraph`.
#[derive(Debug, Default)]
pub struct DotWriter {
    body: String,
    next: usize,
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

impl DotWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its id.
    pub fn node(&mut self, label: &str, shape: &str) -> String {
        let id = format!("n{}", self.next);
        self.next += 1;
        let _ = writeln!(
            self.body,
            "  {id} [label=\"{}\", shape={shape}];",
            escape(label)
        );
        id
    }

    pub fn edge(&mut self, from: &str, to: &str, label: &str) {
        let _ = writeln!(self.body, "  {from} -> {to} [label=\"{}\"];", escape(label));
    }

    /// Close the graph.
    pub fn finish(self, name: &str) -> String {
        format!("digraph \"{}\" {{\n{}}}\n", escape(name), self.body)
    }
}

impl Property {
    /// Render this property under `parent`.
    pub fn dot(&self, writer: &mut DotWriter, parent: &str) {
        match self {
            Property::Statement(p) => {
                let value = writer.node(p.object().label(), "plaintext");
                writer.edge(parent, &value, p.predicate().label());
            }
            Property::Component(p) => {
                let child = p.component().dot(writer);
                writer.edge(parent, &child, p.predicate().label());
            }
        }
    }
}

impl Component {
    /// Render this component and its properties; returns the node id.
    pub fn dot(&self, writer: &mut DotWriter) -> String {
        let id = writer.node(self.com_type().label(), "box");
        for property in self.properties() {
            property.dot(writer, &id);
        }
        id
    }
}

impl Mapping {
    /// A complete `digraph` for this mapping.
    pub fn dot(&self) -> String {
        let mut writer = DotWriter::new();
        let label = self.uri().map(|u| u.label()).unwrap_or("mapping");
        let root = writer.node(label, "ellipse");
        let source = self.source().dot(&mut writer);
        let target = self.target().dot(&mut writer);
        writer.edge(&root, &source, "source");
        writer.edge(&root, &target, if self.invertible() { "target (invertible)" } else { "target" });
        writer.finish(label)
    }
}
