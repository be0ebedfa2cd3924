//! html5ever serializer support for [`ArenaDom`].

use std::io;

use html5ever::serialize::{Serialize, Serializer, TraversalScope};
use html5ever::QualName;

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId};

/// A node of an arena tree, ready to hand to `html5ever::serialize`.
pub struct SerializableNode<'a> {
    pub dom: &'a ArenaDom,
    pub node: ArenaNodeId,
}

enum SerializeOp {
    Open(ArenaNodeId),
    Close(QualName),
}

impl Serialize for SerializableNode<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let dom = self.dom;
        let mut ops: Vec<SerializeOp> = match traversal_scope {
            TraversalScope::IncludeNode => vec![SerializeOp::Open(self.node)],
            TraversalScope::ChildrenOnly(_) => {
                dom.children(self.node).map(SerializeOp::Open).collect()
            }
        };
        // Worked as a stack, so keep the next node to emit at the end.
        ops.reverse();

        while let Some(op) = ops.pop() {
            let id = match op {
                SerializeOp::Close(name) => {
                    serializer.end_elem(name)?;
                    continue;
                }
                SerializeOp::Open(id) => id,
            };
            let Some(node) = dom.get(id) else {
                continue;
            };
            match &node.data {
                ArenaNodeData::Element { name, attrs, .. } => {
                    serializer.start_elem(
                        name.clone(),
                        attrs.iter().map(|a| (&a.name, a.value.as_str())),
                    )?;
                    ops.push(SerializeOp::Close(name.clone()));
                    // A template's children live in its contents fragment.
                    let parent = dom.template_contents(id).unwrap_or(id);
                    let children: Vec<_> = dom.children(parent).collect();
                    ops.extend(children.into_iter().rev().map(SerializeOp::Open));
                }
                ArenaNodeData::Text(text) => serializer.write_text(text)?,
                ArenaNodeData::Comment(text) => serializer.write_comment(text)?,
                ArenaNodeData::Doctype { name, .. } => serializer.write_doctype(name)?,
                ArenaNodeData::Document => {
                    let children: Vec<_> = dom.children(id).collect();
                    ops.extend(children.into_iter().rev().map(SerializeOp::Open));
                }
            }
        }

        Ok(())
    }
}
