use std::collections::BTreeMap;

use serde::Serialize;

use crate::ast::{Node, NodeKind, WheelDirection};

/// One handler per node kind.
///
/// Handlers receive the node itself plus its unpacked payload. Visiting the
/// children is up to the handler, in stored order for n-ary nodes.
pub trait Visitor {
    type Output;

    fn visit_key(&mut self, node: &Node, name: &str) -> Self::Output;
    fn visit_number(&mut self, node: &Node, value: f64) -> Self::Output;
    fn visit_variable(&mut self, node: &Node, name: &str) -> Self::Output;
    fn visit_mouse_coord(&mut self, node: &Node, x: i32, y: i32) -> Self::Output;
    fn visit_wheel(&mut self, node: &Node, direction: WheelDirection, amount: u32)
    -> Self::Output;

    fn visit_sequential(&mut self, node: &Node, children: &[Node]) -> Self::Output;
    fn visit_simultaneous(&mut self, node: &Node, children: &[Node]) -> Self::Output;
    fn visit_parallel(&mut self, node: &Node, children: &[Node]) -> Self::Output;
    fn visit_hold_chain(&mut self, node: &Node, children: &[Node]) -> Self::Output;

    fn visit_toggle(&mut self, node: &Node, child: &Node) -> Self::Output;
    fn visit_repeat(
        &mut self,
        node: &Node,
        count: u32,
        interval_ms: Option<f64>,
        child: &Node,
    ) -> Self::Output;
    fn visit_continuous(&mut self, node: &Node, interval_ms: f64, child: &Node)
    -> Self::Output;
    fn visit_delay(&mut self, node: &Node, ms: f64, child: &Node) -> Self::Output;
    fn visit_hold(&mut self, node: &Node, ms: f64, child: &Node) -> Self::Output;
    fn visit_fade(&mut self, node: &Node, ms: f64, child: &Node) -> Self::Output;
    fn visit_group(&mut self, node: &Node, child: &Node) -> Self::Output;
}

impl Node {
    /// Dispatch to the handler for this node's kind.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match &self.kind {
            NodeKind::Key { name } => visitor.visit_key(self, name),
            NodeKind::Number { value } => visitor.visit_number(self, *value),
            NodeKind::Variable { name } => visitor.visit_variable(self, name),
            NodeKind::MouseCoord { x, y } => visitor.visit_mouse_coord(self, *x, *y),
            NodeKind::Wheel { direction, amount } => {
                visitor.visit_wheel(self, *direction, *amount)
            }
            NodeKind::Sequential { children } => visitor.visit_sequential(self, children),
            NodeKind::Simultaneous { children } => visitor.visit_simultaneous(self, children),
            NodeKind::Parallel { children } => visitor.visit_parallel(self, children),
            NodeKind::HoldChain { children } => visitor.visit_hold_chain(self, children),
            NodeKind::Toggle { child } => visitor.visit_toggle(self, child),
            NodeKind::Repeat {
                count,
                interval_ms,
                child,
            } => visitor.visit_repeat(self, *count, *interval_ms, child),
            NodeKind::Continuous { interval_ms, child } => {
                visitor.visit_continuous(self, *interval_ms, child)
            }
            NodeKind::Delay { ms, child } => visitor.visit_delay(self, *ms, child),
            NodeKind::Hold { ms, child } => visitor.visit_hold(self, *ms, child),
            NodeKind::Fade { ms, child } => visitor.visit_fade(self, *ms, child),
            NodeKind::Group { child } => visitor.visit_group(self, child),
        }
    }
}

/// Visit every node after its children, passing its depth (root is 0).
///
/// Uses an explicit stack, so tree depth is not bounded by the call stack.
pub fn walk_post_order<'a>(root: &'a Node, mut f: impl FnMut(&'a Node, usize)) {
    let mut stack = vec![(root, 0, false)];

    while let Some((node, depth, expanded)) = stack.pop() {
        if expanded || node.children().is_empty() {
            f(node, depth);
            continue;
        }

        stack.push((node, depth, true));
        for child in node.children().iter().rev() {
            stack.push((child, depth + 1, false));
        }
    }
}

/// Aggregate shape of a syntax tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_nodes: usize,
    pub max_depth: usize,
    pub terminal_nodes: usize,
    pub key_nodes: usize,
    pub timing_nodes: usize,
    pub operator_nodes: usize,
    pub by_kind: BTreeMap<&'static str, usize>,
}

impl Stats {
    pub fn collect(root: &Node) -> Self {
        let mut stats = Stats::default();

        walk_post_order(root, |node, depth| {
            stats.total_nodes += 1;
            stats.max_depth = stats.max_depth.max(depth);
            if node.is_terminal() {
                stats.terminal_nodes += 1;
            }
            if matches!(node.kind, NodeKind::Key { .. }) {
                stats.key_nodes += 1;
            }
            if node.is_timing() {
                stats.timing_nodes += 1;
            }
            if node.is_operator() {
                stats.operator_nodes += 1;
            }
            *stats.by_kind.entry(node.kind_name()).or_insert(0) += 1;
        });

        stats
    }
}
