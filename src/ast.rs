use serde::Serialize;

use crate::token::Position;

/// Scroll direction of a wheel step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelDirection {
    Up,
    Down,
}

impl WheelDirection {
    /// `+1` for up, `-1` for down.
    pub fn sign(self) -> i8 {
        match self {
            WheelDirection::Up => 1,
            WheelDirection::Down => -1,
        }
    }
}

/// A node of the parsed script with its source position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    pub position: Position,
}

/// Every node shape the parser produces.
///
/// Operator nodes keep their children in source order, which is also the
/// order a `Sequential` or `HoldChain` executes in. Wrapper nodes own exactly
/// one child.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Key {
        name: String,
    },
    Number {
        value: f64,
    },
    Variable {
        name: String,
    },
    MouseCoord {
        x: i32,
        y: i32,
    },
    Wheel {
        direction: WheelDirection,
        amount: u32,
    },

    /// `a, b, c`
    Sequential {
        children: Vec<Node>,
    },
    /// `a + b`
    Simultaneous {
        children: Vec<Node>,
    },
    /// `a | b`
    Parallel {
        children: Vec<Node>,
    },
    /// `a > b`
    HoldChain {
        children: Vec<Node>,
    },

    /// `~a`
    Toggle {
        child: Box<Node>,
    },
    /// `a*3` or `a*3{100}`
    Repeat {
        count: u32,
        interval_ms: Option<f64>,
        child: Box<Node>,
    },
    /// `a&100`
    Continuous {
        interval_ms: f64,
        child: Box<Node>,
    },
    /// `a(100)`
    Delay {
        ms: f64,
        child: Box<Node>,
    },
    /// `a[100]`
    Hold {
        ms: f64,
        child: Box<Node>,
    },
    /// `a<100>`
    Fade {
        ms: f64,
        child: Box<Node>,
    },
    /// `( ... )`
    Group {
        child: Box<Node>,
    },
}

impl Node {
    pub fn new(kind: NodeKind, position: Position) -> Self {
        Self { kind, position }
    }

    /// Children in stored order: empty for terminals, one for wrappers.
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Key { .. }
            | NodeKind::Number { .. }
            | NodeKind::Variable { .. }
            | NodeKind::MouseCoord { .. }
            | NodeKind::Wheel { .. } => &[],
            NodeKind::Sequential { children }
            | NodeKind::Simultaneous { children }
            | NodeKind::Parallel { children }
            | NodeKind::HoldChain { children } => children,
            NodeKind::Toggle { child }
            | NodeKind::Repeat { child, .. }
            | NodeKind::Continuous { child, .. }
            | NodeKind::Delay { child, .. }
            | NodeKind::Hold { child, .. }
            | NodeKind::Fade { child, .. }
            | NodeKind::Group { child } => std::slice::from_ref(child.as_ref()),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Key { .. } => "key",
            NodeKind::Number { .. } => "number",
            NodeKind::Variable { .. } => "variable",
            NodeKind::MouseCoord { .. } => "mouse_coord",
            NodeKind::Wheel { .. } => "wheel",
            NodeKind::Sequential { .. } => "sequential",
            NodeKind::Simultaneous { .. } => "simultaneous",
            NodeKind::Parallel { .. } => "parallel",
            NodeKind::HoldChain { .. } => "hold_chain",
            NodeKind::Toggle { .. } => "toggle",
            NodeKind::Repeat { .. } => "repeat",
            NodeKind::Continuous { .. } => "continuous",
            NodeKind::Delay { .. } => "delay",
            NodeKind::Hold { .. } => "hold",
            NodeKind::Fade { .. } => "fade",
            NodeKind::Group { .. } => "group",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Key { .. }
                | NodeKind::Number { .. }
                | NodeKind::Variable { .. }
                | NodeKind::MouseCoord { .. }
                | NodeKind::Wheel { .. }
        )
    }

    pub fn is_timing(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Delay { .. } | NodeKind::Hold { .. } | NodeKind::Fade { .. }
        )
    }

    pub fn is_operator(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Sequential { .. }
                | NodeKind::Simultaneous { .. }
                | NodeKind::Parallel { .. }
                | NodeKind::HoldChain { .. }
        )
    }

    /// Structural equality that ignores source positions.
    pub fn same_shape(&self, other: &Node) -> bool {
        let own = self.children();
        let theirs = other.children();
        let payload_matches = match (&self.kind, &other.kind) {
            (NodeKind::Key { name: a }, NodeKind::Key { name: b }) => a == b,
            (NodeKind::Number { value: a }, NodeKind::Number { value: b }) => a == b,
            (NodeKind::Variable { name: a }, NodeKind::Variable { name: b }) => a == b,
            (NodeKind::MouseCoord { x: ax, y: ay }, NodeKind::MouseCoord { x: bx, y: by }) => {
                ax == bx && ay == by
            }
            (
                NodeKind::Wheel { direction: ad, amount: aa },
                NodeKind::Wheel { direction: bd, amount: ba },
            ) => ad == bd && aa == ba,
            (
                NodeKind::Repeat { count: ac, interval_ms: ai, .. },
                NodeKind::Repeat { count: bc, interval_ms: bi, .. },
            ) => ac == bc && ai == bi,
            (
                NodeKind::Continuous { interval_ms: a, .. },
                NodeKind::Continuous { interval_ms: b, .. },
            ) => a == b,
            (NodeKind::Delay { ms: a, .. }, NodeKind::Delay { ms: b, .. })
            | (NodeKind::Hold { ms: a, .. }, NodeKind::Hold { ms: b, .. })
            | (NodeKind::Fade { ms: a, .. }, NodeKind::Fade { ms: b, .. }) => a == b,
            _ => self.kind_name() == other.kind_name(),
        };

        payload_matches
            && own.len() == theirs.len()
            && own.iter().zip(theirs).all(|(a, b)| a.same_shape(b))
    }
}
