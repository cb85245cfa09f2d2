//! Rendering of syntax trees back to text

use crate::ast::{Node, NodeKind, WheelDirection};
use crate::visit::Visitor;

/// Canonical MSL text for a tree.
///
/// Keys come out lowercased and operators spaced, so parsing the result gives
/// a tree of the same shape as the one printed.
pub fn to_msl(node: &Node) -> String {
    node.accept(&mut MslPrinter)
}

struct MslPrinter;

impl MslPrinter {
    fn join(&mut self, children: &[Node], separator: &str) -> String {
        children
            .iter()
            .map(|child| child.accept(self))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl Visitor for MslPrinter {
    type Output = String;

    fn visit_key(&mut self, _: &Node, name: &str) -> String {
        name.to_string()
    }

    fn visit_number(&mut self, _: &Node, value: f64) -> String {
        value.to_string()
    }

    fn visit_variable(&mut self, _: &Node, name: &str) -> String {
        format!("${name}")
    }

    fn visit_mouse_coord(&mut self, _: &Node, x: i32, y: i32) -> String {
        format!("@({x},{y})")
    }

    fn visit_wheel(&mut self, _: &Node, direction: WheelDirection, amount: u32) -> String {
        match (direction, amount) {
            (WheelDirection::Up, 1) => "wheel_up".to_string(),
            (WheelDirection::Down, 1) => "wheel_down".to_string(),
            (WheelDirection::Up, n) => format!("wheel_up+{n}"),
            (WheelDirection::Down, n) => format!("wheel_down-{n}"),
        }
    }

    fn visit_sequential(&mut self, _: &Node, children: &[Node]) -> String {
        self.join(children, ", ")
    }

    fn visit_simultaneous(&mut self, _: &Node, children: &[Node]) -> String {
        self.join(children, " + ")
    }

    fn visit_parallel(&mut self, _: &Node, children: &[Node]) -> String {
        self.join(children, " | ")
    }

    fn visit_hold_chain(&mut self, _: &Node, children: &[Node]) -> String {
        self.join(children, " > ")
    }

    fn visit_toggle(&mut self, _: &Node, child: &Node) -> String {
        format!("~{}", child.accept(self))
    }

    fn visit_repeat(
        &mut self,
        _: &Node,
        count: u32,
        interval_ms: Option<f64>,
        child: &Node,
    ) -> String {
        let child = child.accept(self);
        match interval_ms {
            Some(interval) => format!("{child}*{count}{{{interval}}}"),
            None => format!("{child}*{count}"),
        }
    }

    fn visit_continuous(&mut self, _: &Node, interval_ms: f64, child: &Node) -> String {
        format!("{}&{interval_ms}", child.accept(self))
    }

    fn visit_delay(&mut self, _: &Node, ms: f64, child: &Node) -> String {
        format!("{}({ms})", child.accept(self))
    }

    fn visit_hold(&mut self, _: &Node, ms: f64, child: &Node) -> String {
        format!("{}[{ms}]", child.accept(self))
    }

    fn visit_fade(&mut self, _: &Node, ms: f64, child: &Node) -> String {
        format!("{}<{ms}>", child.accept(self))
    }

    fn visit_group(&mut self, _: &Node, child: &Node) -> String {
        format!("({})", child.accept(self))
    }
}

/// Indented outline, one node per line with its position.
pub fn tree_string(root: &Node) -> String {
    let mut out = String::new();
    let mut stack = vec![(root, 0usize)];

    while let Some((node, depth)) = stack.pop() {
        out.push_str(&format!(
            "{}{} @ {}\n",
            "  ".repeat(depth),
            label(node),
            node.position
        ));
        for child in node.children().iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    out
}

fn label(node: &Node) -> String {
    match &node.kind {
        NodeKind::Key { name } => format!("key {name}"),
        NodeKind::Number { value } => format!("number {value}"),
        NodeKind::Variable { name } => format!("variable ${name}"),
        NodeKind::MouseCoord { x, y } => format!("mouse_coord ({x}, {y})"),
        NodeKind::Wheel { direction, amount } => {
            let direction = match direction {
                WheelDirection::Up => "up",
                WheelDirection::Down => "down",
            };
            format!("wheel {direction} x{amount}")
        }
        NodeKind::Repeat {
            count,
            interval_ms: Some(interval),
            ..
        } => format!("repeat x{count} every {interval}ms"),
        NodeKind::Repeat { count, .. } => format!("repeat x{count}"),
        NodeKind::Continuous { interval_ms, .. } => format!("continuous every {interval_ms}ms"),
        NodeKind::Delay { ms, .. } => format!("delay {ms}ms"),
        NodeKind::Hold { ms, .. } => format!("hold {ms}ms"),
        NodeKind::Fade { ms, .. } => format!("fade {ms}ms"),
        _ => node.kind_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use rstest::rstest;

    #[rstest]
    #[case("W,A,S,D", "w, a, s, d")]
    #[case("Ctrl+C", "ctrl + c")]
    #[case("(W,A)|(S,D)", "(w, a) | (s, d)")]
    #[case("W>A>S", "w > a > s")]
    #[case("W*5{200}", "w*5{200}")]
    #[case("Space&2000", "space&2000")]
    #[case("~CapsLock", "~capslock")]
    #[case("W(100)[200]<300>", "w(100)[200]<300>")]
    #[case("W<500>>A", "w<500> > a")]
    #[case("wheel_up*3, wheel_down-2, wheel_up+4", "wheel_up*3, wheel_down-2, wheel_up+4")]
    #[case("@( 10 , 20 )+LClick", "@(10,20) + lclick")]
    #[case("$combo1, 2.5", "$combo1, 2.5")]
    #[case("A,(500)", "a, (500)")]
    fn test_to_msl(#[case] script: &str, #[case] expected: &str) {
        let node = parse(script).unwrap();
        assert_eq!(to_msl(&node), expected);
    }

    #[rstest]
    #[case("Shift[2000]+(W,A,S,D)")]
    #[case("~shift > w > a, space[1000] | q & 50")]
    #[case("(Q+E)(500)*2{100}")]
    #[case("wheel_down+3")]
    fn test_to_msl_reparses_to_same_shape(#[case] script: &str) {
        let node = parse(script).unwrap();
        let reparsed = parse(&to_msl(&node)).unwrap();
        assert!(node.same_shape(&reparsed), "{script:?} -> {}", to_msl(&node));
    }

    #[test]
    fn test_tree_string() {
        let node = parse("Ctrl+C*2").unwrap();
        assert_eq!(
            tree_string(&node),
            "simultaneous @ 1:1\n  key ctrl @ 1:1\n  repeat x2 @ 1:6\n    key c @ 1:6\n"
        );
    }

    #[test]
    fn test_tree_string_payloads() {
        let node = parse("@(1,2), wheel_up, $v, 7, a&5, b*2{10}, c(1)[2]<3>").unwrap();
        let tree = tree_string(&node);
        for line in [
            "mouse_coord (1, 2)",
            "wheel up x1",
            "variable $v",
            "number 7",
            "continuous every 5ms",
            "repeat x2 every 10ms",
            "fade 3ms",
            "hold 2ms",
            "delay 1ms",
        ] {
            assert!(tree.contains(line), "missing {line:?} in\n{tree}");
        }
    }
}
