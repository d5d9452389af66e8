//! Edge color derivation from endpoint types.
//!
//! First match wins:
//! 1. paper and author: the author's color
//! 2. paper and organization: the paper's color
//! 3. anything else: the target's color

/// The part of an endpoint the edge color depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint<'a> {
    pub node_type: &'a str,
    pub color: &'a str,
}

impl<'a> Endpoint<'a> {
    pub fn new(node_type: &'a str, color: &'a str) -> Self {
        Self { node_type, color }
    }
}

/// Color of an edge from `source` to `target`.
pub fn derive<'a>(source: Endpoint<'a>, target: Endpoint<'a>) -> &'a str {
    match (source.node_type, target.node_type) {
        ("paper", "author") => target.color,
        ("author", "paper") => source.color,
        ("paper", "organization") => source.color,
        ("organization", "paper") => target.color,
        _ => target.color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: Endpoint<'static> = Endpoint {
        node_type: "paper",
        color: "#2ca02c",
    };
    const A: Endpoint<'static> = Endpoint {
        node_type: "author",
        color: "#9467bd",
    };
    const O: Endpoint<'static> = Endpoint {
        node_type: "organization",
        color: "#1f77b4",
    };

    #[test]
    fn test_paper_author_takes_author() {
        assert_eq!(derive(P, A), "#9467bd");
        assert_eq!(derive(A, P), "#9467bd");
    }

    #[test]
    fn test_paper_organization_takes_paper() {
        assert_eq!(derive(P, O), "#2ca02c");
        assert_eq!(derive(O, P), "#2ca02c");
    }

    #[test]
    fn test_other_pairs_take_target() {
        assert_eq!(derive(A, O), "#1f77b4");
        assert_eq!(derive(O, A), "#9467bd");
        assert_eq!(derive(P, P), "#2ca02c");

        let u1 = Endpoint::new("unknown", "#ff7f0e");
        let u2 = Endpoint::new("unknown", "#123456");
        assert_eq!(derive(u1, u2), "#123456");
    }
}
