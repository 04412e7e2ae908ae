use statescan_core::Name;

use crate::finding::RiskLevel;

/// The kind of graph edge a `PathStep` arrived through.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EdgeKind {
    Field,
    Invocation,
    Inheritance,
    DiBinding,
}

/// One hop in a `StatefulPath`.
#[derive(Clone, Debug, PartialEq)]
pub struct PathStep {
    pub class: Name,
    pub member: Option<Name>,
    pub edge: Option<EdgeKind>,
}

impl PathStep {
    pub fn root(class: impl Into<Name>) -> Self {
        Self {
            class: class.into(),
            member: None,
            edge: None,
        }
    }

    pub fn hop(class: impl Into<Name>, member: impl Into<Name>, edge: EdgeKind) -> Self {
        Self {
            class: class.into(),
            member: Some(member.into()),
            edge: Some(edge),
        }
    }
}

/// The externally configured leaf category a `StatefulPath` terminates at.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LeafCategory {
    ExternalState,
    ServiceClient,
    Cache,
    Grpc,
    Resilience,
    FileState,
    ThreadLocal,
}

/// A deduplicated root-to-leaf path through the reachable graph.
#[derive(Clone, Debug, PartialEq)]
pub struct StatefulPath {
    pub root: Name,
    pub steps: Vec<PathStep>,
    pub leaf_type: Name,
    pub leaf_category: LeafCategory,
    pub risk: RiskLevel,
}

impl StatefulPath {
    /// A deduplication signature: the root, the ordered sequence of
    /// `class#member` tokens, and the leaf type. Two paths with the same
    /// signature are considered duplicates regardless of risk annotation.
    pub fn signature(&self) -> String {
        let mut signature = self.root.as_str().to_string();
        for step in &self.steps {
            signature.push_str(" -> ");
            signature.push_str(step.class.as_str());
            if let Some(member) = &step.member {
                signature.push('#');
                signature.push_str(member.as_str());
            }
        }
        signature.push_str(" -> ");
        signature.push_str(self.leaf_type.as_str());
        signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_stable_for_identical_paths() {
        let path = StatefulPath {
            root: Name::new("com.example.Service"),
            steps: vec![
                PathStep::root("com.example.Service"),
                PathStep::hop("com.example.Repo", "save", EdgeKind::Invocation),
            ],
            leaf_type: Name::new("com.example.DataSource"),
            leaf_category: LeafCategory::ExternalState,
            risk: RiskLevel::High,
        };
        let other = path.clone();
        assert_eq!(path.signature(), other.signature());
    }
}
