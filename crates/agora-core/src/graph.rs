//! Argumentation graphs
//!
//! A [`Graph`] maps every argument to the set of arguments attacking it. The
//! same type backs the universe graph, each agent's opinion graph and the
//! public graph; the latter two are always built from the universe with
//! [`Graph::restrict`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{DebateError, Result};

/// Opaque argument label
///
/// Ordering is lexicographic on the label and is the canonical order used
/// whenever candidates must be enumerated deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgumentId(String);

impl ArgumentId {
    /// Create an identifier from any label
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The raw label
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArgumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArgumentId {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl From<String> for ArgumentId {
    fn from(label: String) -> Self {
        Self(label)
    }
}

impl From<usize> for ArgumentId {
    fn from(label: usize) -> Self {
        Self(label.to_string())
    }
}

impl From<u32> for ArgumentId {
    fn from(label: u32) -> Self {
        Self(label.to_string())
    }
}

/// Mapping from argument to the set of its attackers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Graph {
    nodes: BTreeMap<ArgumentId, BTreeSet<ArgumentId>>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// The initial public graph: the issue alone, unattacked
    pub fn with_issue(issue: impl Into<ArgumentId>) -> Self {
        let mut graph = Self::new();
        graph.add_argument(issue);
        graph
    }

    /// Build a graph from `(argument, attackers)` entries.
    ///
    /// Attackers are taken as given; they are not required to be keys.
    /// Use [`Graph::validate`] to check closure.
    pub fn from_adjacency<K, A, I, E>(entries: E) -> Self
    where
        K: Into<ArgumentId>,
        A: Into<ArgumentId>,
        I: IntoIterator<Item = A>,
        E: IntoIterator<Item = (K, I)>,
    {
        let nodes = entries
            .into_iter()
            .map(|(key, attackers)| {
                (
                    key.into(),
                    attackers.into_iter().map(Into::into).collect(),
                )
            })
            .collect();
        Self { nodes }
    }

    /// Declare an argument. Returns false if it was already present.
    pub fn add_argument(&mut self, argument: impl Into<ArgumentId>) -> bool {
        let argument = argument.into();
        if self.nodes.contains_key(&argument) {
            return false;
        }
        self.nodes.insert(argument, BTreeSet::new());
        true
    }

    /// Record that `attacker` attacks `target`; both must already be declared.
    pub fn add_attack(
        &mut self,
        attacker: impl Into<ArgumentId>,
        target: impl Into<ArgumentId>,
    ) -> Result<()> {
        let attacker = attacker.into();
        let target = target.into();
        if !self.nodes.contains_key(&attacker) {
            return Err(DebateError::UnknownArgument { argument: attacker });
        }
        match self.nodes.get_mut(&target) {
            Some(attackers) => {
                attackers.insert(attacker);
                Ok(())
            }
            None => Err(DebateError::UnknownArgument { argument: target }),
        }
    }

    /// Attacker set of `argument`
    pub fn attackers(&self, argument: &ArgumentId) -> Result<&BTreeSet<ArgumentId>> {
        self.nodes
            .get(argument)
            .ok_or_else(|| DebateError::UnknownArgument {
                argument: argument.clone(),
            })
    }

    pub fn contains(&self, argument: &ArgumentId) -> bool {
        self.nodes.contains_key(argument)
    }

    /// Arguments in canonical order
    pub fn arguments(&self) -> impl Iterator<Item = &ArgumentId> {
        self.nodes.keys()
    }

    /// `(argument, attackers)` entries in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (&ArgumentId, &BTreeSet<ArgumentId>)> {
        self.nodes.iter()
    }

    /// Every attack as `(attacker, target)`
    pub fn attacks(&self) -> impl Iterator<Item = (&ArgumentId, &ArgumentId)> {
        self.nodes
            .iter()
            .flat_map(|(target, attackers)| attackers.iter().map(move |a| (a, target)))
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of attack relations
    pub fn attack_count(&self) -> usize {
        self.nodes.values().map(BTreeSet::len).sum()
    }

    /// Subgraph whose keys are exactly `arguments`, keeping an attack only
    /// when both endpoints are in the set.
    ///
    /// Fails with [`DebateError::MissingArgument`] when an argument is not in
    /// this graph.
    pub fn restrict<'a, I>(&self, arguments: I) -> Result<Graph>
    where
        I: IntoIterator<Item = &'a ArgumentId>,
    {
        let keep: BTreeSet<&ArgumentId> = arguments.into_iter().collect();
        let mut nodes = BTreeMap::new();
        for argument in &keep {
            let attackers = self
                .nodes
                .get(*argument)
                .ok_or_else(|| DebateError::MissingArgument {
                    argument: (*argument).clone(),
                })?;
            let kept = attackers
                .iter()
                .filter(|a| keep.contains(a))
                .cloned()
                .collect();
            nodes.insert((*argument).clone(), kept);
        }
        Ok(Graph { nodes })
    }

    /// `restrict(self, keys(base) ∪ {argument})`
    pub fn extend(&self, base: &Graph, argument: &ArgumentId) -> Result<Graph> {
        self.restrict(base.arguments().chain(std::iter::once(argument)))
    }

    /// Check that every attacker is itself a key
    pub fn validate(&self) -> Result<()> {
        for attackers in self.nodes.values() {
            for attacker in attackers {
                if !self.nodes.contains_key(attacker) {
                    return Err(DebateError::UnknownArgument {
                        argument: attacker.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// True when this graph equals the restriction of `universe` to its keys
    pub fn is_subgraph_of(&self, universe: &Graph) -> bool {
        self.check_subgraph_of(universe).is_ok()
    }

    /// Like [`Graph::is_subgraph_of`], reporting the first offending
    /// argument or attack.
    ///
    /// Attacks are compared in canonical order; an attack present on only
    /// one side, in either direction, fails with
    /// [`DebateError::AttackMismatch`].
    pub fn check_subgraph_of(&self, universe: &Graph) -> Result<()> {
        let restricted = universe.restrict(self.arguments())?;
        for (target, attackers) in &self.nodes {
            let expected = restricted.attackers(target)?;
            if let Some(attacker) = attackers.symmetric_difference(expected).next() {
                return Err(DebateError::AttackMismatch {
                    attacker: attacker.clone(),
                    target: target.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Reverse adjacency over the universe, limited to the arguments an agent
/// holds: for each held argument, the universe arguments it attacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseIndex {
    targets: BTreeMap<ArgumentId, BTreeSet<ArgumentId>>,
}

impl ReverseIndex {
    /// Index every key of `holder` against the attack relation of `universe`
    pub fn build(universe: &Graph, holder: &Graph) -> Self {
        let mut targets: BTreeMap<ArgumentId, BTreeSet<ArgumentId>> = holder
            .arguments()
            .map(|a| (a.clone(), BTreeSet::new()))
            .collect();

        for (attacker, target) in universe.attacks() {
            if let Some(set) = targets.get_mut(attacker) {
                set.insert(target.clone());
            }
        }

        Self { targets }
    }

    /// Arguments attacked by `attacker`, if it is indexed
    pub fn targets_of(&self, attacker: &ArgumentId) -> Option<&BTreeSet<ArgumentId>> {
        self.targets.get(attacker)
    }

    /// Indexed arguments attacking `target`, in canonical order
    pub fn attackers_of<'a>(
        &'a self,
        target: &'a ArgumentId,
    ) -> impl Iterator<Item = &'a ArgumentId> + 'a {
        self.targets
            .iter()
            .filter(move |(_, targets)| targets.contains(target))
            .map(|(attacker, _)| attacker)
    }

    /// `(attacker, targets)` entries in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (&ArgumentId, &BTreeSet<ArgumentId>)> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe() -> Graph {
        Graph::from_adjacency([
            ("i", vec!["a", "b", "c"]),
            ("a", vec!["d"]),
            ("b", vec!["e"]),
            ("c", vec![]),
            ("d", vec![]),
            ("e", vec![]),
        ])
    }

    fn id(label: &str) -> ArgumentId {
        ArgumentId::from(label)
    }

    #[test]
    fn test_attackers_lookup() {
        let ug = universe();
        let attackers = ug.attackers(&id("i")).unwrap();
        assert_eq!(attackers.len(), 3);
        assert!(attackers.contains(&id("b")));

        let err = ug.attackers(&id("zz")).unwrap_err();
        assert_eq!(err, DebateError::UnknownArgument { argument: id("zz") });
    }

    #[test]
    fn test_restrict_keeps_only_internal_attacks() {
        let ug = universe();
        let og = ug.restrict(&[id("i"), id("a"), id("e")]).unwrap();

        assert_eq!(og.len(), 3);
        assert_eq!(og.attackers(&id("i")).unwrap().len(), 1);
        assert!(og.attackers(&id("a")).unwrap().is_empty());
        assert!(og.attackers(&id("e")).unwrap().is_empty());
        assert!(og.is_subgraph_of(&ug));
        og.validate().unwrap();
    }

    #[test]
    fn test_check_subgraph_names_first_bad_attack() {
        let ug = universe();
        let og = Graph::from_adjacency([("i", vec!["a", "d"]), ("a", vec!["d"]), ("d", vec![])]);
        assert!(!og.is_subgraph_of(&ug));
        assert_eq!(
            og.check_subgraph_of(&ug).unwrap_err(),
            DebateError::AttackMismatch {
                attacker: id("d"),
                target: id("i"),
            }
        );

        let stray = Graph::from_adjacency([("i", Vec::<&str>::new()), ("q", vec![])]);
        assert_eq!(
            stray.check_subgraph_of(&ug).unwrap_err(),
            DebateError::MissingArgument { argument: id("q") }
        );
    }

    #[test]
    fn test_restrict_is_idempotent() {
        let ug = universe();
        let set = [id("i"), id("b"), id("e"), id("c")];
        assert_eq!(ug.restrict(&set).unwrap(), ug.restrict(&set).unwrap());
    }

    #[test]
    fn test_restrict_unknown_argument() {
        let ug = universe();
        let err = ug.restrict(&[id("i"), id("q")]).unwrap_err();
        assert_eq!(err, DebateError::MissingArgument { argument: id("q") });
    }

    #[test]
    fn test_extend_adds_one_argument() {
        let ug = universe();
        let pg = Graph::with_issue("i");
        let next = ug.extend(&pg, &id("a")).unwrap();

        assert_eq!(next.len(), 2);
        assert!(next.attackers(&id("i")).unwrap().contains(&id("a")));
        // input untouched
        assert_eq!(pg.len(), 1);
    }

    #[test]
    fn test_add_attack_requires_declared_arguments() {
        let mut g = Graph::new();
        g.add_argument("x");
        assert!(g.add_attack("y", "x").is_err());
        g.add_argument("y");
        g.add_attack("y", "x").unwrap();
        assert_eq!(g.attack_count(), 1);
        assert!(!g.add_argument("y"));
    }

    #[test]
    fn test_validate_detects_dangling_attacker() {
        let g = Graph::from_adjacency([("i", vec!["a"])]);
        assert_eq!(
            g.validate().unwrap_err(),
            DebateError::UnknownArgument { argument: id("a") }
        );
    }

    #[test]
    fn test_reverse_index() {
        let ug = universe();
        let og = ug.restrict(&[id("i"), id("a"), id("d"), id("c")]).unwrap();
        let index = ReverseIndex::build(&ug, &og);

        assert_eq!(index.len(), 4);
        assert!(index.targets_of(&id("a")).unwrap().contains(&id("i")));
        assert!(index.targets_of(&id("d")).unwrap().contains(&id("a")));
        assert!(index.targets_of(&id("i")).unwrap().is_empty());
        assert!(index.targets_of(&id("b")).is_none());

        let on_issue: Vec<_> = index.attackers_of(&id("i")).cloned().collect();
        assert_eq!(on_issue, vec![id("a"), id("c")]);
    }
}
