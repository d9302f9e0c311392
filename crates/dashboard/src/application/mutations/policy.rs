//! Which cached queries each kind of mutation makes stale

use std::collections::HashMap;

use crate::ports::{QueryFamily, QueryFilter, QueryKey};

/// Kinds of operator mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// `PATCH /clients/{id}/status`
    ClientStatus,
    /// `PUT /contacts/config`
    MonthlyTarget,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::ClientStatus => "client_status",
            MutationKind::MonthlyTarget => "monthly_target",
        }
    }
}

/// Dependent query filters per mutation kind, invalidated together on commit
#[derive(Debug, Clone)]
pub struct InvalidationPolicy {
    rules: HashMap<MutationKind, Vec<QueryFilter>>,
}

impl Default for InvalidationPolicy {
    fn default() -> Self {
        Self::new()
            .with_rule(
                MutationKind::ClientStatus,
                vec![
                    QueryFilter::Family(QueryFamily::PriorityList),
                    QueryFilter::Exact(QueryKey::MetricsSummary),
                    QueryFilter::Exact(QueryKey::ProbabilityDistribution),
                    QueryFilter::Exact(QueryKey::ContactProgress),
                ],
            )
            .with_rule(
                MutationKind::MonthlyTarget,
                vec![QueryFilter::Exact(QueryKey::ContactProgress)],
            )
    }
}

impl InvalidationPolicy {
    /// Policy with no rules; every mutation invalidates nothing
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    pub fn with_rule(mut self, kind: MutationKind, dependents: Vec<QueryFilter>) -> Self {
        self.rules.insert(kind, dependents);
        self
    }

    pub fn dependents(&self, kind: MutationKind) -> &[QueryFilter] {
        self.rules.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_change_reaches_every_dependent_view() {
        let policy = InvalidationPolicy::default();
        let dependents = policy.dependents(MutationKind::ClientStatus);

        assert!(dependents.iter().any(|f| f.matches(&QueryKey::priority_list(3, 10))));
        assert!(dependents.iter().any(|f| f.matches(&QueryKey::MetricsSummary)));
        assert!(dependents
            .iter()
            .any(|f| f.matches(&QueryKey::ProbabilityDistribution)));
        assert!(dependents.iter().any(|f| f.matches(&QueryKey::ContactProgress)));
        assert!(!dependents.iter().any(|f| f.matches(&QueryKey::HeatmapVariables)));
    }

    #[test]
    fn monthly_target_only_touches_progress() {
        let policy = InvalidationPolicy::default();
        assert_eq!(
            policy.dependents(MutationKind::MonthlyTarget),
            &[QueryFilter::Exact(QueryKey::ContactProgress)]
        );
    }

    #[test]
    fn empty_policy_has_no_dependents() {
        assert!(InvalidationPolicy::new()
            .dependents(MutationKind::ClientStatus)
            .is_empty());
    }
}
