//! Query vocabulary shared by the cache, the mutator, and the services.
//!
//! A `QueryKey` names one cached result by the parameters that produced it.
//! A `QueryFamily` groups every key of the same kind (for example every page
//! of the priority list), which is what invalidation usually targets.

use std::fmt;

use prometeo_domain::{
    Client, ContactProgress, Heatmap, HeatmapVariables, MetricsSummary, ProbabilityDistribution,
};
use prometeo_shared::{routes, HeatmapQuery, PageRequest};

/// Identifies one cached query result
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    PriorityList(PageRequest),
    /// Export panel data set, a single large priority-list page
    ClientsExport,
    MetricsSummary,
    ProbabilityDistribution,
    ContactProgress,
    Heatmap(HeatmapQuery),
    HeatmapVariables,
}

impl QueryKey {
    pub fn priority_list(page: u32, size: u32) -> Self {
        QueryKey::PriorityList(PageRequest::new(page, size))
    }

    pub fn family(&self) -> QueryFamily {
        match self {
            QueryKey::PriorityList(_) => QueryFamily::PriorityList,
            QueryKey::ClientsExport => QueryFamily::ClientsExport,
            QueryKey::MetricsSummary => QueryFamily::MetricsSummary,
            QueryKey::ProbabilityDistribution => QueryFamily::ProbabilityDistribution,
            QueryKey::ContactProgress => QueryFamily::ContactProgress,
            QueryKey::Heatmap(_) => QueryFamily::Heatmap,
            QueryKey::HeatmapVariables => QueryFamily::HeatmapVariables,
        }
    }

    /// REST path serving this key, relative to the API base URL
    pub fn path(&self) -> String {
        match self {
            QueryKey::PriorityList(page) => routes::priority_list(*page),
            QueryKey::ClientsExport => routes::clients_export(),
            QueryKey::MetricsSummary => routes::METRICS_SUMMARY.to_string(),
            QueryKey::ProbabilityDistribution => routes::PROBABILITY_DISTRIBUTION.to_string(),
            QueryKey::ContactProgress => routes::CONTACT_PROGRESS.to_string(),
            QueryKey::Heatmap(query) => routes::heatmap(query),
            QueryKey::HeatmapVariables => routes::HEATMAP_VARIABLES.to_string(),
        }
    }

    /// Whether `data` is the kind of value this key caches
    pub fn accepts(&self, data: &QueryData) -> bool {
        match (self, data) {
            (QueryKey::PriorityList(_) | QueryKey::ClientsExport, QueryData::Clients(_)) => true,
            (QueryKey::PriorityList(_) | QueryKey::ClientsExport, _) => false,
            (key, data) => key.family() == data.family(),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::PriorityList(page) => {
                write!(f, "priorityList[{},{}]", page.page, page.size)
            }
            QueryKey::Heatmap(q) => {
                write!(f, "heatmap[{},{},{}]", q.x, q.y, q.metric.as_str())
            }
            other => write!(f, "{}", other.family().as_str()),
        }
    }
}

/// Kind of query, regardless of its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryFamily {
    PriorityList,
    ClientsExport,
    MetricsSummary,
    ProbabilityDistribution,
    ContactProgress,
    Heatmap,
    HeatmapVariables,
}

impl QueryFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryFamily::PriorityList => "priorityList",
            QueryFamily::ClientsExport => "clientsExport",
            QueryFamily::MetricsSummary => "metricsSummary",
            QueryFamily::ProbabilityDistribution => "probDist",
            QueryFamily::ContactProgress => "contactProgress",
            QueryFamily::Heatmap => "heatmap",
            QueryFamily::HeatmapVariables => "heatmapVariables",
        }
    }
}

/// Selects cache entries for invalidation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryFilter {
    /// Exactly this key
    Exact(QueryKey),
    /// Every key of this family
    Family(QueryFamily),
}

impl QueryFilter {
    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            QueryFilter::Exact(k) => k == key,
            QueryFilter::Family(family) => key.family() == *family,
        }
    }
}

impl From<QueryKey> for QueryFilter {
    fn from(key: QueryKey) -> Self {
        QueryFilter::Exact(key)
    }
}

impl From<QueryFamily> for QueryFilter {
    fn from(family: QueryFamily) -> Self {
        QueryFilter::Family(family)
    }
}

/// A cached query result, assigned wholesale to an entry
#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    Clients(Vec<Client>),
    MetricsSummary(MetricsSummary),
    ProbabilityDistribution(ProbabilityDistribution),
    ContactProgress(ContactProgress),
    Heatmap(Heatmap),
    HeatmapVariables(HeatmapVariables),
}

impl QueryData {
    pub fn family(&self) -> QueryFamily {
        match self {
            QueryData::Clients(_) => QueryFamily::PriorityList,
            QueryData::MetricsSummary(_) => QueryFamily::MetricsSummary,
            QueryData::ProbabilityDistribution(_) => QueryFamily::ProbabilityDistribution,
            QueryData::ContactProgress(_) => QueryFamily::ContactProgress,
            QueryData::Heatmap(_) => QueryFamily::Heatmap,
            QueryData::HeatmapVariables(_) => QueryFamily::HeatmapVariables,
        }
    }

    pub fn as_clients(&self) -> Option<&[Client]> {
        match self {
            QueryData::Clients(clients) => Some(clients),
            _ => None,
        }
    }

    pub fn as_contact_progress(&self) -> Option<&ContactProgress> {
        match self {
            QueryData::ContactProgress(progress) => Some(progress),
            _ => None,
        }
    }
}

macro_rules! query_data_conversions {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for QueryData {
                fn from(value: $ty) -> Self {
                    QueryData::$variant(value)
                }
            }

            impl TryFrom<QueryData> for $ty {
                type Error = QueryData;

                fn try_from(data: QueryData) -> Result<Self, Self::Error> {
                    match data {
                        QueryData::$variant(value) => Ok(value),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

query_data_conversions! {
    Clients => Vec<Client>,
    MetricsSummary => MetricsSummary,
    ProbabilityDistribution => ProbabilityDistribution,
    ContactProgress => ContactProgress,
    Heatmap => Heatmap,
    HeatmapVariables => HeatmapVariables,
}
