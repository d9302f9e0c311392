//! Sample records used across unit tests.

use prometeo_domain::{
    Client, ClientId, ClientPriority, ClientStatus, ContactProgress, MetricsSummary, Probability,
};

pub fn client(id: i64, probability: f64, status: ClientStatus) -> Client {
    Client {
        id: ClientId::new(id),
        user_id: format!("U{:04}", id),
        probability: Probability::new(probability).unwrap_or_else(|e| panic!("{e}")),
        status,
        age: Some(30 + id as u32),
        income_range: Some("medio".to_string()),
        risk_profile: Some("moderado".to_string()),
        products: vec!["cuenta".to_string()],
        priority: Some(ClientPriority::High),
    }
}

/// One priority-list page: ids 1..=3, all pending
pub fn sample_clients() -> Vec<Client> {
    vec![
        client(1, 0.92, ClientStatus::Pending),
        client(2, 0.81, ClientStatus::Pending),
        client(3, 0.67, ClientStatus::Pending),
    ]
}

pub fn sample_summary() -> MetricsSummary {
    MetricsSummary {
        total_clients: 1200,
        churn_risk_mean: 0.31,
        contacted: 140,
        conversion_rate: 0.12,
        at_risk_count: 87,
        potential_clients: 300,
        expected_conversion: 36.0,
        financial_opportunity: 125_000.0,
        contact_progress: 0.46,
    }
}

pub fn sample_progress() -> ContactProgress {
    ContactProgress {
        total_contacted: 140,
        total_prioritized: 300,
        monthly_target: 200,
        contacted_this_month: 90,
        days_remaining: 10,
        daily_needed: 11.0,
        daily_expected: 9.0,
        difference: -20.0,
        remaining_contacts: 110,
        projection_message: "A este ritmo no se alcanza la meta".to_string(),
    }
}
