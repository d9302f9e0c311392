//! Priority table view model: sort state and page navigation.
//!
//! Sorting works on a copy; the cached page keeps the server's order.

use std::cmp::Ordering;

use prometeo_domain::Client;
use prometeo_shared::PageRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    UserId,
    Probability,
    Status,
    Age,
    IncomeRange,
    RiskProfile,
    Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientTable {
    pub column: SortColumn,
    pub direction: SortDirection,
    pub page: PageRequest,
}

impl Default for ClientTable {
    fn default() -> Self {
        Self::new(PageRequest::default().size)
    }
}

impl ClientTable {
    /// Highest probability first, on page one
    pub fn new(page_size: u32) -> Self {
        Self {
            column: SortColumn::Probability,
            direction: SortDirection::Desc,
            page: PageRequest::new(1, page_size),
        }
    }

    /// Clicking the active column flips direction; another column starts descending
    pub fn toggle_sort(&mut self, column: SortColumn) {
        if self.column == column {
            self.direction = self.direction.flipped();
        } else {
            self.column = column;
            self.direction = SortDirection::Desc;
        }
    }

    pub fn sorted(&self, clients: &[Client]) -> Vec<Client> {
        let mut rows = clients.to_vec();
        rows.sort_by(|a, b| {
            let ordering = compare(self.column, a, b);
            match self.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        rows
    }

    pub fn has_previous(&self) -> bool {
        self.page.page > 1
    }

    /// A short page means the server has nothing after it
    pub fn has_next(&self, rows_on_page: usize) -> bool {
        rows_on_page >= self.page.size as usize
    }

    pub fn previous_page(&mut self) {
        self.page = PageRequest::new(self.page.page.saturating_sub(1), self.page.size);
    }

    pub fn next_page(&mut self, rows_on_page: usize) {
        if self.has_next(rows_on_page) {
            self.page = PageRequest::new(self.page.page.saturating_add(1), self.page.size);
        }
    }
}

fn compare(column: SortColumn, a: &Client, b: &Client) -> Ordering {
    match column {
        SortColumn::Probability => a.probability.value().total_cmp(&b.probability.value()),
        SortColumn::Age => match (a.age, b.age) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => text(column, a).cmp(&text(column, b)),
        },
        _ => text(column, a).cmp(&text(column, b)),
    }
}

/// Display text of a cell; missing values sort as empty strings
fn text(column: SortColumn, client: &Client) -> String {
    match column {
        SortColumn::UserId => client.user_id.clone(),
        SortColumn::Probability => client.probability.value().to_string(),
        SortColumn::Status => client.status.as_str().to_string(),
        SortColumn::Age => client.age.map(|a| a.to_string()).unwrap_or_default(),
        SortColumn::IncomeRange => client.income_range.clone().unwrap_or_default(),
        SortColumn::RiskProfile => client.risk_profile.clone().unwrap_or_default(),
        SortColumn::Priority => client
            .priority
            .map(|p| p.as_str().to_string())
            .unwrap_or_default(),
    }
}
