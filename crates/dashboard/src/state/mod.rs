//! View models: pure functions of cached data, never touching the network

pub mod client_table;
pub mod contact_progress;
pub mod export;
pub mod notice;

pub use client_table::{ClientTable, SortColumn, SortDirection};
pub use contact_progress::{progress_percent, ProgressTone, ProgressView, TargetEditor};
pub use export::{ExportFilter, PRIORITY_OPTIONS, RISK_PROFILE_OPTIONS};
pub use notice::{MutationNotice, NoticeLevel};
