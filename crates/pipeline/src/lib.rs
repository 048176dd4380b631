mod aggregate;
mod normalize;
mod parser;
mod report;
mod types;

pub use normalize::{normalize_record, normalize_visits};
pub use parser::{AmountParse, DateParse, parse_amount, parse_visit_date, parse_visit_time};
pub use report::{RankingReport, ReportData, SCHEMA_VERSION, aggregate_records, build_report};
pub use types::{PipelineError, PipelineIssue, PipelineStats, Result};
