pub mod analytics;
pub mod categorize;
pub mod derive;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod quality;
pub mod table;

pub use analytics::{
    analyze_metric, filter_by_category, rank_by_account, AccountFilter, AccountRanking,
    AccountTotals, MetricReport, MetricSummary, Order, PercentileBucket, Thresholds,
};
pub use categorize::Category;
pub use error::EngineError;
pub use pipeline::{enrich_table, run_pipeline, PipelineSummary};
pub use quality::QualityReport;
pub use table::{read_table, write_table, Table};
