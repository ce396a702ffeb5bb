pub mod formatter;

pub use formatter::{
    format_bar, format_insights, format_json, format_ranked_table, format_result_detail,
    format_tsv, should_use_colors,
};
