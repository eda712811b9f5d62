pub mod formatter;

pub use formatter::{
    format_classes, format_counts, format_points, format_score_sheet, format_sheet_tsv,
    format_templates, format_violations, should_use_colors,
};
