//! Report output: CSV file or console table.

use crate::error::Result;
use crate::pipeline::{IndustryPaper, REPORT_COLUMNS};
use comfy_table::{presets, Table};
use std::path::Path;
use tracing::info;

/// Write rows as CSV with a header row and no index column.
pub fn save_csv(path: &Path, rows: &[IndustryPaper]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    for row in rows {
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    info!(path = %path.display(), rows = rows.len(), "Saved CSV");
    Ok(())
}

/// Render rows as a console table.
pub fn render_table(rows: &[IndustryPaper]) -> String {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_header(REPORT_COLUMNS.to_vec());

    for row in rows {
        table.add_row(row.cells().to_vec());
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_row() -> IndustryPaper {
        IndustryPaper {
            pmid: "38000001".to_string(),
            title: "Base editing, in vivo".to_string(),
            pub_date: "2024".to_string(),
            industry_authors: "Ana Rivera; Raj Patel".to_string(),
            company_affiliations: "Verve Therapeutics; Acme Pharma".to_string(),
            corresponding_email: "ana@verve.com".to_string(),
        }
    }

    #[test]
    fn test_save_csv_header_and_row() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("papers.csv");

        save_csv(&path, &[sample_row()])?;

        let content = std::fs::read_to_string(&path)?;
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("PubmedID,Title,Publication Date,Non-academic Author(s),Company Affiliation(s),Corresponding Author Email")
        );
        assert_eq!(
            lines.next(),
            Some("38000001,\"Base editing, in vivo\",2024,Ana Rivera; Raj Patel,Verve Therapeutics; Acme Pharma,ana@verve.com")
        );
        assert_eq!(lines.next(), None);
        Ok(())
    }

    #[test]
    fn test_render_table_has_all_columns() {
        let rendered = render_table(&[sample_row()]);
        for column in ["PubmedID", "Title", "Corresponding Author Email"] {
            assert!(rendered.contains(column), "missing {column}");
        }
        assert!(rendered.contains("38000001"));
        assert!(rendered.contains("ana@verve.com"));
    }
}
