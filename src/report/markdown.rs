use crate::report::Report;
use chrono::NaiveDate;
use std::fmt::{self, Write};

/// Renders the report as Markdown. Pure: same report and date, same text.
pub fn render_markdown(report: &Report, title: &str, today: NaiveDate) -> String {
    let mut out = String::new();
    // 寫入 String 不會失敗
    let _ = write_markdown(&mut out, report, title, today);
    out
}

fn write_markdown(out: &mut String, report: &Report, title: &str, today: NaiveDate) -> fmt::Result {
    writeln!(out, "# {}\n", title)?;
    writeln!(out, "_{}_\n", today.format("%B %d, %Y"))?;
    writeln!(
        out,
        "{} publications cite {} resources.\n",
        report.publication_count(),
        report.resources.len()
    )?;

    writeln!(out, "## Resources\n")?;
    writeln!(out, "| Resource | Citations |")?;
    writeln!(out, "|:---|---:|")?;
    for resource in &report.resources {
        let label = escape_cell(resource.title.as_deref().unwrap_or(&resource.doi));
        let link = resource
            .doi_url
            .clone()
            .unwrap_or_else(|| crate::utils::doi::doi_url(&resource.doi));
        writeln!(out, "| [{}]({}) | {} |", label, link, resource.citations_count)?;
    }
    writeln!(out)?;

    writeln!(out, "## Publications")?;
    for bucket in &report.publications {
        writeln!(
            out,
            "\n### {}\n",
            bucket.year.as_deref().unwrap_or("Unknown year")
        )?;
        for citation in &bucket.citations {
            writeln!(out, "* {}", citation.citation)?;
        }
    }

    Ok(())
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
