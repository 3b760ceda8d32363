//! Report building: grouping, ordering and serialising the aggregated dataset.

pub mod dataset;
pub mod markdown;
pub mod pdf;

use crate::domain::model::{CitationRecord, OutputFormat, OutputRecord, ReportSettings};
use crate::utils::error::Result;
use chrono::NaiveDate;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// 至少有一筆引用的資源，依引用數由多到少
    pub resources: Vec<OutputRecord>,
    /// 依年份分組的引用作品，年份由新到舊，未知年份排最後
    pub publications: Vec<YearBucket>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearBucket {
    pub year: Option<String>,
    pub citations: Vec<CitationRecord>,
}

impl Report {
    pub fn publication_count(&self) -> usize {
        self.publications.iter().map(|bucket| bucket.citations.len()).sum()
    }
}

/// Groups the aggregate into the report layout.
///
/// A work cited by several resources is listed once: resources are visited in
/// report order and citations within a resource by DOI, the first occurrence wins.
pub fn build_report(records: &[OutputRecord]) -> Report {
    let mut resources: Vec<OutputRecord> = records
        .iter()
        .filter(|record| record.citations_count > 0)
        .cloned()
        .collect();
    // 穩定排序，引用數相同時保留彙整順序
    resources.sort_by_key(|record| Reverse(record.citations_count));

    let mut seen: HashSet<&str> = HashSet::new();
    let mut by_year: BTreeMap<Option<&str>, Vec<CitationRecord>> = BTreeMap::new();

    for resource in &resources {
        let mut citations: Vec<&CitationRecord> = resource.citations.iter().collect();
        citations.sort_by(|a, b| a.doi.cmp(&b.doi));

        for citation in citations {
            if seen.insert(citation.doi.as_str()) {
                by_year
                    .entry(citation.publication_year.as_deref())
                    .or_default()
                    .push(citation.clone());
            }
        }
    }

    let publications = by_year
        .into_iter()
        .rev()
        .map(|(year, mut citations)| {
            citations.sort_by(|a, b| {
                b.publication_date
                    .cmp(&a.publication_date)
                    .then_with(|| a.doi.cmp(&b.doi))
            });
            YearBucket {
                year: year.map(str::to_string),
                citations,
            }
        })
        .collect();

    Report {
        resources,
        publications,
    }
}

/// Serialises the aggregate in the requested format.
pub async fn render(
    records: &[OutputRecord],
    format: OutputFormat,
    settings: &ReportSettings,
    today: NaiveDate,
) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Json => dataset::to_json(records),
        OutputFormat::Csv => dataset::to_csv(records),
        OutputFormat::Markdown => {
            let report = build_report(records);
            Ok(markdown::render_markdown(&report, &settings.title, today).into_bytes())
        }
        OutputFormat::Pdf => {
            let report = build_report(records);
            let text = markdown::render_markdown(&report, &settings.title, today);
            pdf::convert_to_pdf(&text, settings).await
        }
    }
}
