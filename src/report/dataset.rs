use crate::domain::model::OutputRecord;
use crate::utils::error::Result;
use serde::Serialize;

/// 一列代表一條引用關係（資源, 引用作品）
#[derive(Debug, Serialize)]
struct CitationRow<'a> {
    resource_doi: &'a str,
    resource_title: Option<&'a str>,
    citation_doi: &'a str,
    citation_year: Option<&'a str>,
    citation_date: Option<&'a str>,
    citation_title: Option<&'a str>,
    citation: &'a str,
}

pub fn to_json(records: &[OutputRecord]) -> Result<Vec<u8>> {
    let mut json = serde_json::to_vec_pretty(records)?;
    json.push(b'\n');
    Ok(json)
}

pub fn from_json(data: &[u8]) -> Result<Vec<OutputRecord>> {
    let mut records: Vec<OutputRecord> = serde_json::from_slice(data)?;
    // 舊的輸出檔可能沒有 citations_count
    for record in &mut records {
        record.citations_count = record.citations.len();
    }
    Ok(records)
}

pub fn to_csv(records: &[OutputRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for record in records {
        for citation in &record.citations {
            writer.serialize(CitationRow {
                resource_doi: &record.doi,
                resource_title: record.title.as_deref(),
                citation_doi: &citation.doi,
                citation_year: citation.publication_year.as_deref(),
                citation_date: citation.publication_date.as_deref(),
                citation_title: citation.title.as_deref(),
                citation: &citation.citation,
            })?;
        }
    }

    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error().into())
}
