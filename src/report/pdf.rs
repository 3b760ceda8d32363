use crate::domain::model::ReportSettings;
use crate::utils::error::{EtlError, Result};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const PANDOC_HEADER: &str = "---
geometry: margin=1in
colored-links: true
linkcolor: blue
urlcolor: orange
...
";

/// Pipes Markdown through pandoc and returns the PDF bytes.
pub async fn convert_to_pdf(markdown: &str, settings: &ReportSettings) -> Result<Vec<u8>> {
    tracing::info!(pandoc = %settings.pandoc, engine = %settings.pdf_engine, "converting report to pdf");

    let mut child = Command::new(&settings.pandoc)
        .args(["--from", "markdown", "--to", "pdf", "--output", "-"])
        .arg(format!("--pdf-engine={}", settings.pdf_engine))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| EtlError::ReportConversionError {
            message: format!("failed to start {}: {}", settings.pandoc, e),
        })?;

    let mut stdin = child.stdin.take().ok_or_else(|| EtlError::ReportConversionError {
        message: "pandoc stdin unavailable".to_string(),
    })?;
    let input = format!("{}\n{}", PANDOC_HEADER, markdown);
    // 一邊寫入 stdin 一邊讀 stdout，避免 pipe 塞滿
    let writer = tokio::spawn(async move {
        stdin.write_all(input.as_bytes()).await?;
        stdin.shutdown().await
    });

    let output = child.wait_with_output().await?;
    let written = writer.await.map_err(|e| EtlError::ReportConversionError {
        message: format!("stdin writer failed: {}", e),
    })?;

    if !output.status.success() {
        return Err(EtlError::ReportConversionError {
            message: format!(
                "pandoc exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }
    written?;

    Ok(output.stdout)
}
