use citation_etl::utils::{logger, validation::Validate};
use citation_etl::{CitationPipeline, CliConfig, EtlEngine, EtlError, LocalStorage};
use clap::Parser;

fn fail(e: &EtlError) -> ! {
    tracing::error!(
        "❌ Citation ETL failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 嚴重程度為 Low 的錯誤仍回傳非零，因為沒有產生輸出檔
    std::process::exit(e.exit_code().max(1));
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(config.verbose, config.log_json);

    tracing::info!("Starting citation-etl");

    let config = match config.load_config_file() {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    // 輸出路徑可以是絕對路徑，也可以相對於目前目錄
    let storage = LocalStorage::new(".");
    let pipeline = match CitationPipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => fail(&e),
    };

    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Citation ETL completed successfully!");
            println!("✅ Citation ETL completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => fail(&e),
    }
}
