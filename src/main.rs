use clap::Parser;
use zymeflow::utils::error::{ErrorSeverity, ZymeError};
use zymeflow::utils::{logger, validation::Validate};
use zymeflow::{CandidatePipeline, CliConfig, EtlEngine, LigandQuery, RunDirectory};

fn exit_code(e: &ZymeError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn report(e: &ZymeError) {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting zymeflow");
    tracing::debug!("CLI config: {:?}", config);

    let settings = match config
        .validate()
        .and_then(|_| config.resolve_settings())
        .and_then(|settings| settings.validate().map(|_| settings))
    {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            report(&e);
            std::process::exit(exit_code(&e));
        }
    };

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let ligand = LigandQuery::new(config.ligand.clone());
    let run_dir = match RunDirectory::claim(&settings.run.output_root, &ligand) {
        Ok(run_dir) => run_dir,
        Err(ZymeError::AlreadyProcessed { path }) => {
            tracing::info!("⏭️ Output directory {} exists, ligand already processed", path);
            println!("⏭️ Already processed: {}", path);
            return;
        }
        Err(e) => {
            report(&e);
            std::process::exit(exit_code(&e));
        }
    };

    let pipeline = CandidatePipeline::from_config(&settings, ligand, &run_dir);
    let engine = EtlEngine::new_with_monitoring(pipeline, config.monitor);

    match engine.run().await {
        Ok(outcome) => {
            println!("✅ {} completed", outcome.run_id);
            println!(
                "🧬 {} → {} ({})",
                outcome.ligand, outcome.enzyme.name, outcome.record.accession_id
            );
            if let Some(structure) = &outcome.structure {
                println!("🧊 Structure: {}", structure.filename);
            }
            if let Some(ligand_structure) = &outcome.ligand_structure {
                println!("⚗️ Ligand structure: {}", ligand_structure.filename);
            }
            println!("🧪 Candidates written: {}", outcome.candidates_written);
            for failure in &outcome.failed_candidates {
                println!("⚠️ candidate_{} skipped: {}", failure.index, failure.reason);
            }
            println!("📁 Manifest: {}", outcome.manifest_path.display());
        }
        Err(e) if e.is_not_found() => {
            tracing::info!("🔎 {}", e);
            println!("🔎 {}", e.user_friendly_message());
            println!("💡 {}", e.recovery_suggestion());
        }
        Err(e) => {
            report(&e);
            let code = exit_code(&e);
            if code > 0 {
                std::process::exit(code);
            }
        }
    }
}
