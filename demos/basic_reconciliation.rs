//! Basic reconciliation example

use serde_json::json;
use tracing_subscriber::EnvFilter;
use transfer_acceptance::utils::{MemoryDrive, MemoryLedger};
use transfer_acceptance::{
    Owner, ReconcilerConfig, RemoteItem, StaticIdentity, TransferReconciler, FOLDER_MIME_TYPE,
};

const ME: &str = "new.owner@example.com";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ReconcilerConfig::default();
    let ledger = MemoryLedger::new(config.ledger.clone());
    let drive = MemoryDrive::new(ME);

    // A folder whose recorded parent still belongs to us
    drive.add_folder("projects", "Projects", ME, drive.root_id())?;
    ledger.push_row(vec![
        json!("folder-1"), json!("Reports"), json!(FOLDER_MIME_TYPE), json!("projects"),
        json!("/Projects/Reports"), json!("old@example.com"), json!("Fulano de Tal"),
        json!(""), json!(true), json!(""),
    ])?;
    drive.insert(RemoteItem {
        id: "folder-1".to_string(),
        title: "Reports".to_string(),
        mime_type: FOLDER_MIME_TYPE.to_string(),
        owners: vec![Owner::new(ME)],
        parents: vec!["projects".to_string()],
        description: Some(
            "ID da pasta: projects\nCaminho: /Projects/Reports\nProprietário antes da transferência: Fulano de Tal"
                .to_string(),
        ),
    })?;

    // A file whose recorded parent was deleted
    ledger.push_row(vec![
        json!("file-1"), json!("budget.xlsx"), json!("application/vnd.ms-excel"),
        json!("deleted"), json!("/Finance"), json!("old@example.com"), json!("Fulano de Tal"),
        json!(""), json!("true"), json!(""),
    ])?;
    drive.insert(RemoteItem {
        id: "file-1".to_string(),
        title: "budget.xlsx".to_string(),
        mime_type: "application/vnd.ms-excel".to_string(),
        owners: vec![Owner::new(ME)],
        parents: vec!["shared-with-me".to_string()],
        description: Some(
            "ID da pasta: deleted\nCaminho: /Finance\nProprietário antes da transferência: Fulano de Tal"
                .to_string(),
        ),
    })?;

    let mut reconciler =
        TransferReconciler::with_config(ledger.clone(), drive.clone(), StaticIdentity::new(ME), config);

    for report in reconciler.reconcile_all().await? {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    for (row, status) in ledger.writes()? {
        println!("row {} -> {}", row, status);
    }

    Ok(())
}
