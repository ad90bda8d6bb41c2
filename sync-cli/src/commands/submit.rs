//! Submit a write.

use anyhow::{Context, Result};
use clap::ValueEnum;
use sync_client::{endpoint_for, Accepted, OperationType};

use super::App;

/// Queueable write kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    /// Marketplace listing
    Listing,
    /// Loan application
    Loan,
    /// Insurance claim
    Claim,
    /// Crop diagnosis request
    Diagnosis,
}

impl Kind {
    /// Queue tag for this kind.
    pub fn operation_type(self) -> OperationType {
        match self {
            Kind::Listing => OperationType::Listing,
            Kind::Loan => OperationType::Loan,
            Kind::Claim => OperationType::Claim,
            Kind::Diagnosis => OperationType::Diagnosis,
        }
    }
}

/// Run the submit command.
pub async fn run(app: &App, kind: Kind, payload: &str) -> Result<Accepted> {
    let payload: serde_json::Value =
        serde_json::from_str(payload).context("Payload is not valid JSON")?;
    let operation_type = kind.operation_type();
    let endpoint = endpoint_for(&operation_type)
        .with_context(|| format!("No endpoint for {}", operation_type))?;

    let accepted = app
        .gateway()
        .submit(operation_type, endpoint, payload)
        .await
        .context("Submit failed")?;

    match &accepted {
        Accepted::Confirmed { response } => {
            println!("Confirmed by {}", endpoint);
            println!("  Response: {}", response);
        }
        Accepted::Queued { item } => {
            println!("Queued for sync");
            println!("  ID:       {}", item.id);
            println!("  Endpoint: {}", item.endpoint);
            println!("  Pending:  {}", app.queue.count()?);
        }
    }

    Ok(accepted)
}
