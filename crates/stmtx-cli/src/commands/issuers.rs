//! Issuers command - list the bundled statement formats.

use std::sync::Arc;

use clap::Args;
use console::style;
use serde::Serialize;

use stmtx_core::extractors::default_table;
use stmtx_core::SecurityRegistry;

/// Arguments for the issuers command.
#[derive(Args)]
pub struct IssuersArgs {
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct IssuerInfo {
    label: String,
    document_types: Vec<DocumentTypeInfo>,
}

#[derive(Serialize)]
struct DocumentTypeInfo {
    name: String,
    blocks: usize,
}

pub async fn run(args: IssuersArgs) -> anyhow::Result<()> {
    let table = default_table(Arc::new(SecurityRegistry::new()))?;

    let issuers: Vec<IssuerInfo> = table
        .issuers()
        .iter()
        .map(|issuer| IssuerInfo {
            label: issuer.label().to_string(),
            document_types: issuer
                .document_types()
                .iter()
                .map(|t| DocumentTypeInfo {
                    name: t.name().to_string(),
                    blocks: t.blocks().len(),
                })
                .collect(),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&issuers)?);
        return Ok(());
    }

    for issuer in &issuers {
        println!("{}", style(&issuer.label).bold());
        for doc_type in &issuer.document_types {
            println!("  - {} ({} block pipeline(s))", doc_type.name, doc_type.blocks);
        }
    }

    Ok(())
}
