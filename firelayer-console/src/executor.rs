//! Command execution against the current connection.

use firelayer::{
    bson::Bson,
    json::{JsonOptions, bson_to_json},
    path::split_document_path,
    primitives::QueryRunner,
    query::DEFAULT_LIMIT,
    registry::Registry,
    relation::{ModelInfo, Related},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::{
    commands::{self, Command},
    error::{ConsoleError, ConsoleResult},
    formatter::Formatter,
};

/// Result of executing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Output to display.
    Output(String),
    /// Exit the REPL.
    Exit,
    /// Show history.
    ShowHistory,
    /// Clear screen.
    Clear,
}

/// Runs a parsed command and formats its result.
pub async fn execute(
    registry: &Registry,
    command: Command,
    formatter: &dyn Formatter,
) -> ConsoleResult<CommandResult> {
    debug!(?command, "executing console command");

    let output = match command {
        Command::Help => commands::help().to_string(),
        Command::Exit => return Ok(CommandResult::Exit),
        Command::History => return Ok(CommandResult::ShowHistory),
        Command::Clear => return Ok(CommandResult::Clear),
        Command::Models => describe_models(registry),

        Command::Get { path } => {
            let (collection, id) = split_document_path(&path)?;
            let document = QueryRunner::new(collection)?.get(id).await?;
            formatter.format_document(&bson_to_json(Bson::Document(document)))
        }
        Command::List { collection, limit } => {
            let documents = QueryRunner::new(collection)?
                .all(limit.unwrap_or(DEFAULT_LIMIT))
                .await?;
            formatter.format_documents(&to_json(documents))
        }
        Command::Where {
            collection,
            condition,
        } => {
            let documents = QueryRunner::new(collection)?
                .filter(condition, DEFAULT_LIMIT)
                .await?;
            formatter.format_documents(&to_json(documents))
        }
        Command::Order { collection, order } => {
            let documents = QueryRunner::new(collection)?
                .order(order, DEFAULT_LIMIT)
                .await?;
            formatter.format_documents(&to_json(documents))
        }

        Command::Find { model, target } => {
            let entity = lookup(registry, &model)?.find(&target).await?;
            formatter.format_document(&entity.entity_json(&JsonOptions::new()).await?)
        }
        Command::All { model, limit } => {
            let mut collection = lookup(registry, &model)?.collection();
            if let Some(limit) = limit {
                collection = collection.limit_any(limit);
            }
            formatter.format_documents(&collection.json_any(false).await?)
        }
        Command::First { model } => {
            match lookup(registry, &model)?.collection().first_any().await? {
                Some(entity) => {
                    formatter.format_document(&entity.entity_json(&JsonOptions::new()).await?)
                }
                None => "No results".to_string(),
            }
        }
        Command::Count { model } => lookup(registry, &model)?
            .collection()
            .count_any()
            .await?
            .to_string(),
        Command::Filter { model, condition } => {
            let collection = lookup(registry, &model)?
                .collection()
                .filter_any(condition);
            formatter.format_documents(&collection.json_any(false).await?)
        }
        Command::Sort { model, order } => {
            let collection = lookup(registry, &model)?.collection().order_any(order);
            formatter.format_documents(&collection.json_any(false).await?)
        }
        Command::Related {
            model,
            target,
            accessor,
        } => {
            let entity = lookup(registry, &model)?.find(&target).await?;
            match registry.related(entity.as_ref(), &accessor).await? {
                Related::One(Some(found)) => {
                    formatter.format_document(&found.entity_json(&JsonOptions::new()).await?)
                }
                Related::One(None) => "null".to_string(),
                Related::Many(collection) => {
                    formatter.format_documents(&collection.json_any(false).await?)
                }
            }
        }
    };

    Ok(CommandResult::Output(output))
}

fn lookup<'r>(registry: &'r Registry, model: &str) -> ConsoleResult<&'r Arc<ModelInfo>> {
    registry
        .model(model)
        .ok_or_else(|| ConsoleError::UnknownModel(model.to_string()))
}

fn to_json(documents: Vec<firelayer::bson::Document>) -> Vec<Value> {
    documents
        .into_iter()
        .map(|document| bson_to_json(Bson::Document(document)))
        .collect()
}

/// Lists registered models with their collections, fields and relationships.
fn describe_models(registry: &Registry) -> String {
    let mut models: Vec<&Arc<ModelInfo>> = registry.models().collect();
    if models.is_empty() {
        return "No models registered".to_string();
    }
    models.sort_by_key(|info| info.name());

    let mut lines = Vec::new();
    for info in models {
        lines.push(format!("{} ({})", info.name(), info.collection_name()));

        let fields: Vec<&str> = info.fields().iter().map(|field| field.name).collect();
        if !fields.is_empty() {
            lines.push(format!("  fields: {}", fields.join(", ")));
        }

        for relation in registry.relations_of(info.name()) {
            lines.push(format!(
                "  {} {} -> {} via {}",
                relation.kind,
                relation.accessor,
                relation.target.name(),
                relation.foreign_key
            ));
        }
    }

    lines.join("\n")
}
