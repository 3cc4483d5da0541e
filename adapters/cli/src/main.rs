#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line front end for the Huarongdao sliding-block puzzle.

mod cli;
mod config;
mod edit;
mod layout_transfer;
mod play;
mod render;

use std::{
    collections::BTreeMap,
    fs,
    io::{self, Read},
    path::Path,
};

use anyhow::{bail, ensure, Context, Result};
use chrono::Utc;
use clap::Parser;
use huarongdao_catalog::{
    builtin_level, builtin_levels, find_custom_level, list_custom_levels, new_custom_level,
    resolve_level, CustomLevel,
};
use huarongdao_core::{Board, CustomLevelId, LevelKey, VICTORY_CELL};
use huarongdao_storage::{BestRecord, FileStore, KeyValueStore, Storage};
use huarongdao_system_builder::Editor;
use huarongdao_system_movement::apply_move;
use huarongdao_system_validation::LayoutReport;
use huarongdao_system_victory::is_solved;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Cli, Command},
    config::Config,
    edit::Draft,
    layout_transfer::{import_layout, LayoutFile},
};

/// Entry point for the Huarongdao command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    info!(data_dir = %config.data_dir.display(), "starting");

    let mut storage = Storage::new(FileStore::new(config.data_dir.clone()));
    match cli.command {
        Command::Levels => levels(&storage),
        Command::Play { level } => {
            let key = parse_level_key(&level);
            let resolved =
                resolve_level(&storage, &key).with_context(|| format!("no level named {level}"))?;
            let mut input = io::stdin().lock();
            let mut out = io::stdout().lock();
            play::run(key, resolved, &config, Some(&mut storage), &mut input, &mut out)
        }
        Command::Replay { level } => replay(level),
        Command::Records { clear } => records(&mut storage, clear),
        Command::Edit { id } => {
            let (editor, draft) = match id {
                Some(id) => {
                    let level = custom_level(&storage, &id)?;
                    let draft = Draft {
                        id: Some(level.id.clone()),
                        name: level.name.clone(),
                        description: level.description.clone(),
                    };
                    (Editor::from_custom(&level), draft)
                }
                None => (Editor::new(), Draft::untitled()),
            };
            let mut input = io::stdin().lock();
            let mut out = io::stdout().lock();
            edit::run(editor, draft, &config, &mut storage, &mut input, &mut out)
        }
        Command::Import { path } => import(&mut storage, &path),
        Command::Export { id, out } => {
            let level = custom_level(&storage, &id)?;
            let json = LayoutFile::export(&level, Utc::now()).to_json()?;
            match out {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("exported '{}' to {}", level.name, path.display());
                }
                None => println!("{json}"),
            }
            Ok(())
        }
        Command::Validate { path, json } => validate(&path, json),
        Command::Share { id } => {
            let level = custom_level(&storage, &id)?;
            println!("{}", LayoutFile::export(&level, Utc::now()).share_code()?);
            Ok(())
        }
        Command::Delete { id } => {
            if !storage.delete_custom_level(&CustomLevelId::new(id.as_str()))? {
                bail!("no custom level with id {id}");
            }
            println!("deleted {id}");
            Ok(())
        }
    }
}

/// Numbers name built-in levels; anything else is a custom level id, with or
/// without its `custom_` record prefix.
fn parse_level_key(text: &str) -> LevelKey {
    if let Ok(number) = text.parse::<u32>() {
        return LevelKey::BuiltIn(number);
    }
    let id = text.strip_prefix("custom_").unwrap_or(text);
    LevelKey::Custom(CustomLevelId::new(id))
}

fn custom_level<B: KeyValueStore>(storage: &Storage<B>, id: &str) -> Result<CustomLevel> {
    find_custom_level(storage, &CustomLevelId::new(id))
        .with_context(|| format!("no custom level with id {id}"))
}

fn best_text(records: &BTreeMap<String, BestRecord>, key: &LevelKey) -> String {
    records
        .get(&key.record_key())
        .copied()
        .unwrap_or_default()
        .to_string()
}

fn levels<B: KeyValueStore>(storage: &Storage<B>) -> Result<()> {
    let records = storage.records()?;

    println!("built-in levels:");
    for (number, level) in builtin_levels() {
        let target = level
            .solution()
            .map_or_else(|| String::from("?"), |solution| solution.min_moves().to_string());
        println!(
            "  {number:>2}  {}  {}  (par {target})  best {}",
            level.name(),
            level.description(),
            best_text(&records, &LevelKey::BuiltIn(number))
        );
    }

    let custom = list_custom_levels(storage);
    if custom.is_empty() {
        println!("no custom levels");
        return Ok(());
    }
    println!("custom levels:");
    for summary in custom {
        println!(
            "  {}  {}  ({} pieces, updated {})  best {}",
            summary.id,
            summary.name,
            summary.piece_count,
            summary.updated_at.format("%Y-%m-%d %H:%M"),
            best_text(&records, &LevelKey::Custom(summary.id.clone()))
        );
    }
    Ok(())
}

fn replay(number: u32) -> Result<()> {
    let level = builtin_level(number).with_context(|| format!("no built-in level {number}"))?;
    let solution = level
        .solution()
        .with_context(|| format!("level {number} has no reference solution"))?;

    println!("{}: {}", level.name(), level.description());
    let mut board = level.board().clone();
    println!("{}", render::board(&board));
    for (index, step) in solution.steps().iter().enumerate() {
        board = apply_move(&board, &step.piece, step.direction).with_context(|| {
            format!(
                "step {} ({} {}) cannot be played",
                index + 1,
                step.piece,
                step.direction
            )
        })?;
        println!("{}. {} {}", index + 1, step.piece, step.direction);
        println!("{}", render::board(&board));
    }

    ensure!(
        is_solved(&board, VICTORY_CELL),
        "the reference solution of level {number} does not free the protagonist"
    );
    println!("solved in {} moves", solution.steps().len());
    Ok(())
}

fn records<B: KeyValueStore>(storage: &mut Storage<B>, clear: bool) -> Result<()> {
    if clear {
        storage.clear_records()?;
        println!("records cleared");
        return Ok(());
    }

    let records = storage.records()?;
    if records.is_empty() {
        println!("no records yet");
    }
    for (key, record) in records {
        println!("  {key}  {record}");
    }
    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        let _ = io::stdin()
            .read_to_string(&mut text)
            .context("failed to read standard input")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn import<B: KeyValueStore>(storage: &mut Storage<B>, path: &Path) -> Result<()> {
    let now = Utc::now();
    let imported = import_layout(&read_source(path)?, now)?;
    let report = LayoutReport::of(&Board::standard(imported.pieces.clone()));
    ensure!(report.valid, "layout is invalid: {}", report.message);

    if let Some(source_id) = &imported.source_id {
        println!("source id {source_id}");
    }
    println!("imported at {}", imported.imported_at.to_rfc3339());

    let id = new_custom_level(&*storage, now, &mut rand::thread_rng()).id;
    let saved = storage.save_custom_level(&id, imported.into_draft(), now)?;
    println!("imported '{}' as {}", saved.name, saved.id);
    Ok(())
}

fn validate(path: &Path, json: bool) -> Result<()> {
    let imported = import_layout(&read_source(path)?, Utc::now())?;
    let report = LayoutReport::of(&Board::standard(imported.pieces));
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.message);
    }
    ensure!(report.valid, "layout is invalid");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_keys_accept_numbers_and_custom_ids() {
        assert_eq!(parse_level_key("3"), LevelKey::BuiltIn(3));
        assert_eq!(
            parse_level_key("1700000000000_abc123xyz"),
            LevelKey::Custom(CustomLevelId::new("1700000000000_abc123xyz"))
        );
        assert_eq!(
            parse_level_key("custom_1700000000000_abc123xyz"),
            LevelKey::Custom(CustomLevelId::new("1700000000000_abc123xyz"))
        );
    }
}
