use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use huarongdao_catalog::{new_custom_level, DEFAULT_CUSTOM_DESCRIPTION, DEFAULT_CUSTOM_NAME};
use huarongdao_core::{CellCoord, CustomLevelId, LevelKey, PieceKind};
use huarongdao_storage::{CustomLevelDraft, KeyValueStore, Storage};
use huarongdao_system_builder::{EditOutcome, Editor};
use huarongdao_system_validation::LayoutReport;
use tracing::debug;

use crate::{config::Config, play, render};

const DRAFT_ID: &str = "draft";

const HELP: &str = "\
commands:
  place <kind> <column> <row>    place a piece with its top-left corner at the cell
  remove <column> <row>          remove the piece covering the cell
  toggle <column> <row> [kind]   remove the piece there, or place one (soldier by default)
  clear                          remove every piece
  name <text> | desc <text>      set the level name or description
  check                          validate the layout
  test                           play the layout without saving
  save                           validate and store the layout
  show                           redraw the board
  help                           show this text
  quit                           leave the editor
kinds: caocao (c), general_v (v), general_h (h), soldier (s)";

/// Text state of the level being authored.
pub(crate) struct Draft {
    pub(crate) id: Option<CustomLevelId>,
    pub(crate) name: String,
    pub(crate) description: String,
}

impl Draft {
    /// Blank draft for a level that has never been saved.
    pub(crate) fn untitled() -> Self {
        Self {
            id: None,
            name: String::from(DEFAULT_CUSTOM_NAME),
            description: String::from(DEFAULT_CUSTOM_DESCRIPTION),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum EditInput {
    Place(PieceKind, CellCoord),
    Remove(CellCoord),
    Toggle(CellCoord, PieceKind),
    Clear,
    Name(String),
    Description(String),
    Check,
    Test,
    Save,
    Show,
    Help,
    Quit,
}

fn parse_kind(text: Option<&str>) -> Result<PieceKind> {
    let text = text.context("expected a piece kind")?;
    PieceKind::parse(text).with_context(|| format!("unknown piece kind '{text}'"))
}

fn parse_index(text: Option<&str>) -> Result<i32> {
    let text = text.context("expected a column and a row")?;
    text.parse::<i32>()
        .with_context(|| format!("'{text}' is not a cell index"))
}

fn parse_cell<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<CellCoord> {
    let column = parse_index(words.next())?;
    let row = parse_index(words.next())?;
    Ok(CellCoord::new(column, row))
}

fn parse_input(line: &str) -> Result<EditInput> {
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    let mut words = rest.split_whitespace();

    let input = match head.to_ascii_lowercase().as_str() {
        "name" | "desc" if rest.is_empty() => bail!("expected some text after '{head}'"),
        "name" => return Ok(EditInput::Name(rest.to_owned())),
        "desc" => return Ok(EditInput::Description(rest.to_owned())),
        "place" => {
            let kind = parse_kind(words.next())?;
            EditInput::Place(kind, parse_cell(&mut words)?)
        }
        "remove" => EditInput::Remove(parse_cell(&mut words)?),
        "toggle" => {
            let cell = parse_cell(&mut words)?;
            let kind = match words.next() {
                Some(text) => parse_kind(Some(text))?,
                None => PieceKind::Soldier,
            };
            EditInput::Toggle(cell, kind)
        }
        "clear" => EditInput::Clear,
        "check" | "validate" => EditInput::Check,
        "test" => EditInput::Test,
        "save" => EditInput::Save,
        "show" => EditInput::Show,
        "help" | "?" => EditInput::Help,
        "quit" | "exit" => EditInput::Quit,
        _ => bail!("unknown command '{head}'; type 'help' for usage"),
    };

    if words.next().is_some() {
        bail!("too many arguments; type 'help' for usage");
    }
    Ok(input)
}

/// Runs the level editor until the input ends or the author quits.
pub(crate) fn run<R, W, B>(
    mut editor: Editor,
    mut draft: Draft,
    config: &Config,
    storage: &mut Storage<B>,
    input: &mut R,
    out: &mut W,
) -> Result<()>
where
    R: BufRead,
    W: Write,
    B: KeyValueStore,
{
    writeln!(out, "editing '{}'", draft.name)?;
    writeln!(out, "{}", render::board(editor.board()))?;
    writeln!(out, "type 'help' for commands")?;

    let mut line = String::new();
    loop {
        write!(out, "edit> ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let parsed = match parse_input(trimmed) {
            Ok(parsed) => parsed,
            Err(error) => {
                writeln!(out, "{error:#}")?;
                continue;
            }
        };
        debug!(?parsed, "editor input");

        let redraw = match parsed {
            EditInput::Quit => break,
            EditInput::Help => {
                writeln!(out, "{HELP}")?;
                false
            }
            EditInput::Show => true,
            EditInput::Place(kind, cell) => {
                let preview = editor.preview(kind, cell);
                match preview.rejection {
                    Some(rejection) => {
                        writeln!(out, "cannot place {}: {rejection}", kind.wire_name())?;
                        false
                    }
                    None => editor.place_piece(kind, cell),
                }
            }
            EditInput::Remove(cell) => match editor.remove_piece_at(cell) {
                Some(piece) => {
                    writeln!(out, "removed {}", piece.id())?;
                    true
                }
                None => {
                    writeln!(out, "no piece covers {cell}")?;
                    false
                }
            },
            EditInput::Toggle(cell, kind) => match editor.toggle_at(cell, kind) {
                EditOutcome::Placed(id) => {
                    writeln!(out, "placed {id}")?;
                    true
                }
                EditOutcome::Removed(piece) => {
                    writeln!(out, "removed {}", piece.id())?;
                    true
                }
                EditOutcome::Rejected(rejection) => {
                    writeln!(out, "cannot place {}: {rejection}", kind.wire_name())?;
                    false
                }
            },
            EditInput::Clear => {
                editor.clear();
                true
            }
            EditInput::Name(name) => {
                draft.name = name;
                false
            }
            EditInput::Description(description) => {
                draft.description = description;
                false
            }
            EditInput::Check => {
                writeln!(out, "{}", LayoutReport::of(editor.board()).message)?;
                false
            }
            EditInput::Test => {
                match editor.to_level(draft.name.clone(), draft.description.clone()) {
                    Ok(level) => {
                        let id = draft
                            .id
                            .clone()
                            .unwrap_or_else(|| CustomLevelId::new(DRAFT_ID));
                        play::run::<_, _, B>(
                            LevelKey::Custom(id),
                            level,
                            config,
                            None,
                            input,
                            out,
                        )?;
                        writeln!(out, "back in the editor")?;
                        true
                    }
                    Err(failure) => {
                        writeln!(out, "cannot test: {failure}")?;
                        false
                    }
                }
            }
            EditInput::Save => {
                save(&editor, &mut draft, storage, out)?;
                false
            }
        };

        if redraw {
            writeln!(out, "{}", render::board(editor.board()))?;
        }
    }
    Ok(())
}

fn save<W, B>(
    editor: &Editor,
    draft: &mut Draft,
    storage: &mut Storage<B>,
    out: &mut W,
) -> Result<()>
where
    W: Write,
    B: KeyValueStore,
{
    if let Err(failure) = editor.validate() {
        writeln!(out, "cannot save: {failure}")?;
        return Ok(());
    }

    let now = Utc::now();
    let id = match &draft.id {
        Some(id) => id.clone(),
        None => new_custom_level(storage, now, &mut rand::thread_rng()).id,
    };
    let saved = storage
        .save_custom_level(
            &id,
            CustomLevelDraft {
                name: draft.name.clone(),
                description: draft.description.clone(),
                pieces: editor.board().pieces().to_vec(),
            },
            now,
        )
        .context("failed to save custom level")?;
    writeln!(out, "saved '{}' as {}", saved.name, saved.id)?;
    draft.id = Some(saved.id);
    Ok(())
}
