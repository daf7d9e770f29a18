//! Parsing of the line commands typed at the prompt.

use anyhow::{anyhow, Context, Result};
use client_core::StoreCommand;
use shared::domain::{ItemDraft, ItemId, SortOrder};

pub const HELP: &str = "\
commands:
  list                          redraw the current page
  show <id>                     item details (current page only)
  add <title> | <description>   create an item
  edit <id>                     select an item for editing
  save <title> | <description>  save the item being edited
  cancel                        drop the editing selection
  delete <id>                   delete an item
  sort asc|desc                 sort by id
  page <n> | next | prev        change page
  dismiss                       clear the last notice
  help                          this text
  quit                          exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Store(StoreCommand),
    Page(usize),
    Next,
    Prev,
    Show(ItemId),
    List,
    Help,
    Quit,
}

/// `Ok(None)` for a blank line.
pub fn parse_input(line: &str) -> Result<Option<Input>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let input = match verb.to_ascii_lowercase().as_str() {
        "list" | "ls" => Input::List,
        "show" => Input::Show(parse_id(rest)?),
        "add" | "new" => Input::Store(StoreCommand::Create(parse_draft(rest)?)),
        "edit" => Input::Store(StoreCommand::BeginEdit(parse_id(rest)?)),
        "save" => Input::Store(StoreCommand::Update(parse_draft(rest)?)),
        "cancel" => Input::Store(StoreCommand::CancelEdit),
        "delete" | "rm" => Input::Store(StoreCommand::Delete(parse_id(rest)?)),
        "sort" => Input::Store(StoreCommand::ChangeSort(rest.parse::<SortOrder>()?)),
        "page" => Input::Page(
            rest.parse::<usize>()
                .with_context(|| format!("invalid page number '{rest}'"))?,
        ),
        "next" => Input::Next,
        "prev" => Input::Prev,
        "dismiss" => Input::Store(StoreCommand::DismissNotice),
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => return Err(anyhow!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(input))
}

fn parse_id(raw: &str) -> Result<ItemId> {
    let raw = raw.trim().trim_start_matches('#');
    raw.parse::<i64>()
        .map(ItemId)
        .with_context(|| format!("invalid item id '{raw}'"))
}

fn parse_draft(raw: &str) -> Result<ItemDraft> {
    let (title, description) = raw
        .split_once('|')
        .ok_or_else(|| anyhow!("expected '<title> | <description>'"))?;
    Ok(ItemDraft::new(title, description)?)
}
