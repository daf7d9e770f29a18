use std::fmt::Write as _;

use client_core::StoreSnapshot;
use shared::domain::Item;

const CARD_DESCRIPTION_CHARS: usize = 72;

pub fn render_snapshot(snapshot: &StoreSnapshot) -> String {
    let mut out = String::new();

    if let Some(banner) = snapshot.banner() {
        let _ = writeln!(out, "!! {banner}");
    }
    if let Some(notice) = snapshot.notice() {
        let _ = writeln!(out, "** {}", notice.message);
    }
    if let Some(error) = &snapshot.command_error {
        let _ = writeln!(out, "error: {error}");
    }
    if let Some(editing) = &snapshot.editing {
        let _ = writeln!(
            out,
            "editing #{}: {} | {}  (save <title> | <description>, or cancel)",
            editing.id, editing.title, editing.description
        );
    }

    if snapshot.page_items.is_empty() {
        let _ = writeln!(out, "(no items on this page)");
    }
    for item in &snapshot.page_items {
        out.push_str(&render_card(item));
    }

    match snapshot.showing {
        Some((first, last)) => {
            let _ = write!(
                out,
                "Showing {first} to {last} of {} items",
                snapshot.total_items
            );
        }
        None => {
            let _ = write!(out, "{} items", snapshot.total_items);
        }
    }
    let _ = writeln!(
        out,
        " | sort {} | page {}/{}",
        snapshot.sort_order, snapshot.current_page, snapshot.total_pages
    );
    out
}

pub fn render_card(item: &Item) -> String {
    let marker = if item.is_local() { " [local]" } else { "" };
    format!(
        "#{:<5} {}{}\n       {}\n",
        item.id.0,
        item.title,
        marker,
        truncate(&item.description, CARD_DESCRIPTION_CHARS)
    )
}

pub fn render_detail(item: &Item) -> String {
    let origin = if item.is_local() {
        "created locally, unknown to the remote store"
    } else {
        "remote"
    };
    format!(
        "Item #{}\nTitle: {}\nOrigin: {origin}\n\n{}\n",
        item.id, item.title, item.description
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
