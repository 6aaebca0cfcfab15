//! Terminal rendering. Row builders are pure functions over the typed row
//! state; [`View`] owns the output writer and re-renders whole sections, so a
//! cart re-render discards any in-progress edit row.
use std::io::{self, Write};

use crate::model::{clean_content, CartItem, InventoryItem};

/// One inventory row: label, pick stepper, add control. `pick` is ephemeral
/// client state and renders as 0 on a fresh fetch.
pub fn inventory_row(item: &InventoryItem, pick: i64) -> String {
    format!(
        "#{} {}  [-] {} [+]  [add]",
        item.id,
        clean_content(&item.content),
        pick
    )
}

/// One cart row in display mode: cleaned label, amount, edit/delete controls.
pub fn cart_row(item: &CartItem) -> String {
    format!(
        "#{} {}  x{}  [edit] [del]",
        item.id,
        clean_content(&item.content),
        item.amount
    )
}

/// One cart row in edit mode: the pending amount with its stepper, save and
/// delete controls. `pending` is display state until saved.
pub fn cart_row_editing(item: &CartItem, pending: i64) -> String {
    format!(
        "#{} {}  [-] {} [+]  [save] [del]",
        item.id,
        clean_content(&item.content),
        pending
    )
}

pub struct View<W: Write> {
    out: W,
}

impl<W: Write> View<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Replace the inventory section with the given rows.
    pub fn render_inventory(&mut self, rows: &[String]) -> io::Result<()> {
        self.render_section("inventory", rows)
    }

    /// Replace the cart section with the given rows.
    pub fn render_cart(&mut self, rows: &[String]) -> io::Result<()> {
        self.render_section("cart", rows)?;
        writeln!(self.out, "  [checkout]")
    }

    /// Non-blocking notice line; the lists above it stay as last rendered.
    pub fn notice(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.out, "! {msg}")
    }

    fn render_section(&mut self, title: &str, rows: &[String]) -> io::Result<()> {
        writeln!(self.out, "--- {title} ---")?;
        if rows.is_empty() {
            writeln!(self.out, "  (empty)")?;
        }
        for row in rows {
            writeln!(self.out, "  {row}")?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
