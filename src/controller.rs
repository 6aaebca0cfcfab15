//! Interaction logic: typed per-row UI state, a typed [`Action`] parsed from
//! command lines, and a single dispatch point wiring store and view together.
use std::io::Write;

use anyhow::Result;
use tracing::{debug, info, instrument};

use crate::model::{CartItem, InventoryItem};
use crate::store::StoreService;
use crate::view::{self, View};

/// An inventory row with its ephemeral pick counter. The counter lives only
/// here: floor 0, reset to 0 after a successful add, never persisted, and a
/// full refresh starts every row back at 0.
#[derive(Debug, Clone)]
pub struct InventoryRow {
    pub item: InventoryItem,
    pub pick: i64,
}

/// A cart row is either displayed or being edited. The pending amount in edit
/// mode is display state, not model state, until saved; its stepper floors at
/// 1 because deletion is an explicit action, never a stepped-to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowMode {
    Display,
    Edit { pending: i64 },
}

#[derive(Debug, Clone)]
pub struct CartRow {
    pub item: CartItem,
    pub mode: RowMode,
}

/// Every user intent the UI supports, dispatched through [`Controller::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    IncreasePick(i64),
    DecreasePick(i64),
    AddToCart(i64),
    Delete(i64),
    Edit(i64),
    IncreaseEdit(i64),
    DecreaseEdit(i64),
    Save(i64),
    Checkout,
    Refresh,
}

impl Action {
    /// Parse a command line into an action. Returns `None` for anything the
    /// UI does not understand; the caller decides how to answer.
    pub fn parse(line: &str) -> Option<Action> {
        let mut words = line.split_whitespace();
        let command = words.next()?;
        let id = words.next();
        if words.next().is_some() {
            return None;
        }
        match (command, id) {
            ("checkout", None) => Some(Action::Checkout),
            ("refresh", None) => Some(Action::Refresh),
            (_, Some(id)) => {
                let id: i64 = id.parse().ok()?;
                match command {
                    "inv+" => Some(Action::IncreasePick(id)),
                    "inv-" => Some(Action::DecreasePick(id)),
                    "add" => Some(Action::AddToCart(id)),
                    "del" => Some(Action::Delete(id)),
                    "edit" => Some(Action::Edit(id)),
                    "cart+" => Some(Action::IncreaseEdit(id)),
                    "cart-" => Some(Action::DecreaseEdit(id)),
                    "save" => Some(Action::Save(id)),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

pub struct Controller<S, W: Write> {
    store: S,
    view: View<W>,
    inventory: Vec<InventoryRow>,
    cart: Vec<CartRow>,
}

impl<S: StoreService, W: Write> Controller<S, W> {
    pub fn new(store: S, view: View<W>) -> Self {
        Self {
            store,
            view,
            inventory: Vec::new(),
            cart: Vec::new(),
        }
    }

    pub fn inventory(&self) -> &[InventoryRow] {
        &self.inventory
    }

    pub fn cart(&self) -> &[CartRow] {
        &self.cart
    }

    pub fn into_view(self) -> View<W> {
        self.view
    }

    /// Fetch both lists and render them. Called once at startup.
    pub async fn init(&mut self) -> Result<()> {
        let (inventory, cart) =
            tokio::try_join!(self.store.get_inventory(), self.store.get_cart())?;
        self.inventory = inventory
            .into_iter()
            .map(|item| InventoryRow { item, pick: 0 })
            .collect();
        self.cart = cart
            .into_iter()
            .map(|item| CartRow {
                item,
                mode: RowMode::Display,
            })
            .collect();
        self.render_inventory()?;
        self.render_cart()?;
        Ok(())
    }

    /// Surface a non-blocking message without touching the rendered lists.
    pub fn notice(&mut self, msg: &str) -> Result<()> {
        self.view.notice(msg)?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn dispatch(&mut self, action: Action) -> Result<()> {
        match action {
            Action::IncreasePick(id) => {
                if let Some(row) = self.inventory_row_mut(id) {
                    row.pick += 1;
                    self.render_inventory()?;
                }
            }
            Action::DecreasePick(id) => {
                if let Some(row) = self.inventory_row_mut(id) {
                    row.pick = (row.pick - 1).max(0);
                    self.render_inventory()?;
                }
            }
            Action::AddToCart(id) => {
                let Some((item, pick)) = self
                    .inventory
                    .iter()
                    .find(|row| row.item.id == id)
                    .map(|row| (row.item.clone(), row.pick))
                else {
                    debug!(id, "add for unknown inventory row");
                    return Ok(());
                };
                self.store.add_to_cart(&item, pick).await?;
                // The pick display clears even when the add was a no-op.
                if let Some(row) = self.inventory_row_mut(id) {
                    row.pick = 0;
                }
                self.render_inventory()?;
                self.refresh_cart().await?;
            }
            Action::Delete(id) => {
                self.store.delete_from_cart(id).await?;
                self.refresh_cart().await?;
            }
            Action::Edit(id) => {
                if let Some(row) = self.cart_row_mut(id) {
                    let pending = row.item.amount;
                    row.mode = RowMode::Edit { pending };
                    self.render_cart()?;
                }
            }
            Action::IncreaseEdit(id) => {
                if let Some(row) = self.cart_row_mut(id) {
                    if let RowMode::Edit { pending } = &mut row.mode {
                        *pending += 1;
                        self.render_cart()?;
                    }
                }
            }
            Action::DecreaseEdit(id) => {
                if let Some(row) = self.cart_row_mut(id) {
                    if let RowMode::Edit { pending } = &mut row.mode {
                        *pending = (*pending - 1).max(1);
                        self.render_cart()?;
                    }
                }
            }
            Action::Save(id) => {
                let Some(RowMode::Edit { pending }) = self
                    .cart
                    .iter()
                    .find(|row| row.item.id == id)
                    .map(|row| row.mode.clone())
                else {
                    debug!(id, "save for a row not in edit mode");
                    return Ok(());
                };
                self.store.update_cart(id, pending).await?;
                self.refresh_cart().await?;
            }
            Action::Checkout => {
                let removed = self.store.checkout().await?;
                info!(count = removed.len(), "checkout complete");
                // Render the empty cart directly; no refetch after checkout.
                self.cart.clear();
                self.render_cart()?;
            }
            Action::Refresh => {
                self.init().await?;
            }
        }
        Ok(())
    }

    /// Refetch the cart snapshot and re-render. Rows come back in display
    /// mode, so any in-progress edit is discarded here.
    async fn refresh_cart(&mut self) -> Result<()> {
        let cart = self.store.get_cart().await?;
        self.cart = cart
            .into_iter()
            .map(|item| CartRow {
                item,
                mode: RowMode::Display,
            })
            .collect();
        self.render_cart()?;
        Ok(())
    }

    fn render_inventory(&mut self) -> Result<()> {
        let rows: Vec<String> = self
            .inventory
            .iter()
            .map(|row| view::inventory_row(&row.item, row.pick))
            .collect();
        self.view.render_inventory(&rows)?;
        Ok(())
    }

    fn render_cart(&mut self) -> Result<()> {
        let rows: Vec<String> = self
            .cart
            .iter()
            .map(|row| match row.mode {
                RowMode::Display => view::cart_row(&row.item),
                RowMode::Edit { pending } => view::cart_row_editing(&row.item, pending),
            })
            .collect();
        self.view.render_cart(&rows)?;
        Ok(())
    }

    fn inventory_row_mut(&mut self, id: i64) -> Option<&mut InventoryRow> {
        self.inventory.iter_mut().find(|row| row.item.id == id)
    }

    fn cart_row_mut(&mut self, id: i64) -> Option<&mut CartRow> {
        self.cart.iter_mut().find(|row| row.item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stepper_commands() {
        assert_eq!(Action::parse("inv+ 3"), Some(Action::IncreasePick(3)));
        assert_eq!(Action::parse("inv- 3"), Some(Action::DecreasePick(3)));
        assert_eq!(Action::parse("cart+ 1"), Some(Action::IncreaseEdit(1)));
        assert_eq!(Action::parse("cart- 1"), Some(Action::DecreaseEdit(1)));
    }

    #[test]
    fn parses_row_commands() {
        assert_eq!(Action::parse("add 2"), Some(Action::AddToCart(2)));
        assert_eq!(Action::parse("edit 2"), Some(Action::Edit(2)));
        assert_eq!(Action::parse("save 2"), Some(Action::Save(2)));
        assert_eq!(Action::parse("del 2"), Some(Action::Delete(2)));
    }

    #[test]
    fn parses_bare_commands() {
        assert_eq!(Action::parse("checkout"), Some(Action::Checkout));
        assert_eq!(Action::parse("refresh"), Some(Action::Refresh));
        assert_eq!(Action::parse("  checkout  "), Some(Action::Checkout));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(Action::parse(""), None);
        assert_eq!(Action::parse("add"), None);
        assert_eq!(Action::parse("add two"), None);
        assert_eq!(Action::parse("add 1 2"), None);
        assert_eq!(Action::parse("checkout 1"), None);
        assert_eq!(Action::parse("frobnicate 1"), None);
    }
}
