use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::content::{ContentStore, ItemEffectKind};
use crate::engine::output::Output;
use crate::engine::stats::Stats;

/// Total items the player can carry.
pub const INVENTORY_CAP: u64 = 10;
/// Total items any single container can hold.
pub const CONTAINER_CAP: u64 = 15;

/// Bounded multiset of items. Counts are strictly positive: a decrement
/// that reaches zero removes the key, so no zero or negative count is ever
/// stored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemCounts(BTreeMap<String, u64>);

impl ItemCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn count(&self, item: &str) -> u64 {
        self.0.get(item).copied().unwrap_or(0)
    }

    pub fn contains(&self, item: &str) -> bool {
        self.0.contains_key(item)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.0.iter()
    }

    /// All-or-nothing add against a capacity: if the new total would exceed
    /// `cap`, nothing is added and `false` is returned.
    pub fn try_add(&mut self, item: &str, quantity: u64, cap: u64) -> bool {
        if quantity == 0 || self.total() + quantity > cap {
            return false;
        }
        *self.0.entry(item.to_string()).or_insert(0) += quantity;
        true
    }

    /// Remove up to `quantity` of an item, deleting the key when the count
    /// reaches zero. Returns how many were actually removed.
    pub fn remove(&mut self, item: &str, quantity: u64) -> u64 {
        let Some(count) = self.0.get_mut(item) else {
            return 0;
        };
        if *count > quantity {
            *count -= quantity;
            quantity
        } else {
            let removed = *count;
            self.0.remove(item);
            removed
        }
    }
}

/// A unit-quantity item manipulation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemCommand {
    MoveToContainer { item: String, container: String },
    MoveToInventory { item: String, container: String },
    Discard { item: String },
    Use { item: String },
}

/// Rollback state for item actions: exactly the four fields an item action
/// can touch. Separate from the narrative undo snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub inventory: ItemCounts,
    pub containers: BTreeMap<String, ItemCounts>,
    pub equipment: BTreeMap<String, String>,
    pub stats: Stats,
}

/// Apply one item command. The rollback slot is armed only when the command
/// actually mutates state, so a rejected command leaves any earlier
/// rollback intact and an empty slot empty.
pub fn handle_item_command(
    out: &mut Output,
    store: &ContentStore,
    cmd: &ItemCommand,
    inventory: &mut ItemCounts,
    containers: &mut BTreeMap<String, ItemCounts>,
    equipment: &mut BTreeMap<String, String>,
    stats: &mut Stats,
    rollback: &mut Option<ItemSnapshot>,
) {
    let snapshot = ItemSnapshot {
        inventory: inventory.clone(),
        containers: containers.clone(),
        equipment: equipment.clone(),
        stats: stats.clone(),
    };

    match cmd {
        ItemCommand::MoveToContainer { item, container } => {
            let slot = containers.entry(container.clone()).or_default();
            if inventory.contains(item) && slot.total() < CONTAINER_CAP {
                *rollback = Some(snapshot);
                inventory.remove(item, 1);
                slot.try_add(item, 1, CONTAINER_CAP);
                out.say(format!("You put the {item} in the {container}."));
            }
        }
        ItemCommand::MoveToInventory { item, container } => {
            let Some(slot) = containers.get_mut(container) else {
                return;
            };
            if slot.contains(item) && inventory.total() < INVENTORY_CAP {
                *rollback = Some(snapshot);
                slot.remove(item, 1);
                inventory.try_add(item, 1, INVENTORY_CAP);
                out.say(format!("You take the {item} from the {container}."));
            }
        }
        ItemCommand::Discard { item } => {
            if inventory.contains(item) {
                *rollback = Some(snapshot);
                inventory.remove(item, 1);
                out.say(format!("You discard the {item}."));
            }
        }
        ItemCommand::Use { item } => {
            let Some(effect) = store.item_effect(item) else {
                return;
            };
            // Only consumables do anything; other kinds are inert here.
            if matches!(effect.kind, ItemEffectKind::Consumable) && inventory.contains(item) {
                *rollback = Some(snapshot);
                stats.apply_delta(&effect.effect);
                inventory.remove(item, 1);
                out.say(effect.message.clone());
            }
        }
    }
}

/// Restore the item rollback snapshot, if armed. Repeated undo without an
/// intervening item action reports nothing-to-undo.
pub fn undo_item_command(
    out: &mut Output,
    inventory: &mut ItemCounts,
    containers: &mut BTreeMap<String, ItemCounts>,
    equipment: &mut BTreeMap<String, String>,
    stats: &mut Stats,
    rollback: &mut Option<ItemSnapshot>,
) {
    match rollback.take() {
        Some(snapshot) => {
            *inventory = snapshot.inventory;
            *containers = snapshot.containers;
            *equipment = snapshot.equipment;
            *stats = snapshot.stats;
            out.say("Undid the last item action.");
        }
        None => out.say("Nothing to undo."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_all_or_nothing_at_the_cap() {
        let mut items = ItemCounts::new();
        assert!(items.try_add("feather", 9, 10));
        assert!(!items.try_add("ink", 2, 10));
        assert_eq!(items.total(), 9);
        assert!(!items.contains("ink"));
        assert!(items.try_add("ink", 1, 10));
        assert_eq!(items.total(), 10);
    }

    #[test]
    fn remove_deletes_the_key_at_zero() {
        let mut items = ItemCounts::new();
        items.try_add("feather", 2, 10);
        assert_eq!(items.remove("feather", 1), 1);
        assert_eq!(items.count("feather"), 1);
        assert_eq!(items.remove("feather", 5), 1);
        assert!(!items.contains("feather"));
        assert_eq!(items.remove("feather", 1), 0);
    }
}
