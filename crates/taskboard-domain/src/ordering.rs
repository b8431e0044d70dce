//! Pure rules for order arrays (`columnOrderIds`, `cardOrderIds`).
//!
//! An order array must be a permutation of the active children of its parent.
//! These functions compute repaired arrays and check client-submitted ones;
//! they never touch storage.

use std::collections::HashSet;

use taskboard_core::ValidationErrors;
use uuid::Uuid;

use crate::requests::{move_fields, CardMove};

/// Result of repairing an order array against the parent's active children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub order: Vec<Uuid>,
    /// Entries removed: dangling IDs and repeated occurrences.
    pub dropped: Vec<Uuid>,
    /// Active children that were missing, appended in creation order.
    pub appended: Vec<Uuid>,
}

impl Reconciliation {
    pub fn is_changed(&self) -> bool {
        !self.dropped.is_empty() || !self.appended.is_empty()
    }

    /// Move `id` behind everything else, including appended children.
    /// A freshly appended ID stays last even when the repair appends others.
    pub fn keep_last(mut self, id: Uuid) -> Self {
        if let Some(pos) = self.order.iter().position(|entry| *entry == id) {
            let entry = self.order.remove(pos);
            self.order.push(entry);
        }
        self
    }
}

/// Repair `order` so it lists every ID in `active_children` exactly once.
///
/// Existing relative order is kept. `active_children` must be in creation
/// order; that is the order used for children missing from `order`.
pub fn reconcile(order: &[Uuid], active_children: &[Uuid]) -> Reconciliation {
    let active: HashSet<Uuid> = active_children.iter().copied().collect();
    let mut seen = HashSet::with_capacity(order.len());
    let mut kept = Vec::with_capacity(active_children.len());
    let mut dropped = Vec::new();

    for id in order {
        if active.contains(id) && seen.insert(*id) {
            kept.push(*id);
        } else {
            dropped.push(*id);
        }
    }

    let appended: Vec<Uuid> = active_children
        .iter()
        .filter(|id| !seen.contains(*id))
        .copied()
        .collect();
    kept.extend(appended.iter().copied());

    Reconciliation {
        order: kept,
        dropped,
        appended,
    }
}

/// IDs occurring more than once, each reported once in first-repeat order.
pub fn duplicates(order: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(order.len());
    let mut reported = HashSet::new();
    order
        .iter()
        .filter(|id| !seen.insert(**id) && reported.insert(**id))
        .copied()
        .collect()
}

/// Check a client-computed move against the columns as currently stored.
///
/// Requires the moved card to end up only in the next column, no duplicates,
/// and the two submitted arrays together to hold exactly the cards the two
/// columns hold now.
pub fn verify_move(
    card_move: &CardMove,
    current_prev: &[Uuid],
    current_next: &[Uuid],
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let prev = &card_move.prev_card_order_ids;
    let next = &card_move.next_card_order_ids;

    if prev.contains(&card_move.card_id) {
        errors.add(
            move_fields::PREV_CARD_ORDER_IDS,
            "must not contain the moved card",
        );
    }
    if !next.contains(&card_move.card_id) {
        errors.add(move_fields::NEXT_CARD_ORDER_IDS, "must contain the moved card");
    }
    if !duplicates(prev).is_empty() {
        errors.add(move_fields::PREV_CARD_ORDER_IDS, "must not contain duplicates");
    }
    if !duplicates(next).is_empty() {
        errors.add(move_fields::NEXT_CARD_ORDER_IDS, "must not contain duplicates");
    }

    let submitted: HashSet<Uuid> = prev.iter().chain(next.iter()).copied().collect();
    let stored: HashSet<Uuid> = current_prev
        .iter()
        .chain(current_next.iter())
        .copied()
        .collect();
    if submitted != stored {
        errors.add(
            move_fields::NEXT_CARD_ORDER_IDS,
            "together with prevCardOrderIds must hold exactly the cards of both columns",
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
