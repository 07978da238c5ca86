//! Optimistic section reordering.
//!
//! The move is applied to the local list first so the UI updates at once.
//! If the write fails, the local list is replaced by a fresh query instead
//! of trying to reverse the move by hand. When that query fails too, the
//! order from before the move is put back.

use log::warn;

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::model::section::SectionRow;
use crate::requests::SectionOrder;

/// Moves the section at `from` to `to` and renumbers display orders from 0.
/// Out-of-range indices leave the list untouched and return `false`.
pub fn move_section(sections: &mut Vec<SectionRow>, from: usize, to: usize) -> bool {
    if from >= sections.len() || to >= sections.len() {
        return false;
    }
    let moved = sections.remove(from);
    sections.insert(to, moved);
    for (position, section) in sections.iter_mut().enumerate() {
        section.display_order = position as i64;
    }
    true
}

pub async fn reorder_sections<G>(
    gateway: &G,
    property_id: &str,
    sections: &mut Vec<SectionRow>,
    from: usize,
    to: usize,
) -> Result<(), GatewayError>
where
    G: Gateway + ?Sized,
{
    if from == to {
        return Ok(());
    }
    let original = sections.clone();
    if !move_section(sections, from, to) {
        return Ok(());
    }

    let orders: Vec<SectionOrder> = sections
        .iter()
        .map(|s| SectionOrder {
            id: s.id.clone(),
            display_order: s.display_order,
        })
        .collect();

    if let Err(err) = gateway.update_section_orders(property_id, &orders).await {
        warn!("reorder failed for property {}: {}", property_id, err);
        *sections = match gateway.list_sections(property_id).await {
            Ok(fresh) => fresh,
            Err(refetch) => {
                warn!("refetch after failed reorder also failed: {}", refetch);
                original
            }
        };
        return Err(err);
    }
    Ok(())
}
