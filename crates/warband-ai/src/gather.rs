//! Gathering start.
//!
//! Gathering itself resolves over later ticks outside this crate; the
//! decision only flips the group into the gathering state on a tile that
//! still has deposits.

use tracing::debug;

use warband_types::{GatheringState, Group, GroupActivity, Mutation};

use crate::context::DecisionContext;
use crate::outcome::{Action, ActionKind, DeclineReason, Outcome};

/// Start gathering on the group's current tile.
pub fn start_gathering(group: &Group, ctx: &DecisionContext<'_>) -> Outcome {
    let here = group.coord();
    let has_deposits = ctx
        .chunks
        .tile(here)
        .is_some_and(warband_types::TileData::has_resources);
    if !has_deposits {
        return Outcome::Declined(DeclineReason::NoSuitableTarget);
    }

    let biome = ctx.biome_at(here);
    let mut gatherer = group.clone();
    gatherer.activity = GroupActivity::Gathering(GatheringState {
        gathering_biome: biome.clone(),
        gathering_started: ctx.now,
    });

    debug!(group_id = %group.id, biome = %biome, x = here.x, y = here.y, "Gathering started");
    Outcome::Acted(
        Action::new(ActionKind::Gather)
            .toward(here, None)
            .with(Mutation::put_group(gatherer)),
    )
}
