use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::GameState;
use crate::content::{ContentStore, ItemOp, TalkEntry};
use crate::engine::achievements::{AchievementTrigger, check_and_unlock};
use crate::engine::battle::start_battle;
use crate::engine::inventory::INVENTORY_CAP;
use crate::engine::output::Output;

/// Every dialogue is entered at this node.
pub const TALK_ENTRY_NODE: &str = "1-1";
/// Where a dialogue drops the player when its end entry names no scene.
pub const TALK_FALLBACK_SCENE: &str = "corridor";

/// Apply a scene choice by index. An out-of-range index (or a missing
/// current scene) leaves the state untouched, including the undo slot.
pub fn apply_choice<R: Rng>(
    out: &mut Output,
    store: &ContentStore,
    rng: &mut R,
    state: &mut GameState,
    choice_index: usize,
) {
    let Some(scene) = store.scene(&state.current_scene) else {
        out.diagnostic(format!("Unknown scene: {}", state.current_scene));
        return;
    };
    let Some(choice) = scene.choices.get(choice_index) else {
        return;
    };

    if choice.is_talk {
        let Some(talk_id) = choice.talk_files.choose(rng) else {
            return;
        };
        let talk_id = talk_id.clone();
        state.snapshot_for_undo();
        state.current_talk = Some(talk_id);
        state.current_talk_node = Some(TALK_ENTRY_NODE.to_string());
        return;
    }

    let random_events: Vec<_> = choice.random_events.clone();
    let item_specs: Vec<_> = choice.items.clone();
    let time_minutes = choice.time_minutes;
    let effect = choice.effect.clone();
    let next = choice.next.clone();

    state.snapshot_for_undo();

    let mut event_message: Option<String> = None;
    let mut item_messages: Vec<String> = Vec::new();

    // First-match-wins over the ordered event list.
    for event in &random_events {
        if rng.r#gen::<f64>() >= event.chance {
            continue;
        }
        event_message = Some(event.event.clone());

        if event.next.as_deref().is_some_and(|n| n.contains("battle")) {
            match event.enemy.as_deref() {
                Some(enemy_name) => match store.enemy(enemy_name) {
                    Some(template) => {
                        // Entering battle short-circuits the whole choice:
                        // no item list, no time cost, no scene change.
                        out.say(event.event.clone());
                        start_battle(&mut state.battle, template);
                        return;
                    }
                    None => out.diagnostic(format!("Enemy not found: {enemy_name}")),
                },
                None => out.diagnostic("Random event named no enemy".to_string()),
            }
        }

        state.stats.apply_delta(&event.effect);

        if let Some(item) = &event.item {
            if state.inventory.try_add(item, 1, INVENTORY_CAP) {
                item_messages.push(format!("Gained {item} x1"));
                check_and_unlock(
                    out,
                    store,
                    &mut state.achievements,
                    AchievementTrigger::ItemCollected,
                );
            }
        }
        break;
    }

    for spec in &item_specs {
        if rng.r#gen::<f64>() >= spec.chance {
            continue;
        }
        match spec.action {
            ItemOp::Add => {
                if state.inventory.try_add(&spec.item, spec.quantity, INVENTORY_CAP) {
                    item_messages.push(format!("Gained {} x{}", spec.item, spec.quantity));
                    check_and_unlock(
                        out,
                        store,
                        &mut state.achievements,
                        AchievementTrigger::ItemCollected,
                    );
                }
            }
            ItemOp::Remove => {
                let removed = state.inventory.remove(&spec.item, spec.quantity);
                if removed > 0 {
                    item_messages.push(format!("Lost {} x{removed}", spec.item));
                }
            }
        }
    }

    state.stats.time.advance(time_minutes);
    state.stats.apply_delta(&effect);

    if let Some(next) = next {
        state.current_scene = next.clone();
        visit_scene(
            out,
            store,
            &next,
            &mut state.visited,
            &mut state.unlocked_scenes,
            &mut state.achievements,
        );
    }

    // One combined narration: sub-event text, then item changes.
    if event_message.is_some() || !item_messages.is_empty() {
        let mut message = event_message.unwrap_or_default();
        if !item_messages.is_empty() {
            if !message.is_empty() {
                message.push(' ');
            }
            message.push_str(&item_messages.join("; "));
        }
        out.say(message);
    }
}

/// Apply a dialogue choice by index. Missing cursor, missing choice entry,
/// or an out-of-range index is a silent no-op.
pub fn apply_talk_choice(
    out: &mut Output,
    store: &ContentStore,
    state: &mut GameState,
    choice_index: usize,
) {
    let (Some(talk_id), Some(node_id)) = (state.current_talk.clone(), state.current_talk_node.clone())
    else {
        return;
    };
    let Some(talk) = store.talk(&talk_id) else {
        out.diagnostic(format!("Unknown talk: {talk_id}"));
        return;
    };
    let Some(entries) = talk.dialogue.get(&node_id) else {
        return;
    };
    let Some(options) = entries.iter().find_map(|e| match e {
        TalkEntry::Choice { choices } => Some(choices),
        _ => None,
    }) else {
        return;
    };
    let Some(option) = options.get(choice_index) else {
        return;
    };
    let next = option.next.clone();
    let effect = option.effect.clone();

    state.snapshot_for_undo();
    state.stats.apply_delta(&effect);

    // A terminal is the literal "end" or a node whose first entry ends the
    // dialogue; its follow-up scene defaults to the fallback.
    let terminal_scene = match talk.dialogue.get(&next).and_then(|es| es.first()) {
        Some(TalkEntry::End { next_scene }) => Some(
            next_scene
                .clone()
                .unwrap_or_else(|| TALK_FALLBACK_SCENE.to_string()),
        ),
        _ if next == "end" => Some(TALK_FALLBACK_SCENE.to_string()),
        _ => None,
    };

    match terminal_scene {
        Some(scene_id) => {
            state.current_talk = None;
            state.current_talk_node = None;
            state.current_scene = scene_id.clone();
            visit_scene(
                out,
                store,
                &scene_id,
                &mut state.visited,
                &mut state.unlocked_scenes,
                &mut state.achievements,
            );
        }
        None => state.current_talk_node = Some(next),
    }
}

/// Jump straight to an unlocked scene. Locked or unknown targets are a
/// silent no-op; the narrative undo slot is not written.
pub fn navigate(out: &mut Output, store: &ContentStore, state: &mut GameState, scene_id: &str) {
    if !state.unlocked_scenes.contains(scene_id) {
        return;
    }
    state.current_talk = None;
    state.current_talk_node = None;
    state.current_scene = scene_id.to_string();
    visit_scene(
        out,
        store,
        scene_id,
        &mut state.visited,
        &mut state.unlocked_scenes,
        &mut state.achievements,
    );
}

/// First-visit bookkeeping: mark visited and unlocked, then fire the
/// scene's visit achievements. Repeat visits do nothing.
pub fn visit_scene(
    out: &mut Output,
    store: &ContentStore,
    scene_id: &str,
    visited: &mut BTreeSet<String>,
    unlocked_scenes: &mut BTreeSet<String>,
    achievements: &mut BTreeSet<String>,
) {
    if !visited.insert(scene_id.to_string()) {
        return;
    }
    unlocked_scenes.insert(scene_id.to_string());
    check_and_unlock(
        out,
        store,
        achievements,
        AchievementTrigger::SceneVisited(scene_id),
    );
}
