use std::collections::BTreeSet;

use crate::content::{AchievementCondition, ContentStore};
use crate::engine::output::Output;

/// State transitions that can satisfy achievement conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AchievementTrigger<'a> {
    ItemCollected,
    SceneVisited(&'a str),
    SpellLearned,
}

/// Scan the definitions matching a trigger and unlock anything not yet
/// held. Unlocks are idempotent and evaluated in definition order; each one
/// emits its own unlock block.
pub fn check_and_unlock(
    out: &mut Output,
    store: &ContentStore,
    unlocked: &mut BTreeSet<String>,
    trigger: AchievementTrigger<'_>,
) {
    match trigger {
        AchievementTrigger::ItemCollected => {
            unlock_global(out, store, unlocked, AchievementCondition::Collect);
        }
        AchievementTrigger::SpellLearned => {
            unlock_global(out, store, unlocked, AchievementCondition::Learn);
        }
        AchievementTrigger::SceneVisited(scene_id) => {
            let Some(scene) = store.scene(scene_id) else {
                return;
            };
            for entry in &scene.achievements {
                if entry.condition != "visit" || unlocked.contains(&entry.id) {
                    continue;
                }
                unlocked.insert(entry.id.clone());

                // The scene entry may omit the display name; the global
                // definition list is the authority.
                let name = store
                    .achievements
                    .iter()
                    .find(|a| a.id == entry.id)
                    .map(|a| a.name.as_str())
                    .unwrap_or(entry.name.as_str());
                out.unlock(format!("Achievement unlocked: {name}"));
            }
        }
    }
}

fn unlock_global(
    out: &mut Output,
    store: &ContentStore,
    unlocked: &mut BTreeSet<String>,
    condition: AchievementCondition,
) {
    for achievement in &store.achievements {
        if achievement.condition != condition || unlocked.contains(&achievement.id) {
            continue;
        }
        unlocked.insert(achievement.id.clone());
        out.unlock(format!("Achievement unlocked: {}", achievement.name));
    }
}
