use super::model::{ContentStore, TalkEntry};
use crate::engine::{CONTAINER_CAP, INVENTORY_CAP, TALK_ENTRY_NODE};

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    fn new(msg: impl Into<String>) -> Self {
        ValidationError {
            message: msg.into(),
        }
    }
}

/// Cross-reference checks over a freshly built store. Enemy names inside
/// random events are deliberately NOT checked here: they are dynamic
/// references resolved per-request, and a miss surfaces as a diagnostic
/// event instead of a startup failure.
pub fn validate_content(store: &ContentStore) -> Vec<ValidationError> {
    let mut errors: Vec<ValidationError> = Vec::new();

    if store.scenes.is_empty() {
        errors.push(ValidationError::new("content has no scenes"));
    }

    if !store.scenes.contains_key(&store.init.current_scene) {
        errors.push(ValidationError::new(format!(
            "init scene '{}' not found among scenes",
            store.init.current_scene
        )));
    }

    // Validate scene choices
    for (scene_id, scene) in &store.scenes {
        for (idx, choice) in scene.choices.iter().enumerate() {
            if choice.is_talk {
                if choice.talk_files.is_empty() {
                    errors.push(ValidationError::new(format!(
                        "scene '{scene_id}' choice {idx} is a talk choice with no talk_files"
                    )));
                }
                for talk_id in &choice.talk_files {
                    if !store.talks.contains_key(talk_id) {
                        errors.push(ValidationError::new(format!(
                            "scene '{scene_id}' choice {idx} references missing talk '{talk_id}'"
                        )));
                    }
                }
            } else {
                match &choice.next {
                    Some(next) if store.scenes.contains_key(next) => {}
                    Some(next) => errors.push(ValidationError::new(format!(
                        "scene '{scene_id}' choice {idx} targets missing scene '{next}'"
                    ))),
                    None => errors.push(ValidationError::new(format!(
                        "scene '{scene_id}' choice {idx} has no target scene"
                    ))),
                }
            }

            for event in &choice.random_events {
                if !(0.0..=1.0).contains(&event.chance) {
                    errors.push(ValidationError::new(format!(
                        "scene '{scene_id}' choice {idx} has an event chance outside [0,1]"
                    )));
                }
            }

            for spec in &choice.items {
                if !(0.0..=1.0).contains(&spec.chance) {
                    errors.push(ValidationError::new(format!(
                        "scene '{scene_id}' choice {idx} has an item chance outside [0,1]"
                    )));
                }
                if spec.quantity == 0 {
                    errors.push(ValidationError::new(format!(
                        "scene '{scene_id}' choice {idx} has a zero item quantity"
                    )));
                }
            }
        }
    }

    // Validate dialogue graphs
    for (talk_id, talk) in &store.talks {
        if !talk.dialogue.contains_key(TALK_ENTRY_NODE) {
            errors.push(ValidationError::new(format!(
                "talk '{talk_id}' has no entry node '{TALK_ENTRY_NODE}'"
            )));
        }

        for (node_id, entries) in &talk.dialogue {
            for entry in entries {
                if let TalkEntry::Choice { choices } = entry {
                    if choices.is_empty() {
                        errors.push(ValidationError::new(format!(
                            "talk '{talk_id}' node '{node_id}' has an empty choice list"
                        )));
                    }
                    for option in choices {
                        if option.next != "end" && !talk.dialogue.contains_key(&option.next) {
                            errors.push(ValidationError::new(format!(
                                "talk '{talk_id}' node '{node_id}' option targets missing node '{}'",
                                option.next
                            )));
                        }
                    }
                }
            }
        }
    }

    // Validate enemies
    let mut seen_enemies = std::collections::HashSet::new();
    for enemy in &store.enemies {
        if !seen_enemies.insert(enemy.name.as_str()) {
            errors.push(ValidationError::new(format!(
                "duplicate enemy name '{}'",
                enemy.name
            )));
        }
        if enemy.health <= 0 {
            errors.push(ValidationError::new(format!(
                "enemy '{}' must start with positive health",
                enemy.name
            )));
        }
        if enemy.skills.is_empty() {
            errors.push(ValidationError::new(format!(
                "enemy '{}' has no skills",
                enemy.name
            )));
        }
        for reward in &enemy.rewards {
            if !(0.0..=1.0).contains(&reward.chance) {
                errors.push(ValidationError::new(format!(
                    "enemy '{}' has a reward chance outside [0,1]",
                    enemy.name
                )));
            }
        }
    }

    // Validate spells
    let mut seen_spells = std::collections::HashSet::new();
    for spell in &store.spells {
        if !seen_spells.insert(spell.name.as_str()) {
            errors.push(ValidationError::new(format!(
                "duplicate spell name '{}'",
                spell.name
            )));
        }
    }

    // Validate the init template against the same caps the engine enforces
    if store.init.inventory.total() > INVENTORY_CAP {
        errors.push(ValidationError::new(
            "init inventory exceeds the inventory capacity",
        ));
    }
    for (container_id, items) in &store.init.containers {
        if items.total() > CONTAINER_CAP {
            errors.push(ValidationError::new(format!(
                "init container '{container_id}' exceeds the container capacity"
            )));
        }
    }

    errors
}
