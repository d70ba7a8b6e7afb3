//! Game-state transition engine for an interactive narrative RPG.
//!
//! The caller owns one [`GameState`] snapshot per session and hands it to
//! the [`Engine`] together with an [`Action`]; the engine mutates the
//! snapshot deterministically (modulo its injected RNG) and returns the
//! events the transition produced. Content (scenes, dialogues, spells,
//! enemies, achievements) is loaded once into an immutable
//! [`ContentStore`](content::ContentStore) and only replaced wholesale.

pub mod content;
pub mod engine;

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use content::{Achievement, ContentStore};
use engine::{
    BattleAction, BattleState, ItemCommand, ItemCounts, ItemSnapshot, Output, Stats,
    apply_choice, apply_talk_choice, handle_item_command, navigate, submit_battle_action,
    undo_item_command,
};
use engine::{AchievementTrigger, check_and_unlock};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub gender: String,
}

/// The root aggregate: one complete snapshot of a player's session.
/// Owned by the caller between turns; every engine call either leaves it
/// untouched or advances it to the next authoritative snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub character: Character,
    pub stats: Stats,
    pub inventory: ItemCounts,
    pub containers: BTreeMap<String, ItemCounts>,
    pub equipment: BTreeMap<String, String>,
    pub known_spells: BTreeSet<String>,
    pub achievements: BTreeSet<String>,
    pub current_scene: String,
    pub visited: BTreeSet<String>,
    pub unlocked_scenes: BTreeSet<String>,
    pub current_talk: Option<String>,
    pub current_talk_node: Option<String>,
    pub grade: i64,
    pub battle: BattleState,
    /// Single-level narrative undo. The stored snapshot never carries its
    /// own `previous_state`.
    pub previous_state: Option<Box<GameState>>,
    /// Single-level item-action rollback, independent of `previous_state`.
    pub previous_item_state: Option<ItemSnapshot>,
}

impl GameState {
    pub fn in_battle(&self) -> bool {
        self.battle.enemy.is_some()
    }

    pub fn in_dialogue(&self) -> bool {
        self.current_talk.is_some() && self.current_talk_node.is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.previous_state.is_some()
    }

    /// Retain this snapshot as the undo point for the mutation about to
    /// happen. Depth stays exactly one.
    pub(crate) fn snapshot_for_undo(&mut self) {
        let mut previous = self.clone();
        previous.previous_state = None;
        self.previous_state = Some(Box::new(previous));
    }
}

/// Everything a player can do in one turn. [`Engine::apply`] routes by the
/// snapshot's current mode; actions that do not fit the mode are silent
/// no-ops.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Pick a scene choice, or a dialogue option while a talk is open.
    Choice(usize),
    /// Submit a battle round: dodge or selected spells.
    Battle(BattleAction),
    /// Jump directly to an unlocked scene.
    Navigate(String),
    /// Manipulate an item between inventory, containers, and use.
    Item(ItemCommand),
    /// Roll back the last item action.
    UndoItemAction,
    /// Roll back the last narrative choice.
    Undo,
    /// Add a catalog spell to the known set.
    LearnSpell(String),
}

/// A short, displayable view of one known spell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellInfo {
    pub name: String,
    pub description: String,
}

/// The transition engine: an immutable content registry plus the session
/// RNG. One engine serves one session at a time; concurrent sessions get
/// independent engines (or external serialization).
pub struct Engine {
    content: ContentStore,
    rng: StdRng,
}

impl Engine {
    pub fn new(content: ContentStore) -> Self {
        Engine {
            content,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic construction for tests and replayable sessions.
    pub fn with_seed(content: ContentStore, seed: u64) -> Self {
        Engine {
            content,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    /// Swap in a freshly loaded registry. The caller must not have a
    /// transition in flight.
    pub fn reload_content(&mut self, content: ContentStore) {
        self.content = content;
    }

    /// Build a fresh snapshot from the init template: randomized starting
    /// currency, the template scene marked visited and unlocked, no
    /// spells, achievements, or retained history.
    pub fn new_game(&mut self, name: &str, gender: &str) -> GameState {
        let init = &self.content.init;
        let mut stats = init.stats.clone();
        stats.galleons = self.rng.gen_range(20..=50);
        stats.sickle = self.rng.gen_range(50..=100);
        stats.knut = self.rng.gen_range(100..=200);

        let scene = init.current_scene.clone();
        GameState {
            character: Character {
                name: name.to_string(),
                gender: gender.to_string(),
            },
            stats,
            inventory: init.inventory.clone(),
            containers: init.containers.clone(),
            equipment: init.equipment.clone(),
            known_spells: BTreeSet::new(),
            achievements: BTreeSet::new(),
            current_scene: scene.clone(),
            visited: BTreeSet::from([scene.clone()]),
            unlocked_scenes: BTreeSet::from([scene]),
            current_talk: None,
            current_talk_node: None,
            grade: init.grade,
            battle: BattleState::default(),
            previous_state: None,
            previous_item_state: None,
        }
    }

    /// Route an action by the snapshot's mode and apply it.
    pub fn apply(&mut self, state: &mut GameState, action: &Action) -> Output {
        let mut out = Output::new();
        match action {
            Action::Choice(index) => {
                if state.in_battle() {
                    // Narrative choices are frozen while an enemy is up.
                } else if state.in_dialogue() {
                    apply_talk_choice(&mut out, &self.content, state, *index);
                } else {
                    apply_choice(&mut out, &self.content, &mut self.rng, state, *index);
                }
            }
            Action::Battle(battle_action) => {
                submit_battle_action(&mut out, &self.content, &mut self.rng, state, battle_action);
            }
            Action::Navigate(scene_id) => {
                navigate(&mut out, &self.content, state, scene_id);
            }
            Action::Item(command) => {
                handle_item_command(
                    &mut out,
                    &self.content,
                    command,
                    &mut state.inventory,
                    &mut state.containers,
                    &mut state.equipment,
                    &mut state.stats,
                    &mut state.previous_item_state,
                );
            }
            Action::UndoItemAction => {
                undo_item_command(
                    &mut out,
                    &mut state.inventory,
                    &mut state.containers,
                    &mut state.equipment,
                    &mut state.stats,
                    &mut state.previous_item_state,
                );
            }
            Action::Undo => self.undo_into(state, &mut out),
            Action::LearnSpell(name) => self.learn_spell_into(state, name, &mut out),
        }
        out
    }

    /// Restore the previous snapshot, if one is retained. There is no redo:
    /// the restored snapshot's own undo slot is empty.
    pub fn undo(&mut self, state: &mut GameState) -> Output {
        let mut out = Output::new();
        self.undo_into(state, &mut out);
        out
    }

    fn undo_into(&mut self, state: &mut GameState, out: &mut Output) {
        if let Some(previous) = state.previous_state.take() {
            *state = *previous;
            out.say("Returned to the previous step.");
        }
    }

    /// Add a catalog spell to the known set; first learn fires the learn
    /// achievements. Unknown names and re-learns are no-ops.
    pub fn learn_spell(&mut self, state: &mut GameState, name: &str) -> Output {
        let mut out = Output::new();
        self.learn_spell_into(state, name, &mut out);
        out
    }

    fn learn_spell_into(&mut self, state: &mut GameState, name: &str, out: &mut Output) {
        if self.content.spell(name).is_none() {
            return;
        }
        if state.known_spells.insert(name.to_string()) {
            check_and_unlock(
                out,
                &self.content,
                &mut state.achievements,
                AchievementTrigger::SpellLearned,
            );
        }
    }

    /// Known spells with their descriptions, in catalog order.
    pub fn known_spell_details(&self, state: &GameState) -> Vec<SpellInfo> {
        self.content
            .spells
            .iter()
            .filter(|spell| state.known_spells.contains(&spell.name))
            .map(|spell| SpellInfo {
                name: spell.name.clone(),
                description: spell.description.clone(),
            })
            .collect()
    }

    /// Unlocked achievement definitions, in definition order.
    pub fn unlocked_achievements<'a>(&'a self, state: &GameState) -> Vec<&'a Achievement> {
        self.content
            .achievements
            .iter()
            .filter(|a| state.achievements.contains(&a.id))
            .collect()
    }
}
