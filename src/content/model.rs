use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::engine::{ItemCounts, StatDelta, Stats};

///////////////////////////////
/// CONTENT STRUCTS & ENUMS ///
///////////////////////////////

/// Runtime content registry used by the engine. Built once by the loader,
/// immutable afterwards; a reload constructs a fresh registry and swaps it
/// in wholesale.
pub struct ContentStore {
    pub scenes: HashMap<String, Scene>,
    pub talks: HashMap<String, Talk>,
    pub spells: Vec<Spell>,
    pub enemies: Vec<Enemy>,
    pub item_effects: HashMap<String, ItemEffect>,
    pub achievements: Vec<Achievement>,
    pub init: InitState,
}

impl ContentStore {
    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn talk(&self, id: &str) -> Option<&Talk> {
        self.talks.get(id)
    }

    pub fn spell(&self, name: &str) -> Option<&Spell> {
        self.spells.iter().find(|s| s.name == name)
    }

    pub fn enemy(&self, name: &str) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.name == name)
    }

    pub fn item_effect(&self, item: &str) -> Option<&ItemEffect> {
        self.item_effects.get(item)
    }
}

impl std::fmt::Debug for ContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStore")
            .field("scenes", &self.scenes.len())
            .field("talks", &self.talks.len())
            .field("spells", &self.spells.len())
            .field("enemies", &self.enemies.len())
            .field("item_effects", &self.item_effects.len())
            .field("achievements", &self.achievements.len())
            .finish()
    }
}

pub struct Scene {
    pub id: String,
    pub text: String,
    pub choices: Vec<Choice>,
    pub achievements: Vec<SceneAchievement>,
}

pub struct Choice {
    pub text: String,
    /// A talk choice opens a dialogue instead of moving between scenes.
    pub is_talk: bool,
    pub next: Option<String>,
    pub time_minutes: i64,
    pub effect: StatDelta,
    pub random_events: Vec<RandomEvent>,
    pub items: Vec<ItemSpec>,
    pub talk_files: Vec<String>,
}

/// One probabilistic sub-event on a scene choice. The first event in the
/// list whose Bernoulli trial succeeds is applied; the rest are skipped.
#[derive(Clone)]
pub struct RandomEvent {
    pub chance: f64,
    pub event: String,
    pub next: Option<String>,
    pub enemy: Option<String>,
    pub effect: StatDelta,
    pub item: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ItemOp {
    Add,
    Remove,
}

#[derive(Clone)]
pub struct ItemSpec {
    pub action: ItemOp,
    pub item: String,
    pub quantity: u64,
    pub chance: f64,
}

/// Achievement hook attached directly to a scene definition; display name
/// resolution falls back to the global achievement list.
pub struct SceneAchievement {
    pub id: String,
    pub condition: String,
    pub name: String,
}

pub struct Talk {
    pub id: String,
    pub dialogue: BTreeMap<String, Vec<TalkEntry>>,
}

pub enum TalkEntry {
    Text { text: String },
    Choice { choices: Vec<TalkOption> },
    End { next_scene: Option<String> },
}

pub struct TalkOption {
    pub text: String,
    pub next: String,
    pub effect: StatDelta,
}

pub struct Spell {
    pub name: String,
    pub kind: SpellKind,
    pub description: String,
}

pub enum SpellKind {
    /// Direct damage, scaled by grade and any active attack buff.
    Damage { base: i64 },
    /// Blocks the next incoming attack.
    Shield,
    /// Immediate damage plus a multi-round lingering effect.
    DamageOverTime { damage: i64, duration: u32 },
    /// Timed attack-boost window.
    Buff { attack_boost: f64, duration: u32 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub name: String,
    pub health: i64,
    pub skills: Vec<EnemySkill>,
    pub rewards: Vec<Reward>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySkill {
    pub name: String,
    #[serde(default)]
    pub effect: StatDelta,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub item: String,
    pub quantity: u64,
    pub chance: f64,
}

pub enum ItemEffectKind {
    Consumable,
    /// Anything else: usable slot exists but `use` is a no-op.
    Inert,
}

pub struct ItemEffect {
    pub kind: ItemEffectKind,
    pub effect: StatDelta,
    pub message: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum AchievementCondition {
    Collect,
    Visit,
    Learn,
}

pub struct Achievement {
    pub id: String,
    pub name: String,
    pub condition: AchievementCondition,
}

/// New-game template: the fields a fresh `GameState` starts from before
/// currency randomization and character assignment.
pub struct InitState {
    pub stats: Stats,
    pub inventory: ItemCounts,
    pub containers: BTreeMap<String, ItemCounts>,
    pub equipment: BTreeMap<String, String>,
    pub current_scene: String,
    pub grade: i64,
}
