use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::model::{
    Achievement, AchievementCondition, Choice, ContentStore, Enemy, EnemySkill, InitState,
    ItemEffect, ItemEffectKind, ItemOp, ItemSpec, RandomEvent, Reward, Scene, SceneAchievement,
    Spell, SpellKind, Talk, TalkEntry, TalkOption,
};
use super::validator::validate_content;
use crate::engine::{ItemCounts, StatDelta, Stats};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content file {0} does not exist")]
    MissingFile(PathBuf),
    #[error("error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid content: {0}")]
    Invalid(String),
    #[error("content validation failed:\n{0}")]
    Validation(String),
}

////////////////////
/// JSON STRUCTS ///
////////////////////

#[derive(Deserialize)]
struct SceneConfig {
    #[serde(default)]
    text: String,
    #[serde(default)]
    choices: Vec<ChoiceConfig>,
    #[serde(default)]
    achievements: Vec<SceneAchievementConfig>,
}

#[derive(Deserialize)]
struct ChoiceConfig {
    #[serde(default)]
    text: String,

    /// "talk" marks a dialogue transition; anything else is a scene choice.
    #[serde(default, rename = "type")]
    kind: Option<String>,

    #[serde(default)]
    next: Option<String>,

    #[serde(default)]
    time: i64,

    #[serde(default)]
    effect: StatDelta,

    #[serde(default)]
    random_events: Vec<RandomEventConfig>,

    #[serde(default)]
    items: Vec<ItemSpecConfig>,

    #[serde(default)]
    talk_files: Vec<String>,
}

#[derive(Deserialize)]
struct RandomEventConfig {
    chance: f64,
    event: String,

    #[serde(default)]
    next: Option<String>,

    #[serde(default)]
    enemy: Option<String>,

    #[serde(default)]
    effect: StatDelta,

    #[serde(default)]
    item: Option<String>,
}

#[derive(Deserialize)]
struct ItemSpecConfig {
    action: String,
    item: String,

    #[serde(default = "default_quantity")]
    quantity: u64,

    #[serde(default = "default_chance")]
    chance: f64,
}

#[derive(Deserialize)]
struct SceneAchievementConfig {
    id: String,
    condition: String,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct TalkConfig {
    dialogue: BTreeMap<String, Vec<TalkEntryConfig>>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TalkEntryConfig {
    Text {
        #[serde(default)]
        text: String,
    },
    Choice {
        choices: Vec<TalkOptionConfig>,
    },
    End {
        #[serde(default)]
        next_scene: Option<String>,
    },
}

#[derive(Deserialize)]
struct TalkOptionConfig {
    #[serde(default)]
    text: String,
    next: String,
    #[serde(default)]
    effect: StatDelta,
}

#[derive(Deserialize)]
struct SpellsFile {
    spells: Vec<SpellConfig>,
}

#[derive(Deserialize)]
struct SpellConfig {
    name: String,
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    effect: SpellEffectConfig,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Default, Deserialize)]
struct SpellEffectConfig {
    #[serde(default)]
    damage: Option<i64>,
    #[serde(default)]
    duration: Option<u32>,
    #[serde(default)]
    attack_boost: Option<f64>,
}

#[derive(Deserialize)]
struct EnemiesFile {
    enemies: Vec<EnemyConfig>,
}

#[derive(Deserialize)]
struct EnemyConfig {
    name: String,
    health: i64,
    skills: Vec<EnemySkillConfig>,
    #[serde(default)]
    rewards: Vec<RewardConfig>,
}

#[derive(Deserialize)]
struct EnemySkillConfig {
    name: String,
    #[serde(default)]
    effect: StatDelta,
}

#[derive(Deserialize)]
struct RewardConfig {
    item: String,
    #[serde(default = "default_quantity")]
    quantity: u64,
    #[serde(default = "default_chance")]
    chance: f64,
}

#[derive(Deserialize)]
struct ItemEffectConfig {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    effect: StatDelta,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct AchievementConfig {
    id: String,
    name: String,
    condition: String,
}

#[derive(Deserialize)]
struct InitConfig {
    #[serde(default)]
    stats: Stats,
    #[serde(default)]
    inventory: ItemCounts,
    #[serde(default)]
    containers: BTreeMap<String, ItemCounts>,
    #[serde(default)]
    equipment: BTreeMap<String, String>,
    current_scene: String,
    #[serde(default = "default_grade")]
    grade: i64,
}

/// Single-document content bundle; the test and embedding entry point.
#[derive(Deserialize)]
struct ContentBundle {
    #[serde(default)]
    scenes: BTreeMap<String, SceneConfig>,
    #[serde(default)]
    talks: BTreeMap<String, TalkConfig>,
    #[serde(default)]
    spells: Vec<SpellConfig>,
    #[serde(default)]
    enemies: Vec<EnemyConfig>,
    #[serde(default)]
    item_effects: BTreeMap<String, ItemEffectConfig>,
    #[serde(default)]
    achievements: Vec<AchievementConfig>,
    init: InitConfig,
}

// Helpers for serde defaults
fn default_quantity() -> u64 {
    1
}

fn default_chance() -> f64 {
    1.0
}

fn default_grade() -> i64 {
    1
}

/////////////////////////////
/// JSON PARSER FUNCTIONS ///
/////////////////////////////

/// Public API: load a content directory.
///
/// Layout: `scenes/*.json`, `talk/*.json`, `spells.json`, `enemy.json`,
/// `item_effects.json`, `achievements.json`, `game_state_init.json`. Any
/// missing file, malformed document, or dangling reference fails the whole
/// load; nothing is recoverable per-request later.
pub fn load_content_from_dir(dir: &Path) -> Result<ContentStore, ContentError> {
    let mut scenes = BTreeMap::new();
    for (id, text) in read_json_dir(&dir.join("scenes"))? {
        let cfg: SceneConfig = parse_json(&text, &dir.join("scenes").join(format!("{id}.json")))?;
        scenes.insert(id, cfg);
    }

    let mut talks = BTreeMap::new();
    for (id, text) in read_json_dir(&dir.join("talk"))? {
        let cfg: TalkConfig = parse_json(&text, &dir.join("talk").join(format!("{id}.json")))?;
        talks.insert(id, cfg);
    }

    let spells: SpellsFile = parse_json(&read_file(&dir.join("spells.json"))?, &dir.join("spells.json"))?;
    let enemies: EnemiesFile = parse_json(&read_file(&dir.join("enemy.json"))?, &dir.join("enemy.json"))?;
    let item_effects: BTreeMap<String, ItemEffectConfig> =
        parse_json(&read_file(&dir.join("item_effects.json"))?, &dir.join("item_effects.json"))?;
    let achievements: Vec<AchievementConfig> =
        parse_json(&read_file(&dir.join("achievements.json"))?, &dir.join("achievements.json"))?;
    let init: InitConfig =
        parse_json(&read_file(&dir.join("game_state_init.json"))?, &dir.join("game_state_init.json"))?;

    build_store(ContentBundle {
        scenes,
        talks,
        spells: spells.spells,
        enemies: enemies.enemies,
        item_effects,
        achievements,
        init,
    })
}

/// Public API: load a content bundle from a single JSON string.
pub fn load_content_from_str(bundle_json: &str) -> Result<ContentStore, ContentError> {
    let bundle: ContentBundle = serde_json::from_str(bundle_json).map_err(|source| {
        ContentError::Json {
            path: PathBuf::from("<bundle>"),
            source,
        }
    })?;
    build_store(bundle)
}

fn read_file(path: &Path) -> Result<String, ContentError> {
    if !path.exists() {
        return Err(ContentError::MissingFile(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_json<T: serde::de::DeserializeOwned>(text: &str, path: &Path) -> Result<T, ContentError> {
    serde_json::from_str(text).map_err(|source| ContentError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read every `*.json` in a directory, keyed by file stem.
fn read_json_dir(dir: &Path) -> Result<Vec<(String, String)>, ContentError> {
    if !dir.exists() {
        return Err(ContentError::MissingFile(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|source| ContentError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ContentError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            let id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            files.push((id, read_file(&path)?));
        }
    }

    // Stable order so validation messages do not shuffle between runs.
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn build_store(bundle: ContentBundle) -> Result<ContentStore, ContentError> {
    let mut scenes: HashMap<String, Scene> = HashMap::new();
    for (id, cfg) in bundle.scenes {
        let choices = cfg
            .choices
            .into_iter()
            .map(|c| parse_choice(&id, c))
            .collect::<Result<Vec<_>, _>>()?;

        let achievements = cfg
            .achievements
            .into_iter()
            .map(|a| SceneAchievement {
                id: a.id,
                condition: a.condition,
                name: a.name,
            })
            .collect();

        scenes.insert(
            id.clone(),
            Scene {
                id,
                text: cfg.text,
                choices,
                achievements,
            },
        );
    }

    let mut talks: HashMap<String, Talk> = HashMap::new();
    for (id, cfg) in bundle.talks {
        let dialogue = cfg
            .dialogue
            .into_iter()
            .map(|(node, entries)| (node, entries.into_iter().map(parse_talk_entry).collect()))
            .collect();
        talks.insert(id.clone(), Talk { id, dialogue });
    }

    let spells = bundle
        .spells
        .into_iter()
        .map(parse_spell)
        .collect::<Result<Vec<_>, _>>()?;

    let enemies = bundle
        .enemies
        .into_iter()
        .map(|e| Enemy {
            name: e.name,
            health: e.health,
            skills: e
                .skills
                .into_iter()
                .map(|s| EnemySkill {
                    name: s.name,
                    effect: s.effect,
                })
                .collect(),
            rewards: e
                .rewards
                .into_iter()
                .map(|r| Reward {
                    item: r.item,
                    quantity: r.quantity,
                    chance: r.chance,
                })
                .collect(),
        })
        .collect();

    let item_effects = bundle
        .item_effects
        .into_iter()
        .map(|(item, cfg)| {
            let kind = parse_item_effect_kind(&item, &cfg.kind);
            (
                item,
                ItemEffect {
                    kind,
                    effect: cfg.effect,
                    message: cfg.message,
                },
            )
        })
        .collect();

    let achievements = bundle
        .achievements
        .into_iter()
        .map(parse_achievement)
        .collect::<Result<Vec<_>, _>>()?;

    let init = InitState {
        stats: bundle.init.stats,
        inventory: bundle.init.inventory,
        containers: bundle.init.containers,
        equipment: bundle.init.equipment,
        current_scene: bundle.init.current_scene,
        grade: bundle.init.grade,
    };

    let store = ContentStore {
        scenes,
        talks,
        spells,
        enemies,
        item_effects,
        achievements,
        init,
    };

    let errors = validate_content(&store);
    if !errors.is_empty() {
        let joined = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        return Err(ContentError::Validation(joined));
    }

    Ok(store)
}

//////////////////////////
/// PARSE HELPERS      ///
//////////////////////////

fn parse_choice(scene_id: &str, cfg: ChoiceConfig) -> Result<Choice, ContentError> {
    let is_talk = cfg.kind.as_deref() == Some("talk");

    let random_events = cfg
        .random_events
        .into_iter()
        .map(|e| RandomEvent {
            chance: e.chance,
            event: e.event,
            next: e.next,
            enemy: e.enemy,
            effect: e.effect,
            item: e.item,
        })
        .collect();

    let items = cfg
        .items
        .into_iter()
        .map(|i| {
            let action = match i.action.as_str() {
                "add" => ItemOp::Add,
                "remove" => ItemOp::Remove,
                other => {
                    return Err(ContentError::Invalid(format!(
                        "scene '{scene_id}' has an unknown item action '{other}'"
                    )));
                }
            };
            Ok(ItemSpec {
                action,
                item: i.item,
                quantity: i.quantity,
                chance: i.chance,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Choice {
        text: cfg.text,
        is_talk,
        next: cfg.next,
        time_minutes: cfg.time,
        effect: cfg.effect,
        random_events,
        items,
        talk_files: cfg.talk_files,
    })
}

fn parse_talk_entry(cfg: TalkEntryConfig) -> TalkEntry {
    match cfg {
        TalkEntryConfig::Text { text } => TalkEntry::Text { text },
        TalkEntryConfig::Choice { choices } => TalkEntry::Choice {
            choices: choices
                .into_iter()
                .map(|o| TalkOption {
                    text: o.text,
                    next: o.next,
                    effect: o.effect,
                })
                .collect(),
        },
        TalkEntryConfig::End { next_scene } => TalkEntry::End { next_scene },
    }
}

fn parse_spell(cfg: SpellConfig) -> Result<Spell, ContentError> {
    let kind = match cfg.kind {
        1 => SpellKind::Damage {
            base: cfg.effect.damage.unwrap_or(10),
        },
        2 => SpellKind::Shield,
        3 => SpellKind::DamageOverTime {
            damage: cfg.effect.damage.unwrap_or(5),
            duration: cfg.effect.duration.unwrap_or(3),
        },
        4 => SpellKind::Buff {
            attack_boost: cfg.effect.attack_boost.unwrap_or(0.2),
            duration: cfg.effect.duration.unwrap_or(3),
        },
        other => {
            return Err(ContentError::Invalid(format!(
                "spell '{}' has an unknown type {other}",
                cfg.name
            )));
        }
    };

    Ok(Spell {
        name: cfg.name,
        kind,
        description: cfg.description.unwrap_or_default(),
    })
}

fn parse_item_effect_kind(item: &str, raw: &str) -> ItemEffectKind {
    match raw {
        "consumable" => ItemEffectKind::Consumable,
        other => {
            if other.is_empty() {
                eprintln!("Warning: item '{item}' has an empty effect type, treating as inert");
            }
            ItemEffectKind::Inert
        }
    }
}

fn parse_achievement(cfg: AchievementConfig) -> Result<Achievement, ContentError> {
    let condition = match cfg.condition.as_str() {
        "collect" => AchievementCondition::Collect,
        "visit" => AchievementCondition::Visit,
        "learn" => AchievementCondition::Learn,
        other => {
            return Err(ContentError::Invalid(format!(
                "achievement '{}' has an unknown condition '{other}'",
                cfg.id
            )));
        }
    };

    Ok(Achievement {
        id: cfg.id,
        name: cfg.name,
        condition,
    })
}
