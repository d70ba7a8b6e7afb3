use rand::Rng;
use rand::seq::SliceRandom;

use serde::{Deserialize, Serialize};

use crate::GameState;
use crate::content::{ContentStore, Enemy, SpellKind};
use crate::engine::achievements::{AchievementTrigger, check_and_unlock};
use crate::engine::inventory::INVENTORY_CAP;
use crate::engine::output::Output;
use crate::engine::stats::{StatDelta, Stats};
use crate::engine::walker::visit_scene;

/// The scene both defeat and victory drop the player into.
pub const BATTLE_AFTERMATH_SCENE: &str = "forbidden_forest";

/// Base odds that a declared dodge negates the enemy attack.
const DODGE_CHANCE: f64 = 0.5;

/// Most spells a player can submit per round.
pub const MAX_SELECTED_SKILLS: usize = 3;

/// Combat sub-state. `enemy` is `None` outside combat; the remaining
/// fields only carry meaning while an enemy is present and are reset
/// wholesale at encounter start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleState {
    pub enemy: Option<Enemy>,
    pub battle_log: Vec<String>,
    pub selected_skills: Vec<String>,
    pub dodge: bool,
    pub defense: bool,
    pub persistent_damage: DamageOverTime,
    pub buff: AttackBuff,
}

impl Default for BattleState {
    fn default() -> Self {
        BattleState {
            enemy: None,
            battle_log: Vec::new(),
            selected_skills: Vec::new(),
            dodge: false,
            defense: false,
            persistent_damage: DamageOverTime::default(),
            buff: AttackBuff::default(),
        }
    }
}

/// Countdown damage window against the enemy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageOverTime {
    pub damage: i64,
    pub duration: u32,
}

/// Countdown attack-boost window for the player.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackBuff {
    pub attack_boost: f64,
    pub duration: u32,
}

/// A player's submission for one round: dodge, or up to three known spells
/// resolved in selection order. The two are mutually exclusive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BattleAction {
    Dodge,
    Skills(Vec<String>),
}

/// Begin an encounter: deep-copy the template so its health can be worn
/// down independently, and reset every round-scoped field.
pub fn start_battle(battle: &mut BattleState, template: &Enemy) {
    *battle = BattleState {
        enemy: Some(template.clone()),
        ..BattleState::default()
    };
}

/// Accept a player submission and resolve one round. Outside combat, or
/// with more than three skills selected, this is a silent no-op.
///
/// Every submission clears defense, lingering damage, and the attack buff
/// before resolution, so those windows only ever span the round that armed
/// them. The battle tests pin this down.
pub fn submit_battle_action<R: Rng>(
    out: &mut Output,
    store: &ContentStore,
    rng: &mut R,
    state: &mut GameState,
    action: &BattleAction,
) {
    if state.battle.enemy.is_none() {
        return;
    }

    match action {
        BattleAction::Dodge => {
            state.battle.dodge = true;
            state.battle.selected_skills.clear();
        }
        BattleAction::Skills(skills) => {
            if skills.len() > MAX_SELECTED_SKILLS {
                return;
            }
            state.battle.selected_skills = skills.clone();
            state.battle.dodge = false;
        }
    }
    state.battle.defense = false;
    state.battle.persistent_damage = DamageOverTime::default();
    state.battle.buff = AttackBuff::default();

    resolve_round(out, store, rng, state);
}

/// One full round: lingering damage, enemy action, player spells, buff
/// countdown, then the win/loss check.
fn resolve_round<R: Rng>(out: &mut Output, store: &ContentStore, rng: &mut R, state: &mut GameState) {
    let grade = state.grade;
    let battle = &mut state.battle;
    let Some(mut enemy) = battle.enemy.take() else {
        return;
    };

    if battle.persistent_damage.duration > 0 {
        let damage = battle.persistent_damage.damage;
        enemy.health -= damage;
        battle
            .battle_log
            .push(format!("{} takes {damage} lingering damage", enemy.name));
        battle.persistent_damage.duration -= 1;
        if battle.persistent_damage.duration == 0 {
            battle.battle_log.push("The lingering damage has worn off!".to_string());
        }
    }

    // Enemy acts even if the lingering damage just felled it; the death
    // check only runs at the end of the round.
    if let Some(enemy_skill) = enemy.skills.choose(rng).cloned() {
        battle
            .battle_log
            .push(format!("{} uses {}!", enemy.name, enemy_skill.name));

        if battle.dodge {
            if rng.r#gen::<f64>() < DODGE_CHANCE {
                battle.battle_log.push("You dodge the enemy's attack!".to_string());
            } else {
                battle.battle_log.push("Your dodge fails!".to_string());
                absorb_or_take_hit(battle, &mut state.stats, &enemy_skill.effect);
            }
        } else {
            absorb_or_take_hit(battle, &mut state.stats, &enemy_skill.effect);
        }
    }

    if !battle.dodge {
        let selected = battle.selected_skills.clone();
        for skill_name in &selected {
            let Some(spell) = store.spell(skill_name) else {
                continue;
            };
            if rng.r#gen::<f64>() < success_chance(&state.stats) {
                battle.battle_log.push(format!("You successfully cast {}!", spell.name));
                apply_caster_spell(battle, &mut enemy, grade, &spell.kind);
            } else {
                battle.battle_log.push(format!("Casting {} failed!", spell.name));
            }
        }
    }

    if battle.buff.duration > 0 {
        battle.buff.duration -= 1;
        if battle.buff.duration == 0 {
            battle.battle_log.push("The empowerment has worn off!".to_string());
            battle.buff.attack_boost = 0.0;
        }
    }

    if state.stats.health <= 0 {
        battle.battle_log.push("You have been defeated!".to_string());
        end_battle(out, store, state);
    } else if enemy.health <= 0 {
        battle
            .battle_log
            .push(format!("You defeated {}!", enemy.name));

        // Rewards roll independently; each grant is best-effort against
        // the inventory cap rather than atomic across the whole list.
        let rewards = enemy.rewards.clone();
        for reward in &rewards {
            if rng.r#gen::<f64>() >= reward.chance {
                continue;
            }
            if state.inventory.try_add(&reward.item, reward.quantity, INVENTORY_CAP) {
                state
                    .battle
                    .battle_log
                    .push(format!("Gained {} x{}", reward.item, reward.quantity));
                check_and_unlock(
                    out,
                    store,
                    &mut state.achievements,
                    AchievementTrigger::ItemCollected,
                );
            }
        }
        end_battle(out, store, state);
    } else {
        battle.enemy = Some(enemy);
    }
}

/// A set defense flag blocks one attack and is consumed; otherwise the
/// enemy skill's stat delta lands on the player, clamped.
fn absorb_or_take_hit(battle: &mut BattleState, stats: &mut Stats, effect: &StatDelta) {
    if battle.defense {
        battle
            .battle_log
            .push("Your defensive barrier absorbs the attack!".to_string());
        battle.defense = false;
    } else {
        stats.apply_delta(effect);
    }
}

/// Casting odds: sanity helps, fatigue hurts.
fn success_chance(stats: &Stats) -> f64 {
    (0.5 + stats.san as f64 / 100.0 - stats.fatigue as f64 / 100.0).clamp(0.0, 1.0)
}

fn apply_caster_spell(battle: &mut BattleState, enemy: &mut Enemy, grade: i64, kind: &SpellKind) {
    match kind {
        SpellKind::Damage { base } => {
            let boost = if battle.buff.duration > 0 {
                battle.buff.attack_boost
            } else {
                0.0
            };
            let damage = (*base as f64 * (1.0 + grade as f64 * 0.05 + boost)).floor() as i64;
            enemy.health -= damage;
            battle
                .battle_log
                .push(format!("You deal {damage} damage to {}", enemy.name));
        }
        SpellKind::Shield => {
            battle.defense = true;
            battle.battle_log.push("You will block the next attack!".to_string());
        }
        SpellKind::DamageOverTime { damage, duration } => {
            battle.persistent_damage = DamageOverTime {
                damage: *damage,
                duration: *duration,
            };
            enemy.health -= damage;
            battle
                .battle_log
                .push(format!("You inflict {damage} lingering damage on {}", enemy.name));
        }
        SpellKind::Buff {
            attack_boost,
            duration,
        } => {
            battle.buff = AttackBuff {
                attack_boost: *attack_boost,
                duration: *duration,
            };
            battle.battle_log.push(format!(
                "Your attack power rises by {}% for {duration} rounds!",
                (attack_boost * 100.0) as i64
            ));
        }
    }
}

/// Common tail for defeat and victory: clear the enemy and force the
/// aftermath scene, with first-visit bookkeeping.
fn end_battle(out: &mut Output, store: &ContentStore, state: &mut GameState) {
    state.battle.enemy = None;
    state.battle.selected_skills.clear();
    state.battle.dodge = false;
    state.current_scene = BATTLE_AFTERMATH_SCENE.to_string();
    visit_scene(
        out,
        store,
        BATTLE_AFTERMATH_SCENE,
        &mut state.visited,
        &mut state.unlocked_scenes,
        &mut state.achievements,
    );
}
