mod achievements;
mod battle;
mod inventory;
mod output;
mod stats;
mod walker;

pub use achievements::{AchievementTrigger, check_and_unlock};

pub use battle::{
    AttackBuff, BATTLE_AFTERMATH_SCENE, BattleAction, BattleState, DamageOverTime,
    MAX_SELECTED_SKILLS, start_battle, submit_battle_action,
};

pub use inventory::{
    CONTAINER_CAP, INVENTORY_CAP, ItemCommand, ItemCounts, ItemSnapshot, handle_item_command,
    undo_item_command,
};

pub use output::{EventBlock, Output};
pub use stats::{ClockTime, StatDelta, Stats};
pub use walker::{
    TALK_ENTRY_NODE, TALK_FALLBACK_SCENE, apply_choice, apply_talk_choice, navigate, visit_scene,
};
