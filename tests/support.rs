#![allow(dead_code)]

use story_rpg::content::{ContentStore, load_content_from_str};
use story_rpg::{Engine, GameState};

// Choice indices on the dormitory scene, in fixture order.
pub const CHOICE_TO_CORRIDOR: usize = 0;
pub const CHOICE_SEARCH_BED: usize = 1;
pub const CHOICE_CHAT: usize = 2;
pub const CHOICE_TRAINING_TROLL: usize = 3;
pub const CHOICE_MISSING_ENEMY: usize = 4;
pub const CHOICE_NEVER_EVENT: usize = 5;
pub const CHOICE_GIVE_FROG: usize = 6;
pub const CHOICE_CAVE_TROLL: usize = 7;
pub const CHOICE_NIGHTMARE: usize = 8;
pub const CHOICE_TAKE_TOOTH: usize = 9;
pub const CHOICE_LUCKY_SWEET: usize = 10;

pub fn store() -> ContentStore {
    load_content_from_str(BUNDLE).expect("fixture bundle loads")
}

pub fn engine() -> Engine {
    Engine::with_seed(store(), 7)
}

pub fn new_game(engine: &mut Engine) -> GameState {
    engine.new_game("Rowan", "they")
}

/// One content bundle for every suite. Probabilities are pinned to 0 or 1
/// and each enemy has exactly one skill, so outcomes do not depend on RNG
/// luck; the init stats make spell success exactly certain
/// (0.5 + 50/100 - 0/100 = 1.0).
const BUNDLE: &str = r#"{
  "scenes": {
    "dormitory": {
      "text": "Your four-poster bed sits in the corner.",
      "choices": [
        {"text": "Head to the corridor", "next": "corridor", "time": 30, "effect": {"fatigue": 5}},
        {"text": "Search under the bed", "next": "dormitory",
         "items": [{"action": "add", "item": "chocolate_frog"}]},
        {"text": "Chat with your roommate", "type": "talk", "talk_files": ["roommate_chat"]},
        {"text": "Poke the training dummy", "next": "dormitory",
         "random_events": [{"chance": 1.0, "event": "A training troll bursts in!", "next": "battle", "enemy": "training_troll"}]},
        {"text": "Follow the cold draft", "next": "corridor",
         "random_events": [{"chance": 1.0, "event": "A ghost drifts by.", "next": "battle", "enemy": "peeves"}]},
        {"text": "Stare out the window", "next": "corridor",
         "random_events": [{"chance": 0.0, "event": "Never happens."}]},
        {"text": "Give away a frog", "next": "dormitory",
         "items": [{"action": "remove", "item": "chocolate_frog"}]},
        {"text": "Open the heavy door", "next": "dormitory",
         "random_events": [{"chance": 1.0, "event": "A cave troll lumbers in!", "next": "battle", "enemy": "cave_troll"}]},
        {"text": "Blow out the candle", "next": "dormitory",
         "random_events": [{"chance": 1.0, "event": "A nightmare takes shape!", "next": "battle", "enemy": "nightmare"}]},
        {"text": "Pocket the old tooth", "next": "dormitory",
         "items": [{"action": "add", "item": "troll_tooth"}]},
        {"text": "Check the floorboards", "next": "dormitory",
         "random_events": [{"chance": 1.0, "event": "You find a sweet on the floor.", "item": "chocolate_frog"}]}
      ]
    },
    "corridor": {
      "text": "Portraits mutter along the corridor walls.",
      "achievements": [{"id": "first_steps", "condition": "visit", "name": "First Steps"}],
      "choices": [
        {"text": "Back to the dormitory", "next": "dormitory"}
      ]
    },
    "forbidden_forest": {
      "text": "The trees close in overhead.",
      "choices": [
        {"text": "Find your way back", "next": "dormitory"}
      ]
    },
    "library": {
      "text": "Rows of silent shelves.",
      "choices": []
    }
  },
  "talks": {
    "roommate_chat": {
      "dialogue": {
        "1-1": [
          {"type": "text", "text": "Hey, you're up late."},
          {"type": "choice", "choices": [
            {"text": "Be kind", "next": "2-1", "effect": {"san": 5}},
            {"text": "Walk away", "next": "end"}
          ]}
        ],
        "2-1": [
          {"type": "text", "text": "Thanks. Sleep well."},
          {"type": "choice", "choices": [
            {"text": "Good night", "next": "3-1"}
          ]}
        ],
        "3-1": [
          {"type": "end", "next_scene": "dormitory"}
        ]
      }
    }
  },
  "spells": [
    {"name": "firebolt", "type": 1, "effect": {"damage": 10}, "description": "A bolt of fire."},
    {"name": "barrier", "type": 2, "description": "Blocks the next attack."},
    {"name": "venom", "type": 3, "effect": {"damage": 4, "duration": 2}, "description": "Lingering venom."},
    {"name": "valor", "type": 4, "effect": {"attack_boost": 0.5, "duration": 2}, "description": "Bolsters your attacks."}
  ],
  "enemies": [
    {"name": "training_troll", "health": 15,
     "skills": [{"name": "harmless swipe", "effect": {}}],
     "rewards": [{"item": "troll_tooth", "quantity": 1, "chance": 1.0}]},
    {"name": "cave_troll", "health": 100,
     "skills": [{"name": "smash", "effect": {"health": -10}}],
     "rewards": []},
    {"name": "nightmare", "health": 50,
     "skills": [{"name": "terror", "effect": {"health": -100}}],
     "rewards": []}
  ],
  "item_effects": {
    "chocolate_frog": {"type": "consumable", "effect": {"san": 10}, "message": "You feel calmer."},
    "troll_tooth": {"type": "trophy", "effect": {}, "message": ""}
  },
  "achievements": [
    {"id": "collect_first_item", "name": "Collector", "condition": "collect"},
    {"id": "learn_first_spell", "name": "Apprentice", "condition": "learn"},
    {"id": "first_steps", "name": "First Steps", "condition": "visit"}
  ],
  "init": {
    "stats": {"health": 100, "san": 50, "fatigue": 0, "time": "08:00 AM"},
    "inventory": {},
    "containers": {"trunk": {}},
    "equipment": {"wand": "oak_wand"},
    "current_scene": "dormitory",
    "grade": 1
  }
}"#;
