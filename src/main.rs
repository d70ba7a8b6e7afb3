use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use story_rpg::content::{TalkEntry, load_content_from_dir};
use story_rpg::engine::{BattleAction, EventBlock, ItemCommand, Output};
use story_rpg::{Action, Engine, GameState};

fn flush_output(out: Output) {
    for block in out.blocks {
        match block {
            EventBlock::Narration(text) => println!("{text}"),
            EventBlock::Unlock(text) => println!("*** {text} ***"),
            EventBlock::Diagnostic(text) => println!("(!) {text}"),
        }
    }
}

fn render(engine: &Engine, state: &GameState, printed_log: &mut usize) {
    if state.in_battle() {
        let battle = &state.battle;
        if let Some(enemy) = &battle.enemy {
            for line in &battle.battle_log[*printed_log..] {
                println!("  {line}");
            }
            *printed_log = battle.battle_log.len();
            println!(
                "\n{}: health {} | you: health {}",
                enemy.name, enemy.health, state.stats.health
            );
            println!("Commands: dodge | cast <spell> [<spell> ...]");
        }
        return;
    }

    // A battle that just ended leaves its closing log lines unprinted.
    if *printed_log > 0 {
        for line in &state.battle.battle_log[*printed_log..] {
            println!("  {line}");
        }
        *printed_log = 0;
    }

    if state.in_dialogue() {
        let talk_id = state.current_talk.as_deref().unwrap_or_default();
        let node_id = state.current_talk_node.as_deref().unwrap_or_default();
        let Some(talk) = engine.content().talk(talk_id) else {
            return;
        };
        let Some(entries) = talk.dialogue.get(node_id) else {
            return;
        };
        println!();
        for entry in entries {
            match entry {
                TalkEntry::Text { text } => println!("{text}"),
                TalkEntry::Choice { choices } => {
                    for (i, option) in choices.iter().enumerate() {
                        println!("  {i}) {}", option.text);
                    }
                }
                TalkEntry::End { .. } => {}
            }
        }
        return;
    }

    let Some(scene) = engine.content().scene(&state.current_scene) else {
        println!("(!) Unknown scene '{}'", state.current_scene);
        return;
    };
    println!("\n== {} ==  [{}]", state.current_scene, state.stats.time);
    if !scene.text.trim().is_empty() {
        println!("{}", scene.text.trim());
    }
    for (i, choice) in scene.choices.iter().enumerate() {
        println!("  {i}) {}", choice.text);
    }
}

fn parse_command(input: &str) -> Option<Action> {
    let lower = input.to_lowercase();
    if let Ok(index) = lower.parse::<usize>() {
        return Some(Action::Choice(index));
    }

    let mut parts = input.split_whitespace();
    let verb = parts.next().unwrap_or("");
    let rest: Vec<&str> = parts.collect();

    match verb.to_lowercase().as_str() {
        "dodge" => Some(Action::Battle(BattleAction::Dodge)),
        "cast" => Some(Action::Battle(BattleAction::Skills(
            rest.iter().map(|s| s.to_string()).collect(),
        ))),
        "go" => Some(Action::Navigate(rest.join(" "))),
        "learn" => Some(Action::LearnSpell(rest.join(" "))),
        "use" => Some(Action::Item(ItemCommand::Use {
            item: rest.join(" "),
        })),
        "drop" => Some(Action::Item(ItemCommand::Discard {
            item: rest.join(" "),
        })),
        "put" if rest.len() >= 2 => Some(Action::Item(ItemCommand::MoveToContainer {
            item: rest[0].to_string(),
            container: rest[1..].join(" "),
        })),
        "get" if rest.len() >= 2 => Some(Action::Item(ItemCommand::MoveToInventory {
            item: rest[0].to_string(),
            container: rest[1..].join(" "),
        })),
        "undo" => Some(Action::Undo),
        "undo-item" => Some(Action::UndoItemAction),
        _ => None,
    }
}

fn main() -> io::Result<()> {
    let content_dir: PathBuf = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("content"));

    let content = match load_content_from_dir(&content_dir) {
        Ok(store) => {
            println!("Using content directory: {}", content_dir.display());
            store
        }
        Err(e) => {
            eprintln!("Failed to load content from '{}': {e}", content_dir.display());
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut read_line = |prompt: &str| -> io::Result<Option<String>> {
        print!("{prompt}");
        io::stdout().flush()?;
        let mut buf = String::new();
        if stdin.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim().to_string()))
    };

    let Some(name) = read_line("Character name: ")? else {
        return Ok(());
    };
    let Some(gender) = read_line("Gender: ")? else {
        return Ok(());
    };

    let mut engine = Engine::new(content);
    let mut state = engine.new_game(&name, &gender);
    let mut printed_log = 0usize;

    println!("\nWelcome, {}!", state.character.name);
    println!("Pick choices by number. Other commands: inventory, dodge, cast, go, learn, use, drop, put, get, undo, undo-item, spells, achievements, quit.");

    render(&engine, &state, &mut printed_log);

    loop {
        let Some(input) = read_line("\n> ")? else {
            println!("\nGoodbye.");
            break;
        };
        if input.is_empty() {
            continue;
        }
        let lower = input.to_lowercase();

        if lower == "quit" || lower == "exit" {
            println!("Goodbye.");
            break;
        } else if lower == "inventory" || lower == "i" {
            println!(
                "health {} | san {} | fatigue {} | {}g {}s {}k",
                state.stats.health,
                state.stats.san,
                state.stats.fatigue,
                state.stats.galleons,
                state.stats.sickle,
                state.stats.knut
            );
            if state.inventory.is_empty() {
                println!("You are carrying nothing.");
            } else {
                println!("You are carrying:");
                for (item, count) in state.inventory.iter() {
                    println!("  {item} x{count}");
                }
            }
            for (container, items) in &state.containers {
                if !items.is_empty() {
                    println!("In the {container}:");
                    for (item, count) in items.iter() {
                        println!("  {item} x{count}");
                    }
                }
            }
            continue;
        } else if lower == "spells" {
            let spells = engine.known_spell_details(&state);
            if spells.is_empty() {
                println!("You know no spells.");
            }
            for spell in spells {
                println!("  {}: {}", spell.name, spell.description);
            }
            continue;
        } else if lower == "achievements" {
            let unlocked = engine.unlocked_achievements(&state);
            if unlocked.is_empty() {
                println!("No achievements yet.");
            }
            for achievement in unlocked {
                println!("  {}", achievement.name);
            }
            continue;
        }

        match parse_command(&input) {
            Some(action) => {
                let out = engine.apply(&mut state, &action);
                flush_output(out);
                render(&engine, &state, &mut printed_log);
            }
            None => println!("I don't understand that command."),
        }
    }

    Ok(())
}
